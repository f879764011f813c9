//! Structured SDK errors with a mandatory reporting side effect.
//!
//! Errors are only ever built through an [`ErrorFactory`]; the shipped
//! [`ReportingErrorFactory`] forwards a summary of every error to an
//! [`ErrorReporter`] before returning it, so construction and telemetry
//! cannot drift apart.

pub mod catalog;
pub mod factory;
pub mod record;
pub mod reporter;

pub use catalog::{ErrDef, ErrorKind, CORE_ERROR_DOMAIN};
pub use factory::{ErrorFactory, ErrorParams, ReportingErrorFactory};
pub use record::{
    ErrorRecord, SharedError, ARGUMENT_NAME_KEY, ARGUMENT_VALUE_KEY, DEVELOPER_MESSAGE_KEY,
    UNDERLYING_ERROR_KEY,
};
pub use reporter::{CapturedError, ErrorReporter, MemoryReporter, TracingErrorReporter};
