use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::catalog::{self, ErrorKind, CORE_ERROR_DOMAIN};

/// Info key holding the developer-facing message.
pub const DEVELOPER_MESSAGE_KEY: &str = "developer_message";
/// Info key holding the rendered underlying error.
pub const UNDERLYING_ERROR_KEY: &str = "underlying_error";
/// Info key holding the offending argument name.
pub const ARGUMENT_NAME_KEY: &str = "argument_name";
/// Info key holding the offending argument value.
pub const ARGUMENT_VALUE_KEY: &str = "argument_value";

/// Shared, thread-safe error trait object used for underlying causes.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Structured error value produced by an [`crate::ErrorFactory`].
///
/// Records are immutable once built. They can only be created through a
/// factory, which guarantees the reporting side effect has already happened.
#[derive(Clone)]
pub struct ErrorRecord {
    domain: String,
    code: i64,
    message: Option<String>,
    underlying: Option<SharedError>,
    user_info: Map<String, Value>,
    argument_name: Option<String>,
    argument_value: Option<String>,
}

impl ErrorRecord {
    pub(crate) fn new(
        domain: String,
        code: i64,
        message: Option<String>,
        underlying: Option<SharedError>,
        user_info: Map<String, Value>,
    ) -> Self {
        Self {
            domain,
            code,
            message,
            underlying,
            user_info,
            argument_name: None,
            argument_value: None,
        }
    }

    pub(crate) fn with_argument(mut self, name: String, value: Option<String>) -> Self {
        self.argument_name = Some(name);
        self.argument_value = value;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn underlying(&self) -> Option<&SharedError> {
        self.underlying.as_ref()
    }

    /// Merged auxiliary info: caller entries plus message, underlying error
    /// and argument entries. Never contains `null` values.
    pub fn user_info(&self) -> &Map<String, Value> {
        &self.user_info
    }

    pub fn argument_name(&self) -> Option<&str> {
        self.argument_name.as_deref()
    }

    pub fn argument_value(&self) -> Option<&str> {
        self.argument_value.as_deref()
    }

    /// Taxonomy bucket of this error.
    ///
    /// Only records built with an argument name are `InvalidArgument`; the
    /// invalid-argument code on the plain path is a general failure.
    pub fn kind(&self) -> ErrorKind {
        if self.argument_name.is_some() {
            return ErrorKind::InvalidArgument;
        }
        if self.domain != CORE_ERROR_DOMAIN {
            return ErrorKind::GeneralFailure;
        }
        match catalog::lookup(self.code).map(|def| def.kind) {
            Some(ErrorKind::TransportFailure) => ErrorKind::TransportFailure,
            _ => ErrorKind::GeneralFailure,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.kind() == ErrorKind::TransportFailure
    }
}

impl fmt::Debug for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("ErrorRecord");
        builder.field("domain", &self.domain);
        builder.field("code", &self.code);
        if let Some(message) = &self.message {
            builder.field("message", message);
        }
        if let Some(name) = &self.argument_name {
            builder.field("argument_name", name);
        }
        if let Some(value) = &self.argument_value {
            builder.field("argument_value", value);
        }
        if let Some(underlying) = &self.underlying {
            builder.field("underlying", underlying);
        }
        builder.field("user_info", &self.user_info);
        builder.finish()
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error {}", self.domain, self.code)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl Error for ErrorRecord {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.underlying
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}
