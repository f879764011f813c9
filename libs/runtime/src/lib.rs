//! Process-level plumbing shared by binaries: layered configuration and
//! logging initialization.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{default_logging_config, AppConfig, CliArgs, LoggingConfig, Section};
