use sdk_errors::{ErrorKind, ErrorRecord};
use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum UserProfileError {
    #[error("Transport failure: {0}")]
    Transport(#[source] ErrorRecord),

    #[error("Request failed: {0}")]
    Failed(#[source] ErrorRecord),

    #[error("Internal error")]
    Internal,
}

impl UserProfileError {
    pub fn internal() -> Self {
        Self::Internal
    }

    /// The structured record behind this error, if any.
    pub fn record(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Transport(r) | Self::Failed(r) => Some(r),
            Self::Internal => None,
        }
    }
}

impl From<ErrorRecord> for UserProfileError {
    fn from(record: ErrorRecord) -> Self {
        match record.kind() {
            ErrorKind::TransportFailure => Self::Transport(record),
            ErrorKind::InvalidArgument | ErrorKind::GeneralFailure => Self::Failed(record),
        }
    }
}
