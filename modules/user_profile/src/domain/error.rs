use thiserror::Error;

/// Wiring-time errors of the domain layer
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Base URL cannot carry a path: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Graph transport requires a running tokio runtime")]
    NoRuntime,
}

impl DomainError {
    pub fn invalid_base_url(url: impl Into<String>) -> Self {
        Self::InvalidBaseUrl { url: url.into() }
    }
}
