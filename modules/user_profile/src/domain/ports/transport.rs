use std::fmt;

use sdk_errors::ErrorRecord;
use serde_json::Value;

/// Outcome of one transport call: the raw, untrusted response body or a
/// transport-level error.
pub type FetchResult = Result<Value, ErrorRecord>;

/// Single-shot completion handed to the transport.
pub type FetchCompletion = Box<dyn FnOnce(FetchResult) + Send + 'static>;

/// A graph API read: a path, the selected fields and the token to send.
#[derive(Clone, PartialEq, Eq)]
pub struct GraphRequest {
    graph_path: String,
    fields: Vec<&'static str>,
    token_string: Option<String>,
}

impl GraphRequest {
    pub fn new(graph_path: impl Into<String>) -> Self {
        Self {
            graph_path: graph_path.into(),
            fields: Vec::new(),
            token_string: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<&'static str>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_token(mut self, token_string: impl Into<String>) -> Self {
        self.token_string = Some(token_string.into());
        self
    }

    pub fn graph_path(&self) -> &str {
        &self.graph_path
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn token_string(&self) -> Option<&str> {
        self.token_string.as_deref()
    }

    /// Comma-joined value of the `fields` parameter.
    pub fn fields_param(&self) -> String {
        self.fields.join(",")
    }

    /// `<path>?fields=<fields>`, the form logged and matched by tests.
    pub fn path_with_query(&self) -> String {
        if self.fields.is_empty() {
            self.graph_path.clone()
        } else {
            format!("{}?fields={}", self.graph_path, self.fields_param())
        }
    }
}

impl fmt::Debug for GraphRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphRequest")
            .field("graph_path", &self.graph_path)
            .field("fields", &self.fields)
            .field("token_string", &self.token_string.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Output port: performs the network call.
///
/// `completion` must be invoked exactly once, either inline or later from
/// another task/thread. Retries and timeouts are the transport's business.
pub trait GraphTransport: Send + Sync {
    fn fetch(&self, request: GraphRequest, completion: FetchCompletion);
}
