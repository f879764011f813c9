use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use sdk_errors::catalog::{
    GRAPH_REQUEST_GRAPH_API, GRAPH_REQUEST_NON_TEXT_MIME_TYPE, GRAPH_REQUEST_PROTOCOL_MISMATCH,
    NETWORK,
};
use sdk_errors::{ErrorFactory, ErrorParams};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info_span, Instrument};
use url::Url;

use crate::domain::error::DomainError;
use crate::domain::ports::{FetchCompletion, FetchResult, GraphRequest, GraphTransport};

/// HTTP adapter implementing the GraphTransport port.
///
/// Each fetch is a single `GET <base>/<version>/<path>` spawned on the
/// runtime captured at construction. No retries; the client's timeout applies.
pub struct HttpGraphTransport {
    client: reqwest::Client,
    base_url: Url,
    api_version: String,
    errors: Arc<dyn ErrorFactory>,
    runtime: Handle,
}

impl HttpGraphTransport {
    /// Must be called from within a tokio runtime.
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        api_version: impl Into<String>,
        errors: Arc<dyn ErrorFactory>,
    ) -> Result<Self, DomainError> {
        if base_url.cannot_be_a_base() {
            return Err(DomainError::invalid_base_url(base_url.as_str()));
        }
        let runtime = Handle::try_current().map_err(|_| DomainError::NoRuntime)?;
        Ok(Self {
            client,
            base_url,
            api_version: api_version.into(),
            errors,
            runtime,
        })
    }

    pub fn request_url(&self, request: &GraphRequest) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            if !self.api_version.is_empty() {
                segments.push(&self.api_version);
            }
            segments.extend(request.graph_path().split('/').filter(|s| !s.is_empty()));
        }
        {
            let mut query = url.query_pairs_mut();
            if !request.fields().is_empty() {
                query.append_pair("fields", &request.fields_param());
            }
            if let Some(token) = request.token_string() {
                query.append_pair("access_token", token);
            }
        }
        url
    }
}

impl GraphTransport for HttpGraphTransport {
    fn fetch(&self, request: GraphRequest, completion: FetchCompletion) {
        let url = self.request_url(&request);
        let client = self.client.clone();
        let errors = self.errors.clone();
        let span = info_span!(
            "user_profile.http.graph.fetch",
            path = %request.graph_path(),
            fields = %request.fields_param()
        );

        self.runtime.spawn(
            async move {
                let result = execute(&client, url, errors.as_ref()).await;
                completion(result);
            }
            .instrument(span),
        );
    }
}

async fn execute(client: &reqwest::Client, url: Url, errors: &dyn ErrorFactory) -> FetchResult {
    let response = client.get(url).send().await.map_err(|e| {
        errors.build_error(
            NETWORK.code,
            ErrorParams::new()
                .with_message("Graph request failed to reach the server")
                .with_underlying(e),
        )
    })?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_ascii_lowercase);
    let body = response.text().await.map_err(|e| {
        errors.build_error(
            NETWORK.code,
            ErrorParams::new()
                .with_message("Failed to read graph response body")
                .with_underlying(e),
        )
    })?;
    debug!(status = status.as_u16(), bytes = body.len(), "graph response received");

    if !status.is_success() {
        let message = graph_error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
        return Err(errors.build_error(
            GRAPH_REQUEST_GRAPH_API.code,
            ErrorParams::new()
                .with_message(message)
                .with_info("http_status", status.as_u16()),
        ));
    }

    if let Some(content_type) = content_type.as_deref() {
        if !is_textual(content_type) {
            return Err(errors.build_error(
                GRAPH_REQUEST_NON_TEXT_MIME_TYPE.code,
                ErrorParams::new()
                    .with_message(format!("Unexpected content type: {}", content_type))
                    .with_info("content_type", content_type),
            ));
        }
    }

    serde_json::from_str::<Value>(&body).map_err(|e| {
        errors.build_error(
            GRAPH_REQUEST_PROTOCOL_MISMATCH.code,
            ErrorParams::new()
                .with_message("Graph response is not valid JSON")
                .with_underlying(e),
        )
    })
}

/// `error.message` of a graph API error body, if the body has one.
fn graph_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")?
        .as_str()
        .map(str::to_owned)
}

fn is_textual(content_type: &str) -> bool {
    content_type.starts_with("text/") || content_type.contains("json") || content_type.contains("javascript")
}
