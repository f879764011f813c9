use std::sync::Arc;

use url::Url;

use crate::contract::model::{PictureMode, PictureSize};
use crate::domain::error::DomainError;
use crate::domain::ports::{ClientTokenSource, CurrentIdentitySource};

/// Builds `<base>/<version>/<id>/picture?type=..&width=..&height=..[&access_token=..]`.
pub struct PictureUrlBuilder {
    base_url: Url,
    api_version: String,
    identity: Arc<dyn CurrentIdentitySource>,
    client_token: Arc<dyn ClientTokenSource>,
}

impl PictureUrlBuilder {
    pub fn new(
        base_url: Url,
        api_version: impl Into<String>,
        identity: Arc<dyn CurrentIdentitySource>,
        client_token: Arc<dyn ClientTokenSource>,
    ) -> Result<Self, DomainError> {
        if base_url.cannot_be_a_base() {
            return Err(DomainError::invalid_base_url(base_url.as_str()));
        }
        Ok(Self {
            base_url,
            api_version: api_version.into(),
            identity,
            client_token,
        })
    }

    /// Size values go through untouched, zero and negative included.
    pub fn build_url(&self, mode: PictureMode, size: PictureSize, subject_id: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            if !self.api_version.is_empty() {
                segments.push(&self.api_version);
            }
            segments.push(subject_id).push("picture");
        }

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("type", mode.as_str())
                .append_pair("width", &size.width.to_string())
                .append_pair("height", &size.height.to_string());
            if let Some(token) = self.authorization_token() {
                query.append_pair("access_token", &token);
            }
        }
        url
    }

    /// User token first, then the app's client token, else nothing.
    fn authorization_token(&self) -> Option<String> {
        self.identity
            .current_access_token()
            .map(|t| t.token_string().to_owned())
            .filter(|t| !t.is_empty())
            .or_else(|| self.client_token.client_token())
    }
}
