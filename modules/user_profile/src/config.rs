use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the user_profile module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserProfileConfig {
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_graph_api_version")]
    pub graph_api_version: String,
    /// App-level token used for picture URLs when no user token is present.
    #[serde(default)]
    pub client_token: Option<String>,
    #[serde(default = "default_staleness_window", with = "humantime_serde")]
    pub staleness_window: Duration,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for UserProfileConfig {
    fn default() -> Self {
        Self {
            graph_base_url: default_graph_base_url(),
            graph_api_version: default_graph_api_version(),
            client_token: None,
            staleness_window: default_staleness_window(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_api_version() -> String {
    "v2.0".to_string()
}

fn default_staleness_window() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
