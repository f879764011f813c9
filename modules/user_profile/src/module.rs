use std::sync::Arc;

use arc_swap::ArcSwapOption;
use sdk_errors::{ErrorFactory, ErrorReporter, ReportingErrorFactory};
use tracing::{debug, info};
use url::Url;

use crate::config::UserProfileConfig;
use crate::contract::client::UserProfileApi;
use crate::domain::cache::ProfileCache;
use crate::domain::picture::PictureUrlBuilder;
use crate::domain::ports::{
    AccessTokenSlot, Clock, ConfiguredClientToken, GraphTransport, SystemClock,
};
use crate::domain::service::Service;
use crate::gateways::local::UserProfileLocalClient;
use crate::infra::graph::HttpGraphTransport;

pub const MODULE_NAME: &str = "user_profile";

/// Main module struct: owns the wired domain service and the token slot the
/// host application signs users in and out through.
#[derive(Default)]
pub struct UserProfile {
    // Keep the domain service behind ArcSwap for cheap read-mostly access.
    service: ArcSwapOption<Service>,
    errors: ArcSwapOption<ReportingErrorFactory>,
    tokens: Arc<AccessTokenSlot>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the module with the HTTP graph transport. Must run inside a
    /// tokio runtime.
    pub fn init(
        &self,
        cfg: &UserProfileConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> anyhow::Result<()> {
        info!("Initializing user_profile module");
        debug!(
            "Loaded user_profile config: graph_base_url={}, api_version={}, staleness_window={:?}",
            cfg.graph_base_url, cfg.graph_api_version, cfg.staleness_window
        );

        let errors = Arc::new(ReportingErrorFactory::new(reporter));
        let base_url = parse_base_url(&cfg.graph_base_url)?;
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;
        let transport = HttpGraphTransport::new(
            client,
            base_url,
            cfg.graph_api_version.clone(),
            errors.clone() as Arc<dyn ErrorFactory>,
        )?;

        self.init_with(cfg, errors, Arc::new(transport), Arc::new(SystemClock))
    }

    /// Wire the module around an arbitrary transport and clock.
    pub fn init_with(
        &self,
        cfg: &UserProfileConfig,
        errors: Arc<ReportingErrorFactory>,
        transport: Arc<dyn GraphTransport>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<()> {
        let base_url = parse_base_url(&cfg.graph_base_url)?;
        let pictures = PictureUrlBuilder::new(
            base_url,
            cfg.graph_api_version.clone(),
            self.tokens.clone(),
            Arc::new(ConfiguredClientToken::new(cfg.client_token.clone())),
        )?;

        let service = Service::new(
            Arc::new(ProfileCache::new(cfg.staleness_window)),
            transport,
            self.tokens.clone(),
            clock,
            pictures,
        );

        self.errors.store(Some(errors));
        self.service.store(Some(Arc::new(service)));
        info!("user_profile module initialized");
        Ok(())
    }

    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// Local in-process client over the wired service.
    pub fn client(&self) -> anyhow::Result<Arc<dyn UserProfileApi>> {
        let api: Arc<dyn UserProfileApi> = Arc::new(UserProfileLocalClient::new(self.service()?));
        Ok(api)
    }

    pub fn error_factory(&self) -> anyhow::Result<Arc<ReportingErrorFactory>> {
        self.errors
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Error factory not initialized"))
    }

    /// Slot holding the signed-in user's token.
    pub fn access_tokens(&self) -> &Arc<AccessTokenSlot> {
        &self.tokens
    }
}

fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw).map_err(|e| anyhow::anyhow!("invalid graph_base_url '{}': {}", raw, e))
}
