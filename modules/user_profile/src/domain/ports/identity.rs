use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::contract::model::AccessToken;

/// Ambient provider of the currently signed-in identity.
pub trait CurrentIdentitySource: Send + Sync {
    fn current_access_token(&self) -> Option<AccessToken>;
}

/// Ambient provider of the app-level client token.
pub trait ClientTokenSource: Send + Sync {
    fn client_token(&self) -> Option<String>;
}

/// In-process holder of the current access token.
#[derive(Debug, Default)]
pub struct AccessTokenSlot {
    current: ArcSwapOption<AccessToken>,
}

impl AccessTokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<AccessToken>) {
        self.current.store(token.map(Arc::new));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl CurrentIdentitySource for AccessTokenSlot {
    fn current_access_token(&self) -> Option<AccessToken> {
        self.current.load_full().map(|t| (*t).clone())
    }
}

/// Client token taken from configuration; blank values count as unset.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredClientToken(Option<String>);

impl ConfiguredClientToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.trim().is_empty()))
    }
}

impl ClientTokenSource for ConfiguredClientToken {
    fn client_token(&self) -> Option<String> {
        self.0.clone()
    }
}
