use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::contract::{
    error::UserProfileError,
    model::{AccessToken, ObserverId, PictureMode, PictureSize, Profile, ProfileChanged},
};

/// Listener for changes of the current profile.
///
/// Called synchronously while the cache holds its writer lock. An observer
/// may write to the cache or start a load; that change is delivered after
/// the current one.
pub trait ProfileObserver: Send + Sync {
    fn profile_changed(&self, change: &ProfileChanged);
}

impl<F> ProfileObserver for F
where
    F: Fn(&ProfileChanged) + Send + Sync,
{
    fn profile_changed(&self, change: &ProfileChanged) {
        self(change)
    }
}

/// Public API trait for the user_profile module that other modules can use
#[async_trait]
pub trait UserProfileApi: Send + Sync {
    /// Load the profile for `identity` (or the current identity), using the
    /// cache when it is fresh. `Ok(None)` means there was nothing to load.
    async fn load_profile(
        &self,
        identity: Option<AccessToken>,
    ) -> Result<Option<Profile>, UserProfileError>;

    /// Snapshot of the cached current profile.
    fn current_profile(&self) -> Option<Profile>;

    fn register_observer(&self, observer: Arc<dyn ProfileObserver>) -> ObserverId;

    /// Returns false if the id was not registered.
    fn unregister_observer(&self, id: ObserverId) -> bool;

    /// URL of the profile picture for `profile`.
    fn picture_url(&self, profile: &Profile, mode: PictureMode, size: PictureSize) -> Url;
}
