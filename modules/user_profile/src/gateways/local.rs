use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::oneshot;
use url::Url;

use crate::contract::{
    client::{ProfileObserver, UserProfileApi},
    error::UserProfileError,
    model::{AccessToken, ObserverId, PictureMode, PictureSize, Profile},
};
use crate::domain::service::Service;

/// Local implementation of the UserProfileApi trait that delegates to the domain service
pub struct UserProfileLocalClient {
    service: Arc<Service>,
}

impl UserProfileLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UserProfileApi for UserProfileLocalClient {
    async fn load_profile(
        &self,
        identity: Option<AccessToken>,
    ) -> Result<Option<Profile>, UserProfileError> {
        let (tx, rx) = oneshot::channel();
        self.service.load(identity, move |result| {
            // The receiver may already be gone if the caller was cancelled.
            let _ = tx.send(result);
        });

        match rx.await {
            Ok(result) => result.map_err(UserProfileError::from),
            Err(_) => {
                tracing::error!("profile load completion was dropped without being called");
                Err(UserProfileError::internal())
            }
        }
    }

    fn current_profile(&self) -> Option<Profile> {
        self.service.current_profile()
    }

    fn register_observer(&self, observer: Arc<dyn ProfileObserver>) -> ObserverId {
        self.service.register(observer)
    }

    fn unregister_observer(&self, id: ObserverId) -> bool {
        self.service.unregister(id)
    }

    fn picture_url(&self, profile: &Profile, mode: PictureMode, size: PictureSize) -> Url {
        self.service.picture_url(profile, mode, size)
    }
}
