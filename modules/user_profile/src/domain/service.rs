use std::sync::Arc;

use sdk_errors::ErrorRecord;
use tracing::{debug, info_span, warn};
use url::Url;

use crate::contract::client::ProfileObserver;
use crate::contract::model::{AccessToken, ObserverId, PictureMode, PictureSize, Profile};
use crate::domain::cache::ProfileCache;
use crate::domain::parser::parse_profile;
use crate::domain::picture::PictureUrlBuilder;
use crate::domain::ports::{Clock, CurrentIdentitySource, FetchResult, GraphTransport};
use crate::domain::request::build_profile_request;

/// Outcome handed to a load completion. `Ok(None)` is "nothing happened":
/// no usable identity, or a response that did not parse into a profile.
pub type LoadResult = Result<Option<Profile>, ErrorRecord>;

/// Domain service: the load pipeline around the profile cache.
pub struct Service {
    cache: Arc<ProfileCache>,
    transport: Arc<dyn GraphTransport>,
    identity: Arc<dyn CurrentIdentitySource>,
    clock: Arc<dyn Clock>,
    pictures: PictureUrlBuilder,
}

impl Service {
    pub fn new(
        cache: Arc<ProfileCache>,
        transport: Arc<dyn GraphTransport>,
        identity: Arc<dyn CurrentIdentitySource>,
        clock: Arc<dyn Clock>,
        pictures: PictureUrlBuilder,
    ) -> Self {
        Self {
            cache,
            transport,
            identity,
            clock,
            pictures,
        }
    }

    pub fn cache(&self) -> &Arc<ProfileCache> {
        &self.cache
    }

    /// Load the profile and invoke `completion` exactly once.
    ///
    /// Completes inline when the cached profile is fresh and no identity was
    /// given, and when there is no identity to load with. Otherwise completes
    /// from the transport's callback, after the cache has been updated and
    /// observers notified.
    pub fn load<F>(&self, identity: Option<AccessToken>, completion: F)
    where
        F: FnOnce(LoadResult) + Send + 'static,
    {
        let span = info_span!(
            "user_profile.service.load",
            explicit_identity = identity.is_some()
        );
        let _enter = span.enter();

        if identity.is_none() {
            if let Some(cached) = self.cache.current() {
                if !self.cache.is_stale(&cached, self.clock.now()) {
                    debug!(user_id = cached.user_id(), "returning fresh cached profile");
                    completion(Ok(Some(cached)));
                    return;
                }
            }
        }

        let Some(effective) = self.effective_identity(identity) else {
            debug!("no identity available, nothing to load");
            completion(Ok(None));
            return;
        };

        let request = build_profile_request(&effective);
        debug!(path = %request.path_with_query(), "fetching profile");

        let cache = self.cache.clone();
        let clock = self.clock.clone();
        let callback_span = span.clone();
        self.transport.fetch(
            request,
            Box::new(move |result: FetchResult| {
                let _enter = callback_span.enter();
                completion(Self::finish(&cache, clock.as_ref(), effective, result));
            }),
        );
    }

    fn finish(
        cache: &ProfileCache,
        clock: &dyn Clock,
        identity: AccessToken,
        result: FetchResult,
    ) -> LoadResult {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                warn!(code = err.code(), domain = err.domain(), "profile fetch failed");
                return Err(err);
            }
        };

        match parse_profile(&raw, clock.now()) {
            Some(profile) => {
                cache.update_with_identity(profile.clone(), Some(identity));
                Ok(Some(profile))
            }
            None => {
                debug!("response carried no usable profile, cache untouched");
                Ok(None)
            }
        }
    }

    /// Provided identity, else the one of the last successful load, else the
    /// ambient current identity.
    fn effective_identity(&self, provided: Option<AccessToken>) -> Option<AccessToken> {
        provided
            .or_else(|| self.cache.last_identity())
            .or_else(|| self.identity.current_access_token())
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.cache.current()
    }

    pub fn register(&self, observer: Arc<dyn ProfileObserver>) -> ObserverId {
        self.cache.register(observer)
    }

    pub fn unregister(&self, id: ObserverId) -> bool {
        self.cache.unregister(id)
    }

    pub fn reset(&self) {
        self.cache.reset();
    }

    pub fn picture_url(&self, profile: &Profile, mode: PictureMode, size: PictureSize) -> Url {
        self.pictures.build_url(mode, size, profile.user_id())
    }

    /// Picture URL of the current profile, if one is cached.
    pub fn current_picture_url(&self, mode: PictureMode, size: PictureSize) -> Option<Url> {
        self.cache
            .current_arc()
            .map(|p| self.pictures.build_url(mode, size, p.user_id()))
    }
}
