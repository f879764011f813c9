use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use parking_lot::{ReentrantMutex, RwLock};

use crate::contract::client::ProfileObserver;
use crate::contract::model::{AccessToken, ObserverId, Profile, ProfileChanged};

type ObserverEntry = (ObserverId, Arc<dyn ProfileObserver>);

/// Changes committed but not yet delivered, plus whether a delivery loop
/// is already running on the lock-holding thread.
#[derive(Default)]
struct Pending {
    delivering: bool,
    queue: VecDeque<ProfileChanged>,
}

/// Holder of the current profile.
///
/// Reads are lock-free snapshots. Writers (`update*`, `reset`) are
/// serialized, and observers are notified before the writer lock is
/// released, so no observer sees a value older than the one it was called for.
///
/// The writer lock is re-entrant: an observer may write to the cache (or
/// trigger a load that does). Such nested changes are queued and delivered
/// after the current one, so every observer sees changes in commit order.
pub struct ProfileCache {
    current: ArcSwapOption<Profile>,
    last_identity: ArcSwapOption<AccessToken>,
    staleness_window: Duration,
    writer: ReentrantMutex<RefCell<Pending>>,
    observers: RwLock<Vec<ObserverEntry>>,
    next_observer: AtomicU64,
}

impl ProfileCache {
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            last_identity: ArcSwapOption::empty(),
            staleness_window,
            writer: ReentrantMutex::new(RefCell::new(Pending::default())),
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(1),
        }
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    pub fn current(&self) -> Option<Profile> {
        self.current.load_full().map(|p| (*p).clone())
    }

    pub fn current_arc(&self) -> Option<Arc<Profile>> {
        self.current.load_full()
    }

    /// Identity used by the most recent successful load.
    pub fn last_identity(&self) -> Option<AccessToken> {
        self.last_identity.load_full().map(|t| (*t).clone())
    }

    /// `now - last_fetched_at >= staleness_window`. A timestamp in the future
    /// counts as zero age.
    pub fn is_stale(&self, profile: &Profile, now: DateTime<Utc>) -> bool {
        let age = (now - profile.last_fetched_at())
            .to_std()
            .unwrap_or_default();
        age >= self.staleness_window
    }

    pub fn update(&self, profile: Profile) {
        self.replace(Some(Arc::new(profile)), None);
    }

    /// Replace the current profile and remember the identity it was loaded with.
    pub fn update_with_identity(&self, profile: Profile, identity: Option<AccessToken>) {
        self.replace(Some(Arc::new(profile)), identity.map(Arc::new));
    }

    /// Clear the current profile and the remembered identity. Observers are
    /// always notified, even if the cache was already empty.
    pub fn reset(&self) {
        let guard = self.writer.lock();
        self.last_identity.store(None);
        let old = self.current.swap(None);
        tracing::debug!(had_profile = old.is_some(), "profile cache reset");
        self.publish(&guard, ProfileChanged { old, new: None });
    }

    pub fn register(&self, observer: Arc<dyn ProfileObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        id
    }

    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    fn replace(&self, new: Option<Arc<Profile>>, identity: Option<Arc<AccessToken>>) {
        let guard = self.writer.lock();
        if identity.is_some() {
            self.last_identity.store(identity);
        }
        let old = self.current.swap(new.clone());
        tracing::debug!(
            user_id = new.as_deref().map(Profile::user_id),
            "profile cache updated"
        );
        self.publish(&guard, ProfileChanged { old, new });
    }

    // Runs under the writer lock. A nested call from inside an observer only
    // enqueues; the outermost call drains the queue.
    fn publish(&self, pending: &RefCell<Pending>, change: ProfileChanged) {
        {
            let mut state = pending.borrow_mut();
            state.queue.push_back(change);
            if state.delivering {
                return;
            }
            state.delivering = true;
        }

        let _drain = DrainGuard(pending);
        loop {
            let next = pending.borrow_mut().queue.pop_front();
            let Some(change) = next else {
                break;
            };
            self.notify(&change);
        }
    }

    // The observer list is snapshotted so callbacks may register or
    // unregister without deadlocking.
    fn notify(&self, change: &ProfileChanged) {
        let observers: Vec<Arc<dyn ProfileObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, o)| o.clone())
            .collect();
        for observer in observers {
            observer.profile_changed(change);
        }
    }
}

/// Ends a delivery loop, also when an observer panics, so later writes
/// still notify.
struct DrainGuard<'a>(&'a RefCell<Pending>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.borrow_mut();
        state.delivering = false;
        state.queue.clear();
    }
}

impl std::fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileCache")
            .field("current", &self.current.load().as_deref().map(Profile::user_id))
            .field("staleness_window", &self.staleness_window)
            .field("observers", &self.observer_count())
            .finish()
    }
}
