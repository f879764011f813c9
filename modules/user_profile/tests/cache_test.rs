use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use chrono::Utc;

use user_profile::domain::cache::ProfileCache;
use user_profile::model::{Profile, ProfileChanged};

fn profile(id: String) -> Profile {
    Profile::new(id, Utc::now()).unwrap()
}

#[test]
fn observers_see_the_value_they_were_called_for() {
    let cache = Arc::new(ProfileCache::new(Duration::from_secs(60)));
    let mismatches = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));

    let weak: Weak<ProfileCache> = Arc::downgrade(&cache);
    let (m, c) = (mismatches.clone(), calls.clone());
    cache.register(Arc::new(move |change: &ProfileChanged| {
        c.fetch_add(1, Ordering::SeqCst);
        let Some(cache) = weak.upgrade() else { return };
        let current = cache.current().map(|p| p.user_id().to_string());
        let announced = change.new.as_ref().map(|p| p.user_id().to_string());
        if current != announced {
            m.fetch_add(1, Ordering::SeqCst);
        }
    }));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    if i % 50 == 49 {
                        cache.reset();
                    } else {
                        cache.update(profile(format!("{w}-{i}")));
                    }
                }
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 800);
    assert_eq!(mismatches.load(Ordering::SeqCst), 0);
}

#[test]
fn observer_can_unregister_itself_while_notified() {
    let cache = Arc::new(ProfileCache::new(Duration::from_secs(60)));
    let calls = Arc::new(AtomicUsize::new(0));
    let id_cell = Arc::new(parking_lot::Mutex::new(None));

    let weak = Arc::downgrade(&cache);
    let (c, ids) = (calls.clone(), id_cell.clone());
    let id = cache.register(Arc::new(move |_: &ProfileChanged| {
        c.fetch_add(1, Ordering::SeqCst);
        if let (Some(cache), Some(id)) = (weak.upgrade(), *ids.lock()) {
            cache.unregister(id);
        }
    }));
    *id_cell.lock() = Some(id);

    cache.update(profile("1".into()));
    cache.update(profile("2".into()));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.observer_count(), 0);
}

#[test]
fn reset_on_empty_cache_still_notifies() {
    let cache = ProfileCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    cache.register(Arc::new(move |change: &ProfileChanged| {
        assert!(change.old.is_none() && change.new.is_none());
        c.fetch_add(1, Ordering::SeqCst);
    }));

    cache.reset();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn update_keeps_last_identity() {
    let cache = ProfileCache::new(Duration::from_secs(60));
    let token = user_profile::model::AccessToken::new("t", "1", ["email"]);
    cache.update_with_identity(profile("1".into()), Some(token.clone()));
    cache.update(profile("2".into()));

    assert_eq!(cache.current().unwrap().user_id(), "2");
    assert_eq!(cache.last_identity(), Some(token));
}
