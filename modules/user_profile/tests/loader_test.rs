mod common;

use std::sync::Arc;

use chrono::TimeDelta;
use parking_lot::Mutex;
use serde_json::json;

use common::*;
use user_profile::client::UserProfileApi;
use user_profile::domain::service::LoadResult;
use user_profile::error::UserProfileError;
use user_profile::gateways::local::UserProfileLocalClient;
use user_profile::model::ProfileChanged;

fn capture(slot: &Slot<LoadResult>) -> impl FnOnce(LoadResult) + Send + 'static {
    let slot = slot.clone();
    move |result| {
        *slot.lock() = Some(result);
    }
}

fn loaded_user(slot: &Slot<LoadResult>) -> Option<String> {
    match slot.lock().as_ref() {
        Some(Ok(Some(p))) => Some(p.user_id().to_string()),
        _ => None,
    }
}

/// Prime the cache through a real load at `t0()`.
fn prime(h: &Harness, transport: &InlineTransport, id: &str) {
    transport.push(Ok(profile_json(id)));
    let out = slot();
    h.service.load(Some(token("tok-1", &[])), capture(&out));
    assert_eq!(loaded_user(&out).as_deref(), Some(id));
}

#[test]
fn fresh_cache_completes_inline_without_fetch() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    prime(&h, &transport, "1");

    h.clock.set(t0() + TimeDelta::from_std(WINDOW).unwrap() - TimeDelta::seconds(1));
    let out = slot();
    h.service.load(None, capture(&out));

    assert_eq!(loaded_user(&out).as_deref(), Some("1"));
    assert_eq!(transport.calls(), 1);
}

#[test]
fn stale_cache_goes_to_network() {
    let transport = DeferredTransport::new();
    let h = harness(transport.clone());
    h.cache.update_with_identity(
        user_profile::domain::parser::parse_profile(&profile_json("1"), t0()).unwrap(),
        Some(token("tok-1", &[])),
    );

    h.clock.set(t0() + TimeDelta::from_std(WINDOW).unwrap() + TimeDelta::seconds(1));
    let out = slot();
    h.service.load(None, capture(&out));

    assert_eq!(transport.calls(), 1);
    assert!(out.lock().is_none(), "completion must wait for the transport");

    transport.resolve_oldest(Ok(profile_json("2")));
    assert_eq!(loaded_user(&out).as_deref(), Some("2"));
    assert_eq!(h.service.current_profile().unwrap().user_id(), "2");
}

#[test]
fn exact_window_boundary_is_stale() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    prime(&h, &transport, "1");

    h.clock.set(t0() + TimeDelta::from_std(WINDOW).unwrap());
    transport.push(Ok(profile_json("1")));
    h.service.load(None, |_| {});

    assert_eq!(transport.calls(), 2);
}

#[test]
fn refetched_profile_is_stamped_with_clock() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    h.clock.advance(TimeDelta::minutes(5));
    prime(&h, &transport, "1");
    assert_eq!(
        h.service.current_profile().unwrap().last_fetched_at(),
        t0() + TimeDelta::minutes(5)
    );
}

#[test]
fn explicit_identity_bypasses_fresh_cache() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    prime(&h, &transport, "1");

    transport.push(Ok(profile_json("1")));
    h.service.load(Some(token("tok-2", &[])), |_| {});
    assert_eq!(transport.calls(), 2);
}

#[test]
fn no_identity_anywhere_completes_with_nothing() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());

    let out = slot();
    h.service.load(None, capture(&out));

    assert!(matches!(*out.lock(), Some(Ok(None))));
    assert_eq!(transport.calls(), 0);
    assert!(h.reporter.is_empty(), "absence of identity is not an error");
}

#[test]
fn stale_load_reuses_last_identity() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    prime(&h, &transport, "1");

    h.clock.advance(TimeDelta::hours(2));
    transport.push(Ok(profile_json("1")));
    h.service.load(None, |_| {});

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].token_string(), Some("tok-1"));
}

#[test]
fn ambient_identity_is_the_last_fallback() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    h.tokens.set(Some(token("ambient", &["email"])));

    transport.push(Ok(profile_json("7")));
    let out = slot();
    h.service.load(None, capture(&out));

    assert_eq!(loaded_user(&out).as_deref(), Some("7"));
    let request = &transport.requests()[0];
    assert_eq!(request.token_string(), Some("ambient"));
    assert!(request.fields().contains(&"email"));
}

#[test]
fn request_fields_follow_permissions() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());

    transport.push(Ok(profile_json("1")));
    h.service
        .load(Some(token("t", &["user_friends", "user_link"])), |_| {});

    assert_eq!(
        transport.requests()[0].path_with_query(),
        "me?fields=id,first_name,middle_name,last_name,name,link,friends"
    );
}

#[test]
fn transport_error_leaves_cache_untouched() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    prime(&h, &transport, "1");

    let notified = Arc::new(Mutex::new(0));
    let counter = notified.clone();
    h.service
        .register(Arc::new(move |_: &ProfileChanged| *counter.lock() += 1));

    transport.push(Err(network_error(h.errors.as_ref())));
    let out = slot();
    h.service.load(Some(token("tok-2", &[])), capture(&out));

    match out.lock().as_ref() {
        Some(Err(err)) => {
            assert_eq!(err.code(), sdk_errors::catalog::NETWORK.code);
            assert!(err.is_transport_failure());
        }
        other => panic!("expected transport error, got {:?}", other.map(|r| r.is_ok())),
    }
    assert_eq!(h.service.current_profile().unwrap().user_id(), "1");
    assert_eq!(*notified.lock(), 0);
    assert_eq!(h.reporter.len(), 1);
}

#[test]
fn unparseable_response_is_a_silent_no_op() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    prime(&h, &transport, "1");

    let notified = Arc::new(Mutex::new(0));
    let counter = notified.clone();
    h.service
        .register(Arc::new(move |_: &ProfileChanged| *counter.lock() += 1));

    for body in [json!({"id": ""}), json!({"name": "no id"}), json!([1, 2]), json!(null)] {
        transport.push(Ok(body));
        let out = slot();
        h.service.load(Some(token("tok-2", &[])), capture(&out));
        assert!(matches!(*out.lock(), Some(Ok(None))));
    }

    assert_eq!(h.service.current_profile().unwrap().user_id(), "1");
    assert_eq!(*notified.lock(), 0);
    assert!(h.reporter.is_empty());
}

#[test]
fn observers_run_before_completion() {
    let transport = DeferredTransport::new();
    let h = harness(transport.clone());
    let log = Arc::new(Mutex::new(Vec::<String>::new()));

    let observer_log = log.clone();
    h.service.register(Arc::new(move |change: &ProfileChanged| {
        let id = change.new.as_ref().map(|p| p.user_id().to_string());
        observer_log.lock().push(format!("notified:{}", id.unwrap_or_default()));
    }));

    let completion_log = log.clone();
    h.service.load(Some(token("t", &[])), move |result| {
        let seen = result.ok().flatten().map(|p| p.user_id().to_string());
        completion_log
            .lock()
            .push(format!("completed:{}", seen.unwrap_or_default()));
    });

    transport.resolve_oldest(Ok(profile_json("5")));
    assert_eq!(*log.lock(), vec!["notified:5", "completed:5"]);
}

#[test]
fn racing_loads_last_writer_wins() {
    let transport = DeferredTransport::new();
    let h = harness(transport.clone());

    h.service.load(Some(token("a", &[])), |_| {});
    h.service.load(Some(token("b", &[])), |_| {});
    assert_eq!(transport.pending(), 2);

    transport.resolve_newest(Ok(profile_json("b")));
    transport.resolve_oldest(Ok(profile_json("a")));

    assert_eq!(h.service.current_profile().unwrap().user_id(), "a");
    assert_eq!(h.cache.last_identity().unwrap().token_string(), "a");
}

#[test]
fn unregistered_observer_is_not_called() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let id = h
        .service
        .register(Arc::new(move |_: &ProfileChanged| *counter.lock() += 1));

    prime(&h, &transport, "1");
    assert!(h.service.unregister(id));
    transport.push(Ok(profile_json("2")));
    h.service.load(Some(token("t", &[])), |_| {});

    assert_eq!(*calls.lock(), 1);
}

#[test]
fn observer_can_reload_through_inline_transport() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));

    let service = Arc::downgrade(&h.service);
    h.service.register(Arc::new(move |change: &ProfileChanged| {
        let reload = change.new.as_deref().map(|p| p.user_id()) == Some("1");
        if let (true, Some(service)) = (reload, service.upgrade()) {
            service.load(Some(token("tok-2", &[])), |_| {});
        }
    }));
    let sink = seen.clone();
    h.service.register(Arc::new(move |change: &ProfileChanged| {
        let id = change.new.as_ref().map(|p| p.user_id().to_string());
        sink.lock().push(id.unwrap_or_default());
    }));

    transport.push(Ok(profile_json("1")));
    transport.push(Ok(profile_json("2")));
    let out = slot();
    h.service.load(Some(token("tok-1", &[])), capture(&out));

    assert_eq!(loaded_user(&out).as_deref(), Some("1"));
    assert_eq!(transport.calls(), 2);
    assert_eq!(*seen.lock(), vec!["1", "2"]);
    assert_eq!(h.service.current_profile().unwrap().user_id(), "2");
    assert_eq!(h.cache.last_identity().unwrap().token_string(), "tok-2");
}

#[test]
fn observer_can_reset_the_cache() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());

    let service = Arc::downgrade(&h.service);
    h.service.register(Arc::new(move |change: &ProfileChanged| {
        if let (true, Some(service)) = (change.new.is_some(), service.upgrade()) {
            service.reset();
        }
    }));

    prime(&h, &transport, "1");
    assert!(h.service.current_profile().is_none());
    assert!(h.cache.last_identity().is_none());
}

#[tokio::test]
async fn local_client_bridges_to_async() {
    let transport = InlineTransport::new();
    let h = harness(transport.clone());
    let client = UserProfileLocalClient::new(h.service.clone());

    transport.push(Ok(profile_json("9")));
    let profile = client
        .load_profile(Some(token("t", &[])))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.user_id(), "9");
    assert_eq!(client.current_profile().unwrap().user_id(), "9");

    transport.push(Err(network_error(h.errors.as_ref())));
    let err = client.load_profile(Some(token("t", &[]))).await.unwrap_err();
    assert!(matches!(err, UserProfileError::Transport(_)));
}

#[tokio::test]
async fn dropped_completion_is_internal_error() {
    let h = harness(Arc::new(DroppingTransport));
    let client = UserProfileLocalClient::new(h.service.clone());

    let err = client.load_profile(Some(token("t", &[]))).await.unwrap_err();
    assert!(matches!(err, UserProfileError::Internal));
}
