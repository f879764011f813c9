#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use sdk_errors::{ErrorFactory, ErrorParams, ErrorRecord, MemoryReporter, ReportingErrorFactory};
use serde_json::{json, Value};
use url::Url;

use user_profile::domain::cache::ProfileCache;
use user_profile::domain::picture::PictureUrlBuilder;
use user_profile::domain::ports::{
    AccessTokenSlot, Clock, ConfiguredClientToken, FetchCompletion, FetchResult, GraphRequest,
    GraphTransport,
};
use user_profile::domain::service::Service;
use user_profile::model::AccessToken;

pub const WINDOW: Duration = Duration::from_secs(3600);

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Clock the test moves by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self { now: Mutex::new(at) })
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Completes every fetch inline with the next scripted result.
#[derive(Default)]
pub struct InlineTransport {
    responses: Mutex<VecDeque<FetchResult>>,
    requests: Mutex<Vec<GraphRequest>>,
}

impl InlineTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, result: FetchResult) {
        self.responses.lock().push_back(result);
    }

    pub fn requests(&self) -> Vec<GraphRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

impl GraphTransport for InlineTransport {
    fn fetch(&self, request: GraphRequest, completion: FetchCompletion) {
        self.requests.lock().push(request);
        let result = self.responses.lock().pop_front().unwrap_or(Ok(Value::Null));
        completion(result);
    }
}

/// Holds completions until the test resolves them.
#[derive(Default)]
pub struct DeferredTransport {
    pending: Mutex<VecDeque<(GraphRequest, FetchCompletion)>>,
    calls: Mutex<usize>,
}

impl DeferredTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the oldest outstanding fetch.
    pub fn resolve_oldest(&self, result: FetchResult) -> GraphRequest {
        let (request, completion) = self.pending.lock().pop_front().expect("no pending fetch");
        completion(result);
        request
    }

    /// Complete the newest outstanding fetch.
    pub fn resolve_newest(&self, result: FetchResult) -> GraphRequest {
        let (request, completion) = self.pending.lock().pop_back().expect("no pending fetch");
        completion(result);
        request
    }
}

impl GraphTransport for DeferredTransport {
    fn fetch(&self, request: GraphRequest, completion: FetchCompletion) {
        *self.calls.lock() += 1;
        self.pending.lock().push_back((request, completion));
    }
}

/// Drops the completion without calling it.
pub struct DroppingTransport;

impl GraphTransport for DroppingTransport {
    fn fetch(&self, _request: GraphRequest, _completion: FetchCompletion) {}
}

pub struct Harness {
    pub service: Arc<Service>,
    pub cache: Arc<ProfileCache>,
    pub clock: Arc<ManualClock>,
    pub tokens: Arc<AccessTokenSlot>,
    pub reporter: Arc<MemoryReporter>,
    pub errors: Arc<ReportingErrorFactory>,
}

pub fn harness(transport: Arc<dyn GraphTransport>) -> Harness {
    let clock = ManualClock::new(t0());
    let tokens = Arc::new(AccessTokenSlot::new());
    let reporter = Arc::new(MemoryReporter::new());
    let errors = Arc::new(ReportingErrorFactory::new(reporter.clone()));
    let cache = Arc::new(ProfileCache::new(WINDOW));
    let pictures = PictureUrlBuilder::new(
        Url::parse("https://graph.test/").unwrap(),
        "v2.0",
        tokens.clone(),
        Arc::new(ConfiguredClientToken::new(Some("app-token".into()))),
    )
    .unwrap();
    let service = Arc::new(Service::new(
        cache.clone(),
        transport,
        tokens.clone(),
        clock.clone(),
        pictures,
    ));
    Harness {
        service,
        cache,
        clock,
        tokens,
        reporter,
        errors,
    }
}

pub fn token(value: &str, permissions: &[&str]) -> AccessToken {
    AccessToken::new(value, "100", permissions.iter().copied())
}

pub fn profile_json(id: &str) -> Value {
    json!({"id": id, "first_name": "Ada", "name": "Ada Lovelace"})
}

pub fn network_error(errors: &dyn ErrorFactory) -> ErrorRecord {
    errors.build_error(
        sdk_errors::catalog::NETWORK.code,
        ErrorParams::new().with_message("offline"),
    )
}

/// Captures the outcome of a completion for later inspection.
pub type Slot<T> = Arc<Mutex<Option<T>>>;

pub fn slot<T>() -> Slot<T> {
    Arc::new(Mutex::new(None))
}
