use parking_lot::Mutex;

/// Telemetry sink for constructed errors.
///
/// Implementations must not panic; the factory calls `capture` inline on the
/// constructing thread.
pub trait ErrorReporter: Send + Sync {
    fn capture(&self, code: i64, domain: &str, message: Option<&str>);
}

impl<F> ErrorReporter for F
where
    F: Fn(i64, &str, Option<&str>) + Send + Sync,
{
    fn capture(&self, code: i64, domain: &str, message: Option<&str>) {
        self(code, domain, message)
    }
}

/// Default sink: emits every captured error as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn capture(&self, code: i64, domain: &str, message: Option<&str>) {
        tracing::warn!(
            target: "sdk_errors",
            code = code,
            domain = %domain,
            detail = message.unwrap_or_default(),
            "error captured"
        );
    }
}

/// One event seen by a [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    pub code: i64,
    pub domain: String,
    pub message: Option<String>,
}

/// Buffers captured errors in memory, in capture order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<CapturedError>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far.
    pub fn events(&self) -> Vec<CapturedError> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drain the buffer, returning what was captured.
    pub fn take(&self) -> Vec<CapturedError> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl ErrorReporter for MemoryReporter {
    fn capture(&self, code: i64, domain: &str, message: Option<&str>) {
        self.events.lock().push(CapturedError {
            code,
            domain: domain.to_owned(),
            message: message.map(str::to_owned),
        });
    }
}
