//! Test support utilities
//!
//! This module provides utilities for capturing logs during tests.
//! It's only available when the `test-support` feature is enabled.

use crate::backend::Backend;
use crate::registry::{self, Candidate};
use crate::{FacadeConfig, Level, Logger, OwnedRecord, Record};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// A backend that captures all records in memory for testing
#[derive(Clone)]
pub struct CaptureBackend {
    records: Arc<Mutex<Vec<OwnedRecord>>>,
    min_level: Level,
}

impl CaptureBackend {
    /// Name used in configuration and reports
    pub const NAME: &'static str = "capture";

    /// Create a new capture backend that records every level
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            min_level: Level::Trace,
        }
    }

    /// Create with a specific level
    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// A registry candidate that always probes successfully and hands out
    /// this backend
    #[must_use]
    pub fn candidate(&self) -> Candidate {
        let backend = self.clone();
        Candidate::new(
            Self::NAME,
            || true,
            move |_: &FacadeConfig| -> Arc<dyn Backend> { Arc::new(backend.clone()) },
        )
    }

    /// Get all captured records
    #[must_use]
    pub fn records(&self) -> Vec<OwnedRecord> {
        self.records.lock().clone()
    }

    /// Captured records rendered one per line as `LEVEL [logger] message`
    #[must_use]
    pub fn logs(&self) -> String {
        self.records
            .lock()
            .iter()
            .map(|record| match &record.error {
                Some(error) => format!(
                    "{} [{}] {}: {error}\n",
                    record.level, record.logger, record.message
                ),
                None => format!("{} [{}] {}\n", record.level, record.logger, record.message),
            })
            .collect()
    }

    /// Clear captured records
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Check if logs contain a specific string
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.logs().contains(text)
    }
}

impl Default for CaptureBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CaptureBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn logger(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(CaptureLogger {
            name: Arc::from(name),
            backend: self.clone(),
        })
    }
}

/// Logger handed out by [`CaptureBackend`]
pub struct CaptureLogger {
    name: Arc<str>,
    backend: CaptureBackend,
}

impl Logger for CaptureLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, record: &Record<'_>) {
        self.backend.records.lock().push(record.to_owned_record());
    }

    #[inline(always)]
    fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.backend.min_level) && level.is_enabled_static()
    }
}

/// Cloneable in-memory writer, handy as a console backend sink
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, lossily decoded
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Test guard that routes the global registry into a capture backend and
/// prints the captured logs if the test panics
pub struct TestLogGuard {
    backend: CaptureBackend,
    test_name: String,
    printed: bool,
}

impl TestLogGuard {
    /// Reset the global registry and install a fresh capture backend.
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        let backend = CaptureBackend::new();
        let global = registry::global();
        global.reset();
        // Fresh after reset, so neither call can observe a resolved registry.
        let _ = global.register(backend.candidate());
        let _ = global.configure(
            FacadeConfig::builder()
                .level(Level::Trace)
                .backend(CaptureBackend::NAME)
                .build(),
        );

        Self {
            backend,
            test_name: test_name.into(),
            printed: false,
        }
    }

    /// Mark that the test passed (logs won't be printed)
    pub fn passed(&mut self) {
        self.printed = true;
    }

    /// Get the capture backend
    #[must_use]
    pub const fn backend(&self) -> &CaptureBackend {
        &self.backend
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        if !self.printed && std::thread::panicking() {
            let logs = self.backend.logs();
            if !logs.is_empty() {
                eprintln!("\n===== Logs from failed test '{}' =====", self.test_name);
                eprint!("{logs}");
                eprintln!("===== End of logs =====\n");
            }
        }
        registry::global().reset();
    }
}

/// Capture `tracing` events emitted by a closure
#[cfg(feature = "tracing-backend")]
pub mod tracing_capture {
    use parking_lot::Mutex;
    use std::fmt::Write;
    use std::sync::Arc;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, registry::LookupSpan};

    /// A `tracing` event reduced to what the facade emits
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CapturedEvent {
        /// Event level
        pub level: tracing::Level,
        /// Event message
        pub message: String,
        /// The `logger` field
        pub logger: Option<String>,
        /// The `error` field
        pub error: Option<String>,
    }

    /// A tracing layer that records every event it sees
    #[derive(Debug, Clone, Default)]
    pub struct CaptureLayer {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl CaptureLayer {
        /// Events recorded so far
        #[must_use]
        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().clone()
        }
    }

    impl<S> Layer<S> for CaptureLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);
            self.events.lock().push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                logger: visitor.logger,
                error: visitor.error,
            });
        }
    }

    /// Visitor to extract the facade's fields from tracing events
    #[derive(Default)]
    struct EventVisitor {
        message: String,
        logger: Option<String>,
        error: Option<String>,
    }

    impl EventVisitor {
        fn store(&mut self, field: &Field, value: String) {
            match field.name() {
                "message" => self.message = value,
                "logger" => self.logger = Some(value),
                "error" => self.error = Some(value),
                _ => {}
            }
        }
    }

    impl Visit for EventVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.store(field, value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            let mut rendered = String::new();
            let _ = write!(rendered, "{value:?}");
            self.store(field, rendered);
        }
    }

    /// Run `f` with a capturing subscriber as the thread's default and
    /// return the events it emitted
    pub fn capture(f: impl FnOnce()) -> Vec<CapturedEvent> {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, f);
        layer.events()
    }
}
