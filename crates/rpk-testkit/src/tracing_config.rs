//! Tracing configuration for test output.
//!
//! Provides utilities for configuring tracing in tests and for capturing
//! events so tests can assert on what was logged.

use std::fmt::Debug;
use std::sync::{Arc, Once};

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize tracing for tests.
///
/// Safe to call multiple times; only the first call installs a subscriber.
/// Uses `RUST_LOG` if set, otherwise `info` with debug output for the
/// rate limit crate.
///
/// # Example
///
/// ```rust
/// use rpk_testkit::init_test_tracing;
///
/// #[tokio::test]
/// async fn my_test() {
///     init_test_tracing();
///     // ... test code
/// }
/// ```
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,rpk_ratelimit=debug"));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_ansi(true)
                    .compact(),
            )
            .init();
    });
}

/// Initialize tracing with a specific filter.
pub fn init_test_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_ansi(true)
                    .compact(),
            )
            .init();
    });
}

/// Captures tracing events for assertion.
///
/// Install it for the current thread with [`TracingCapture::install`]; a
/// `current_thread` tokio runtime runs spawned timer tasks on that same
/// thread, so their events are captured too.
#[derive(Debug, Clone, Default)]
pub struct TracingCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// A captured tracing event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// Event level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,
    /// Event message
    pub message: String,
    /// Event target (module path)
    pub target: String,
    /// Remaining fields, formatted
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl TracingCapture {
    /// Create a new tracing capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route this thread's events into the capture until the guard drops.
    #[must_use]
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            events: Arc::clone(&self.events),
        });
        tracing::subscriber::set_default(subscriber)
    }

    /// Get all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Check if any event contains the given message.
    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.message.contains(message))
    }

    /// Check if any error event was logged.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.events.lock().iter().any(|e| e.level == "ERROR")
    }

    /// Assert no errors were logged.
    ///
    /// # Panics
    ///
    /// Panics if any error events were captured.
    pub fn assert_no_errors(&self) {
        let errors: Vec<_> = self
            .events
            .lock()
            .iter()
            .filter(|e| e.level == "ERROR")
            .cloned()
            .collect();

        assert!(errors.is_empty(), "Expected no errors but found: {errors:?}");
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.events.lock().push(CapturedEvent {
            level: metadata.level().to_string(),
            message: visitor.message,
            target: metadata.target().to_string(),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let formatted = format!("{value:?}");
        if field.name() == "message" {
            self.message = formatted;
        } else {
            self.fields.push((field.name().to_string(), formatted));
        }
    }
}
