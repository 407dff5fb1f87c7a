//! Recording callbacks for rate-limited wrappers.
//!
//! A [`CallRecorder`] hands out callbacks that remember every execution with
//! its arguments and the (tokio, so pause-aware) instant it happened.

use std::convert::Infallible;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

/// One recorded callback execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall<A> {
    /// When the callback ran.
    pub at: Instant,
    /// Arguments it ran with.
    pub args: A,
}

/// Error produced by [`CallRecorder::failing_callback`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("callback rejected arguments: {0}")]
pub struct RecordedFailure(pub String);

/// Shared log of callback executions.
#[derive(Debug)]
pub struct CallRecorder<A> {
    calls: Arc<Mutex<Vec<RecordedCall<A>>>>,
}

impl<A> Clone for CallRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<A> Default for CallRecorder<A> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A: Clone + Send + 'static> CallRecorder<A> {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records and always succeeds.
    pub fn callback(&self) -> impl Fn(A) -> Result<(), Infallible> + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |args| {
            calls.lock().push(RecordedCall {
                at: Instant::now(),
                args,
            });
            Ok(())
        }
    }

    /// A callback that records, then fails when `reject` matches the arguments.
    pub fn failing_callback<R>(
        &self,
        reject: R,
    ) -> impl Fn(A) -> Result<(), RecordedFailure> + Send + Sync + 'static
    where
        A: std::fmt::Debug,
        R: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        move |args| {
            let rejected = reject(&args);
            let description = format!("{args:?}");
            calls.lock().push(RecordedCall {
                at: Instant::now(),
                args,
            });
            if rejected {
                Err(RecordedFailure(description))
            } else {
                Ok(())
            }
        }
    }

    /// All recorded executions, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall<A>> {
        self.calls.lock().clone()
    }

    /// Arguments of all recorded executions, oldest first.
    #[must_use]
    pub fn args(&self) -> Vec<A> {
        self.calls.lock().iter().map(|call| call.args.clone()).collect()
    }

    /// Number of recorded executions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
