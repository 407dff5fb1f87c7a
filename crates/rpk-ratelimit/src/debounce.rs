//! Debounce wrapper.
//!
//! Defers the callback until `wait` has elapsed since the last call. Each call
//! inside the window pushes the trailing execution back; `max_wait` bounds how
//! long a continuous burst can keep doing that.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::control::{Core, Decision, ErrorHook, Policy, Slot, log_deferred_error};
use crate::{DebounceOptions, Invocation, RateLimitError, RateLimitState, RateLimitedFunction};

/// Debounced callback.
///
/// Clones share state. The wrapper is disposed when the last clone is dropped;
/// a disposed wrapper never runs its callback again.
pub struct Debounced<A, E> {
    core: Arc<Core<A, E, DebouncePolicy>>,
}

impl<A, E> Clone for Debounced<A, E> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<A, E> Debounced<A, E>
where
    A: Send + 'static,
    E: Display + 'static,
{
    /// Wrap `callback` with the given options.
    ///
    /// Errors from timer-driven executions are logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or no tokio runtime is
    /// running.
    pub fn new<F>(callback: F, options: DebounceOptions) -> Result<Self, RateLimitError>
    where
        F: Fn(A) -> Result<(), E> + Send + Sync + 'static,
    {
        Self::with_error_hook(callback, options, log_deferred_error(DebouncePolicy::NAME))
    }

    /// Wrap `callback`, routing timer-driven execution errors to `on_error`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid or no tokio runtime is
    /// running.
    pub fn with_error_hook<F>(
        callback: F,
        options: DebounceOptions,
        on_error: ErrorHook<E>,
    ) -> Result<Self, RateLimitError>
    where
        F: Fn(A) -> Result<(), E> + Send + Sync + 'static,
    {
        options.validate()?;
        let core = Core::new(DebouncePolicy { options }, Box::new(callback), on_error)?;
        Ok(Self { core })
    }

    /// Options this wrapper was built with.
    #[must_use]
    pub fn options(&self) -> DebounceOptions {
        self.core.policy().options
    }
}

/// Debounce `callback` by `wait` with trailing-only defaults.
///
/// # Errors
///
/// Returns an error if no tokio runtime is running.
pub fn debounce<A, E, F>(callback: F, wait: Duration) -> Result<Debounced<A, E>, RateLimitError>
where
    A: Send + 'static,
    E: Display + 'static,
    F: Fn(A) -> Result<(), E> + Send + Sync + 'static,
{
    Debounced::new(callback, DebounceOptions::new(wait))
}

impl<A, E> RateLimitedFunction<A> for Debounced<A, E>
where
    A: Send + 'static,
    E: Display + 'static,
{
    type Error = E;

    fn invoke(&self, args: A) -> Result<Invocation, E> {
        self.core.invoke(args)
    }

    fn cancel(&self) {
        self.core.cancel();
    }

    fn flush(&self) -> Result<bool, E> {
        self.core.flush()
    }

    fn is_pending(&self) -> bool {
        self.core.is_pending()
    }

    fn state(&self) -> RateLimitState {
        self.core.state()
    }
}

struct DebouncePolicy {
    options: DebounceOptions,
}

impl DebouncePolicy {
    const NAME: &'static str = "debounce";

    /// Trailing fire time: quiet period after the latest call, capped by the
    /// burst's `max_wait`.
    fn deadline(&self, now: Instant, burst_started: Instant) -> Instant {
        let quiet = now + self.options.wait;
        self.options
            .max_wait
            .map_or(quiet, |max_wait| quiet.min(burst_started + max_wait))
    }

    fn stash<A>(&self, slot: &mut Slot<A>, args: A, arm: Instant) -> Decision<A> {
        if self.options.trailing {
            slot.pending = Some(args);
            Decision::schedule(Some(arm))
        } else {
            Decision::suppress(Some(arm))
        }
    }
}

impl<A> Policy<A> for DebouncePolicy {
    const KIND: &'static str = Self::NAME;

    fn on_call(&self, slot: &mut Slot<A>, args: A, now: Instant) -> Decision<A> {
        let Some(started) = slot.burst_started.filter(|_| slot.timer.is_some()) else {
            // Fresh burst.
            slot.burst_started = Some(now);
            let arm = self.deadline(now, now);
            if self.options.leading {
                slot.pending = None;
                return Decision::execute(args, Some(arm));
            }
            return self.stash(slot, args, arm);
        };

        if let Some(max_wait) = self.options.max_wait {
            if now.saturating_duration_since(started) >= max_wait {
                // Burst outlived max_wait: run now, start a new burst.
                slot.pending = None;
                slot.burst_started = Some(now);
                return Decision::execute(args, Some(self.deadline(now, now)));
            }
        }

        self.stash(slot, args, self.deadline(now, started))
    }

    fn on_due(&self, slot: &mut Slot<A>, _now: Instant) -> Option<A> {
        slot.burst_started = None;
        slot.pending.take()
    }

    fn on_cancel(&self, slot: &mut Slot<A>) {
        slot.burst_started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::convert::Infallible;
    use tokio::time::sleep;

    fn recording() -> (
        Arc<Mutex<Vec<u32>>>,
        impl Fn(u32) -> Result<(), Infallible> + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |n| {
            sink.lock().push(n);
            Ok(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_basic() {
        let (seen, callback) = recording();
        let debounced = debounce(callback, Duration::from_millis(100)).unwrap();

        assert_eq!(debounced.invoke(1).unwrap(), Invocation::Scheduled);
        assert_eq!(debounced.invoke(2).unwrap(), Invocation::Scheduled);
        assert!(debounced.is_pending());
        assert!(seen.lock().is_empty());

        sleep(Duration::from_millis(150)).await;
        assert_eq!(*seen.lock(), vec![2]);
        assert!(!debounced.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_leading_single_call_runs_once() {
        let (seen, callback) = recording();
        let options = DebounceOptions::new(Duration::from_millis(50)).with_leading(true);
        let debounced = Debounced::new(callback, options).unwrap();

        assert_eq!(debounced.invoke(7).unwrap(), Invocation::Executed);
        assert_eq!(*seen.lock(), vec![7]);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(*seen.lock(), vec![7]);
        assert_eq!(debounced.state().executions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_zero_wait_defers_to_next_tick() {
        let (seen, callback) = recording();
        let debounced = debounce(callback, Duration::ZERO).unwrap();

        debounced.invoke(1).unwrap();
        assert!(seen.lock().is_empty());

        sleep(Duration::from_millis(1)).await;
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_state_snapshot() {
        let (_seen, callback) = recording();
        let debounced = debounce(callback, Duration::from_millis(100)).unwrap();

        debounced.invoke(1).unwrap();
        let state = debounced.state();
        assert_eq!(state.phase, crate::Phase::Pending);
        assert!(state.has_pending_args);
        assert_eq!(state.fires_in, Some(Duration::from_millis(100)));
        assert_eq!(state.calls, 1);
        assert_eq!(state.executions, 0);
    }

    #[test]
    fn test_debounce_requires_runtime() {
        let (_seen, callback) = recording();
        let err = debounce(callback, Duration::from_millis(10)).err().unwrap();
        assert!(matches!(err, RateLimitError::NoRuntime));
    }
}
