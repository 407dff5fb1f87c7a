//! Throttle wrapper.
//!
//! Runs the callback at most once per `wait` window. The first call of an open
//! window runs immediately (leading edge); later calls in the window collapse
//! into one execution with the latest arguments when the window closes
//! (trailing edge).

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::control::{Core, Decision, ErrorHook, Policy, Slot, log_deferred_error};
use crate::{Invocation, RateLimitError, RateLimitState, RateLimitedFunction, ThrottleOptions};

/// Throttled callback.
///
/// Clones share state. The wrapper is disposed when the last clone is dropped.
pub struct Throttled<A, E> {
    core: Arc<Core<A, E, ThrottlePolicy>>,
}

impl<A, E> Clone for Throttled<A, E> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<A, E> Throttled<A, E>
where
    A: Send + 'static,
    E: Display + 'static,
{
    /// Wrap `callback` with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if both edges are disabled or no tokio runtime is
    /// running.
    pub fn new<F>(callback: F, options: ThrottleOptions) -> Result<Self, RateLimitError>
    where
        F: Fn(A) -> Result<(), E> + Send + Sync + 'static,
    {
        Self::with_error_hook(callback, options, log_deferred_error(ThrottlePolicy::NAME))
    }

    /// Wrap `callback`, routing trailing execution errors to `on_error`.
    ///
    /// # Errors
    ///
    /// Returns an error if both edges are disabled or no tokio runtime is
    /// running.
    pub fn with_error_hook<F>(
        callback: F,
        options: ThrottleOptions,
        on_error: ErrorHook<E>,
    ) -> Result<Self, RateLimitError>
    where
        F: Fn(A) -> Result<(), E> + Send + Sync + 'static,
    {
        options.validate()?;
        let core = Core::new(ThrottlePolicy { options }, Box::new(callback), on_error)?;
        Ok(Self { core })
    }

    /// Options this wrapper was built with.
    #[must_use]
    pub fn options(&self) -> ThrottleOptions {
        self.core.policy().options
    }
}

/// Throttle `callback` to one execution per `wait`, leading and trailing.
///
/// # Errors
///
/// Returns an error if no tokio runtime is running.
pub fn throttle<A, E, F>(callback: F, wait: Duration) -> Result<Throttled<A, E>, RateLimitError>
where
    A: Send + 'static,
    E: Display + 'static,
    F: Fn(A) -> Result<(), E> + Send + Sync + 'static,
{
    Throttled::new(callback, ThrottleOptions::new(wait))
}

impl<A, E> RateLimitedFunction<A> for Throttled<A, E>
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

struct ThrottlePolicy {
    options: ThrottleOptions,
}

impl ThrottlePolicy {
    const NAME: &'static str = "throttle";
}

impl<A> Policy<A> for ThrottlePolicy {
    const KIND: &'static str = Self::NAME;

    fn on_call(&self, slot: &mut Slot<A>, args: A, now: Instant) -> Decision<A> {
        let wait = self.options.wait;
        let window_end = slot
            .last_executed
            .map(|last| last + wait)
            .filter(|end| now < *end);

        // An armed timer means the window is still closing, even if its
        // deadline has just passed.
        if slot.timer.is_none() && window_end.is_none() && self.options.leading {
            slot.pending = None;
            slot.last_executed = Some(now);
            return Decision::execute(args, None);
        }

        if !self.options.trailing {
            return Decision::suppress(None);
        }

        slot.pending = Some(args);
        if slot.timer.is_some() {
            Decision::schedule(None)
        } else {
            Decision::schedule(Some(window_end.unwrap_or(now + wait)))
        }
    }

    fn on_due(&self, slot: &mut Slot<A>, now: Instant) -> Option<A> {
        let args = slot.pending.take();
        if args.is_some() {
            slot.last_executed = Some(now);
        }
        args
    }

    fn on_cancel(&self, slot: &mut Slot<A>) {
        slot.last_executed = None;
    }
}
