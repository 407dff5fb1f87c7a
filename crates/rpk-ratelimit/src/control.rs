//! Shared state machine behind both wrappers.
//!
//! `Core` owns the pending arguments, the single armed [`Timer`] and the
//! execution counters. The debounce/throttle specifics live in a [`Policy`]
//! that decides, under the state lock, what each call and each timer wake
//! does. The callback itself always runs after the state lock is released.

use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::timer::{Timer, Wake};
use crate::{Invocation, Phase, RateLimitError, RateLimitState};

/// Boxed wrapped callback.
pub(crate) type Callback<A, E> = Box<dyn Fn(A) -> Result<(), E> + Send + Sync>;

/// Receives errors from timer-driven executions.
///
/// Those executions have no caller to return the error to.
pub type ErrorHook<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Default hook: log the failure.
pub(crate) fn log_deferred_error<E: Display + 'static>(kind: &'static str) -> ErrorHook<E> {
    Arc::new(move |err: &E| {
        tracing::error!(limiter = kind, error = %err, "Deferred invocation failed");
    })
}

/// Mutable wrapper state, guarded by `Core::slot`.
pub(crate) struct Slot<A> {
    /// Arguments waiting for the trailing edge.
    pub(crate) pending: Option<A>,

    /// The one armed timer, if any.
    pub(crate) timer: Option<Timer>,

    /// When the callback last executed.
    pub(crate) last_executed: Option<Instant>,

    /// When the current debounce burst began.
    pub(crate) burst_started: Option<Instant>,

    next_generation: u64,
}

/// What a call should do, decided under the state lock.
pub(crate) struct Decision<A> {
    pub(crate) outcome: Invocation,

    /// Run the callback synchronously with these arguments.
    pub(crate) run: Option<A>,

    /// Make sure a timer fires no earlier than this.
    pub(crate) arm: Option<Instant>,
}

impl<A> Decision<A> {
    pub(crate) fn execute(args: A, arm: Option<Instant>) -> Self {
        Self {
            outcome: Invocation::Executed,
            run: Some(args),
            arm,
        }
    }

    pub(crate) const fn schedule(arm: Option<Instant>) -> Self {
        Self {
            outcome: Invocation::Scheduled,
            run: None,
            arm,
        }
    }

    pub(crate) const fn suppress(arm: Option<Instant>) -> Self {
        Self {
            outcome: Invocation::Suppressed,
            run: None,
            arm,
        }
    }
}

/// Edge rules of a wrapper.
pub(crate) trait Policy<A>: Send + Sync + 'static {
    /// Name used in log fields.
    const KIND: &'static str;

    /// Handle a call.
    fn on_call(&self, slot: &mut Slot<A>, args: A, now: Instant) -> Decision<A>;

    /// The timer is due (or the wrapper is being flushed); the timer has
    /// already been removed from `slot`. Returns the arguments to run with.
    fn on_due(&self, slot: &mut Slot<A>, now: Instant) -> Option<A>;

    /// Reset policy bookkeeping after a cancel.
    fn on_cancel(&self, slot: &mut Slot<A>);
}

pub(crate) struct Core<A, E, P> {
    policy: P,
    callback: Callback<A, E>,
    on_error: ErrorHook<E>,
    runtime: Handle,
    slot: Mutex<Slot<A>>,

    /// Serializes executions; re-entrant so a callback may flush its own wrapper.
    exec: ReentrantMutex<()>,

    calls: AtomicU64,
    executions: AtomicU64,
    suppressed: AtomicU64,
}

impl<A, E, P> Core<A, E, P>
where
    A: Send + 'static,
    E: 'static,
    P: Policy<A>,
{
    /// Build a core bound to the current tokio runtime.
    pub(crate) fn new(
        policy: P,
        callback: Callback<A, E>,
        on_error: ErrorHook<E>,
    ) -> Result<Arc<Self>, RateLimitError> {
        let runtime = Handle::try_current().map_err(|_| RateLimitError::NoRuntime)?;

        Ok(Arc::new(Self {
            policy,
            callback,
            on_error,
            runtime,
            slot: Mutex::new(Slot {
                pending: None,
                timer: None,
                last_executed: None,
                burst_started: None,
                next_generation: 0,
            }),
            exec: ReentrantMutex::new(()),
            calls: AtomicU64::new(0),
            executions: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }))
    }

    pub(crate) const fn policy(&self) -> &P {
        &self.policy
    }

    pub(crate) fn invoke(self: &Arc<Self>, args: A) -> Result<Invocation, E> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();

        let (outcome, run) = {
            let mut slot = self.slot.lock();
            let Decision { outcome, run, arm } = self.policy.on_call(&mut slot, args, now);
            if let Some(deadline) = arm {
                self.arm(&mut slot, deadline);
            }
            (outcome, run)
        };

        tracing::trace!(limiter = P::KIND, ?outcome, "Call received");
        if outcome == Invocation::Suppressed {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(args) = run {
            self.execute(args)?;
        }
        Ok(outcome)
    }

    pub(crate) fn cancel(&self) {
        let mut slot = self.slot.lock();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
            tracing::debug!(limiter = P::KIND, "Pending invocation cancelled");
        }
        slot.pending = None;
        self.policy.on_cancel(&mut slot);
    }

    pub(crate) fn flush(&self) -> Result<bool, E> {
        let run = {
            let mut slot = self.slot.lock();
            let Some(timer) = slot.timer.take() else {
                return Ok(false);
            };
            timer.abort();
            self.policy.on_due(&mut slot, Instant::now())
        };

        match run {
            Some(args) => {
                tracing::debug!(limiter = P::KIND, "Pending invocation flushed");
                self.execute(args)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.slot.lock().timer.is_some()
    }

    pub(crate) fn state(&self) -> RateLimitState {
        let now = Instant::now();
        let slot = self.slot.lock();

        RateLimitState {
            phase: if slot.timer.is_some() {
                Phase::Pending
            } else {
                Phase::Idle
            },
            has_pending_args: slot.pending.is_some(),
            fires_in: slot
                .timer
                .as_ref()
                .map(|timer| timer.deadline.saturating_duration_since(now)),
            calls: self.calls.load(Ordering::Relaxed),
            executions: self.executions.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
        }
    }

    /// Arm the timer for `deadline`, reusing the running task when the
    /// deadline only moves later.
    fn arm(self: &Arc<Self>, slot: &mut Slot<A>, deadline: Instant) {
        if let Some(timer) = slot.timer.as_mut() {
            if deadline >= timer.deadline {
                timer.deadline = deadline;
                return;
            }
        }
        if let Some(stale) = slot.timer.take() {
            stale.abort();
        }

        slot.next_generation = slot.next_generation.wrapping_add(1);
        let generation = slot.next_generation;
        let weak = Arc::downgrade(self);
        slot.timer = Some(Timer::spawn(&self.runtime, generation, deadline, move || {
            weak.upgrade()
                .map_or(Wake::Done, |core| core.on_wake(generation))
        }));
        tracing::debug!(limiter = P::KIND, generation, "Timer armed");
    }

    fn on_wake(&self, generation: u64) -> Wake {
        let now = Instant::now();

        let run = {
            let mut slot = self.slot.lock();
            match slot.timer.as_ref() {
                Some(timer) if timer.generation == generation => {
                    if now < timer.deadline {
                        return Wake::Rearm(timer.deadline);
                    }
                }
                _ => return Wake::Done,
            }
            // This task is the timer; dropping the handle detaches it.
            slot.timer = None;
            self.policy.on_due(&mut slot, now)
        };

        if let Some(args) = run {
            tracing::debug!(limiter = P::KIND, "Trailing invocation");
            if let Err(err) = self.execute(args) {
                (self.on_error)(&err);
            }
        }
        Wake::Done
    }

    fn execute(&self, args: A) -> Result<(), E> {
        let _serial = self.exec.lock();
        self.executions.fetch_add(1, Ordering::Relaxed);
        (self.callback)(args)
    }
}

impl<A, E, P> Drop for Core<A, E, P> {
    fn drop(&mut self) {
        if let Some(timer) = self.slot.get_mut().timer.take() {
            timer.abort();
        }
    }
}
