//! Single-shot deferred invocation timer.
//!
//! A timer is one tokio task sleeping until a deadline. The owner may push
//! the deadline later without respawning: on wake the task asks the owner
//! whether it is actually due and re-arms itself otherwise.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// What the timer task should do after waking.
pub(crate) enum Wake {
    /// Sleep again until the given deadline.
    Rearm(Instant),

    /// Exit the task.
    Done,
}

/// Handle to an armed timer, exclusively owned by a wrapper's state.
///
/// Dropping the handle detaches the task; `abort` stops it.
#[derive(Debug)]
pub(crate) struct Timer {
    /// Identifies the task that owns this handle; stale wakes are ignored.
    pub(crate) generation: u64,

    /// When the timer is due.
    pub(crate) deadline: Instant,

    task: JoinHandle<()>,
}

impl Timer {
    /// Spawn a timer task on `runtime`.
    ///
    /// `on_wake` runs each time the sleep completes.
    pub(crate) fn spawn<F>(runtime: &Handle, generation: u64, deadline: Instant, mut on_wake: F) -> Self
    where
        F: FnMut() -> Wake + Send + 'static,
    {
        let task = runtime.spawn(async move {
            let mut next = deadline;
            loop {
                sleep_until(next).await;
                match on_wake() {
                    Wake::Rearm(later) => next = later,
                    Wake::Done => return,
                }
            }
        });

        Self {
            generation,
            deadline,
            task,
        }
    }

    /// Stop the task before it fires.
    pub(crate) fn abort(self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn timer_rearms_until_done() {
        let wakes = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let counter = Arc::clone(&wakes);
        let _timer = Timer::spawn(&Handle::current(), 1, start + Duration::from_millis(10), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Wake::Rearm(start + Duration::from_millis(30))
            } else {
                Wake::Done
            }
        });

        sleep(Duration::from_millis(20)).await;
        assert_eq!(wakes.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(20)).await;
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_timer_never_wakes() {
        let wakes = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&wakes);
        let timer = Timer::spawn(
            &Handle::current(),
            1,
            Instant::now() + Duration::from_millis(10),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Wake::Done
            },
        );
        timer.abort();

        sleep(Duration::from_millis(50)).await;
        assert_eq!(wakes.load(Ordering::SeqCst), 0);
    }
}
