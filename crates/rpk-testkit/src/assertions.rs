//! Assertion helpers for rate-limited callbacks.

use std::fmt::Debug;
use std::time::Duration;

use tokio::time::Instant;

use crate::{CallRecorder, RecordedCall};

/// Slack allowed when comparing virtual-time instants (timer wheel resolution).
pub const TIMING_TOLERANCE: Duration = Duration::from_millis(1);

// ─────────────────────────────────────────────────────────────────────────────
// Execution Assertions
// ─────────────────────────────────────────────────────────────────────────────

/// Assert the recorder saw exactly these arguments, in order.
///
/// # Panics
///
/// Panics if the recorded arguments differ.
pub fn assert_invoked_with<A>(recorder: &CallRecorder<A>, expected: &[A])
where
    A: Clone + Debug + PartialEq + Send + 'static,
{
    let actual = recorder.args();
    assert_eq!(
        actual, expected,
        "Expected executions {expected:?} but got {actual:?}"
    );
}

/// Assert the callback never ran.
///
/// # Panics
///
/// Panics if anything was recorded.
pub fn assert_never_invoked<A>(recorder: &CallRecorder<A>)
where
    A: Clone + Debug + Send + 'static,
{
    let calls = recorder.args();
    assert!(calls.is_empty(), "Expected no executions but got {calls:?}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Timing Assertions
// ─────────────────────────────────────────────────────────────────────────────

/// Assert a recorded execution happened `offset` after `start`.
///
/// # Panics
///
/// Panics if the execution is off by more than [`TIMING_TOLERANCE`].
pub fn assert_fired_at<A: Debug>(call: &RecordedCall<A>, start: Instant, offset: Duration) {
    let expected = start + offset;
    let drift = if call.at >= expected {
        call.at - expected
    } else {
        expected - call.at
    };
    assert!(
        drift <= TIMING_TOLERANCE,
        "Expected {:?} to fire at +{offset:?} but it fired at +{:?}",
        call.args,
        call.at.saturating_duration_since(start)
    );
}

/// Assert the recorder's executions happened at these offsets after `start`.
///
/// # Panics
///
/// Panics if the counts differ or any execution is off by more than
/// [`TIMING_TOLERANCE`].
pub fn assert_fired_at_offsets<A>(recorder: &CallRecorder<A>, start: Instant, offsets_ms: &[u64])
where
    A: Clone + Debug + Send + 'static,
{
    let calls = recorder.calls();
    assert_eq!(
        calls.len(),
        offsets_ms.len(),
        "Expected {} executions but got {calls:?}",
        offsets_ms.len()
    );
    for (call, offset) in calls.iter().zip(offsets_ms) {
        assert_fired_at(call, start, Duration::from_millis(*offset));
    }
}
