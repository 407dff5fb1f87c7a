//! Call timelines for driving wrappers in virtual time.
//!
//! Timelines are explicit values built by each test; there is no shared
//! mock data.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Ordered call offsets relative to the start of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    offsets: Vec<Duration>,
}

impl Timeline {
    /// Calls at the given millisecond offsets.
    #[must_use]
    pub fn at_millis(offsets: &[u64]) -> Self {
        let mut offsets: Vec<Duration> = offsets.iter().copied().map(Duration::from_millis).collect();
        offsets.sort_unstable();
        Self { offsets }
    }

    /// `count` calls starting at `start_ms`, `gap_ms` apart.
    #[must_use]
    pub fn burst(start_ms: u64, count: u64, gap_ms: u64) -> Self {
        Self::default().then_burst(start_ms, count, gap_ms)
    }

    /// Append another burst.
    #[must_use]
    pub fn then_burst(mut self, start_ms: u64, count: u64, gap_ms: u64) -> Self {
        self.offsets
            .extend((0..count).map(|i| Duration::from_millis(start_ms + i * gap_ms)));
        self.offsets.sort_unstable();
        self
    }

    /// Call offsets, ascending.
    #[must_use]
    pub fn offsets(&self) -> &[Duration] {
        &self.offsets
    }

    /// Offset of the final call.
    #[must_use]
    pub fn last(&self) -> Option<Duration> {
        self.offsets.last().copied()
    }

    /// Number of calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the timeline has no calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Sleep to each offset of `timeline` and run `call` with the call's index.
///
/// Offsets are measured from the moment `replay` starts. Use inside a paused
/// runtime for deterministic timing.
pub async fn replay<F, R>(timeline: &Timeline, mut call: F) -> Vec<R>
where
    F: FnMut(usize) -> R,
{
    let start = Instant::now();
    let mut results = Vec::with_capacity(timeline.len());
    for (index, offset) in timeline.offsets().iter().enumerate() {
        sleep_until(start + *offset).await;
        results.push(call(index));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_merge_in_order() {
        let timeline = Timeline::burst(100, 3, 10).then_burst(0, 2, 50);
        assert_eq!(
            timeline.offsets(),
            &[0, 50, 100, 110, 120].map(Duration::from_millis)
        );
        assert_eq!(timeline.last(), Some(Duration::from_millis(120)));
        assert!(!timeline.is_empty());
    }

    #[test]
    fn empty_timeline() {
        let timeline = Timeline::at_millis(&[]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.last(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn replay_hits_each_offset() {
        let start = Instant::now();
        let timeline = Timeline::at_millis(&[15, 0, 5]);
        let seen = replay(&timeline, |i| (i, Instant::now() - start)).await;

        assert_eq!(
            seen,
            vec![
                (0, Duration::ZERO),
                (1, Duration::from_millis(5)),
                (2, Duration::from_millis(15)),
            ]
        );
    }
}
