//! Integration tests for debounced callbacks.

use std::time::Duration;

use rpk_ratelimit::{
    DebounceOptions, Debounced, Invocation, Phase, RateLimitError, RateLimitedFunction, debounce,
};
use rpk_testkit::{
    CallRecorder, Timeline, assert_fired_at_offsets, assert_invoked_with, assert_never_invoked,
    init_test_tracing, replay,
};
use tokio::time::{Instant, sleep, sleep_until};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

mod trailing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_runs_once_with_last_args_after_quiet_period() {
        init_test_tracing();
        let recorder = CallRecorder::new();
        let debounced = debounce(recorder.callback(), ms(100)).unwrap();

        let start = Instant::now();
        let outcomes = replay(&Timeline::burst(0, 5, 10), |i| debounced.invoke(i).unwrap()).await;
        assert!(outcomes.iter().all(|o| *o == Invocation::Scheduled));
        assert_never_invoked(&recorder);

        sleep_until(start + ms(300)).await;
        assert_invoked_with(&recorder, &[4]);
        assert_fired_at_offsets(&recorder, start, &[140]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_run_separately() {
        let recorder = CallRecorder::new();
        let debounced = debounce(recorder.callback(), ms(50)).unwrap();

        let start = Instant::now();
        let timeline = Timeline::burst(0, 3, 10).then_burst(200, 2, 20);
        replay(&timeline, |i| debounced.invoke(i).unwrap()).await;
        sleep_until(start + ms(400)).await;

        assert_invoked_with(&recorder, &[2, 4]);
        assert_fired_at_offsets(&recorder, start, &[70, 270]);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_runs_before_wait_elapses() {
        let recorder = CallRecorder::new();
        let debounced = debounce(recorder.callback(), ms(100)).unwrap();

        debounced.invoke("only").unwrap();
        sleep(ms(99)).await;
        assert_never_invoked(&recorder);
        assert!(debounced.is_pending());

        sleep(ms(2)).await;
        assert_invoked_with(&recorder, &["only"]);
        assert!(!debounced.is_pending());
    }
}

mod leading {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn leading_and_trailing_run_at_both_edges() {
        let recorder = CallRecorder::new();
        let options = DebounceOptions::new(ms(100)).with_leading(true);
        let debounced = Debounced::new(recorder.callback(), options).unwrap();

        let start = Instant::now();
        let outcomes = replay(&Timeline::burst(0, 5, 10), |i| debounced.invoke(i).unwrap()).await;
        assert_eq!(outcomes[0], Invocation::Executed);
        assert!(outcomes[1..].iter().all(|o| *o == Invocation::Scheduled));

        sleep_until(start + ms(300)).await;
        assert_invoked_with(&recorder, &[0, 4]);
        assert_fired_at_offsets(&recorder, start, &[0, 140]);
    }

    #[tokio::test(start_paused = true)]
    async fn leading_only_suppresses_rest_of_burst() {
        let recorder = CallRecorder::new();
        let options = DebounceOptions::new(ms(100))
            .with_leading(true)
            .with_trailing(false);
        let debounced = Debounced::new(recorder.callback(), options).unwrap();

        let outcomes = replay(&Timeline::burst(0, 3, 10), |i| debounced.invoke(i).unwrap()).await;
        assert_eq!(
            outcomes,
            vec![
                Invocation::Executed,
                Invocation::Suppressed,
                Invocation::Suppressed
            ]
        );

        sleep(ms(200)).await;
        assert_invoked_with(&recorder, &[0]);

        // Quiet period elapsed, so the next call opens a new burst.
        assert_eq!(debounced.invoke(9).unwrap(), Invocation::Executed);
        assert_invoked_with(&recorder, &[0, 9]);
    }
}

mod max_wait {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn continuous_burst_runs_at_least_every_max_wait() {
        let recorder = CallRecorder::new();
        let options = DebounceOptions::new(ms(100)).with_max_wait(ms(250));
        let debounced = Debounced::new(recorder.callback(), options).unwrap();

        let start = Instant::now();
        replay(&Timeline::burst(0, 13, 40), |i| debounced.invoke(i).unwrap()).await;
        sleep_until(start + ms(800)).await;

        // Calls every 40ms never leave a 100ms gap; max_wait forces the runs.
        assert_invoked_with(&recorder, &[6, 12]);
        assert_fired_at_offsets(&recorder, start, &[250, 530]);
    }

    #[tokio::test(start_paused = true)]
    async fn max_wait_does_not_fire_early_for_short_bursts() {
        let recorder = CallRecorder::new();
        let options = DebounceOptions::new(ms(100)).with_max_wait(ms(1_000));
        let debounced = Debounced::new(recorder.callback(), options).unwrap();

        let start = Instant::now();
        replay(&Timeline::burst(0, 3, 20), |i| debounced.invoke(i).unwrap()).await;
        sleep_until(start + ms(500)).await;

        assert_fired_at_offsets(&recorder, start, &[140]);
    }
}

mod options {
    use super::*;

    #[tokio::test]
    async fn rejects_max_wait_below_wait() {
        let recorder = CallRecorder::<u32>::new();
        let options = DebounceOptions::new(ms(100)).with_max_wait(ms(10));
        let err = Debounced::new(recorder.callback(), options).err().unwrap();
        assert!(matches!(err, RateLimitError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn rejects_no_edges() {
        let recorder = CallRecorder::<u32>::new();
        let options = DebounceOptions::new(ms(100)).with_trailing(false);
        let err = Debounced::new(recorder.callback(), options).err().unwrap();
        assert!(err.to_string().contains("leading or trailing"));
    }

    #[tokio::test(start_paused = true)]
    async fn state_tracks_calls_and_executions() {
        let recorder = CallRecorder::new();
        let debounced = debounce(recorder.callback(), ms(100)).unwrap();

        replay(&Timeline::burst(0, 4, 10), |i| debounced.invoke(i).unwrap()).await;
        let state = debounced.state();
        assert_eq!(state.phase, Phase::Pending);
        assert_eq!(state.fires_in, Some(ms(100)));
        assert_eq!(state.calls, 4);
        assert_eq!(state.executions, 0);

        sleep(ms(150)).await;
        let state = debounced.state();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.has_pending_args);
        assert_eq!(state.fires_in, None);
        assert_eq!(state.executions, 1);
    }
}
