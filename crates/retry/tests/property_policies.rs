// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Property-based tests for the stateless retry policies.
//!
//! These tests verify invariants that should hold for any valid parameters:
//! - Attempt limits stop exactly at the configured count
//! - Computed delays never exceed their caps and never shrink between retries
//! - Random and jittered delays stay within their bounds
//! - The executor invokes an always-failing operation exactly `max_attempts` times

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use proptest::prelude::*;
use rstest::rstest;
use steadfast_retry::{
    AttemptHistory, AttemptOutcome, ExponentialWait, FixedWait, IncrementingWait, Jittered,
    RandomWait, RetryExecutor, RetryOptions, RetryPredicate, StopAfterAttempt, StopStrategy,
    WaitStrategy,
};
use tokio::time::Instant;

fn failed_history(len: u32) -> AttemptHistory<u32, String> {
    let mut history = AttemptHistory::new();
    for _ in 0..len {
        history.record(AttemptOutcome::Failure("failed".to_string()), Instant::now());
    }
    history
}

/// Generate valid exponential wait parameters.
fn exponential_params_strategy() -> impl Strategy<Value = (Duration, f64, Duration)> {
    (
        1u64..=5000u64,   // initial_ms: 1ms to 5s
        1.0f64..=10.0f64, // factor
        10u64..=60000u64, // max_ms: 10ms to 60s
    )
        .prop_filter("max >= initial", |(initial_ms, _, max_ms)| {
            max_ms >= initial_ms
        })
        .prop_map(|(initial_ms, factor, max_ms)| {
            (
                Duration::from_millis(initial_ms),
                factor,
                Duration::from_millis(max_ms),
            )
        })
}

proptest! {
    /// Property: A stop-after-attempt strategy stops exactly once the limit is reached.
    #[rstest]
    fn stop_after_attempt_stops_at_limit(max_attempts in 1u32..=50, recorded in 1u32..=100) {
        let stop = StopAfterAttempt::new(max_attempts).unwrap();
        let history = failed_history(recorded);

        prop_assert_eq!(stop.should_stop(&history), recorded >= max_attempts);
    }

    /// Property: Exponential delays start at `initial`, never shrink and never exceed `max`.
    #[rstest]
    fn exponential_wait_grows_to_max(
        (initial, factor, max) in exponential_params_strategy(),
        retries in 1u32..=30
    ) {
        let wait = ExponentialWait::new(initial, factor, max).unwrap();
        let mut history = failed_history(1);
        let mut last = Duration::ZERO;

        for i in 0..retries {
            let delay = wait.next_delay(&history);
            if i == 0 {
                prop_assert_eq!(delay, initial);
            }
            prop_assert!(delay <= max, "Delay {delay:?} exceeded max {max:?}");
            prop_assert!(delay >= last, "Delay shrank from {last:?} to {delay:?}");
            last = delay;
            history.record(AttemptOutcome::Failure("failed".to_string()), Instant::now());
        }
    }

    /// Property: Incrementing delays follow `initial + increment * retries`, capped at `max`.
    #[rstest]
    fn incrementing_wait_is_linear_until_capped(
        initial_ms in 0u64..=1000,
        increment_ms in 0u64..=1000,
        extra_ms in 0u64..=10_000,
        recorded in 1u32..=40
    ) {
        let initial = Duration::from_millis(initial_ms);
        let increment = Duration::from_millis(increment_ms);
        let max = Duration::from_millis(initial_ms + extra_ms);
        let wait = IncrementingWait::new(initial, increment, max).unwrap();
        let history = failed_history(recorded);

        let expected = (initial + increment * (recorded - 1)).min(max);
        prop_assert_eq!(wait.next_delay(&history), expected);
    }

    /// Property: Random delays always fall within `[min, max]`.
    #[rstest]
    fn random_wait_within_bounds(min_ms in 0u64..=1000, spread_ms in 0u64..=1000) {
        let min = Duration::from_millis(min_ms);
        let max = Duration::from_millis(min_ms + spread_ms);
        let wait = RandomWait::new(min, max).unwrap();
        let history = failed_history(1);

        for _ in 0..20 {
            let delay = wait.next_delay(&history);
            prop_assert!(delay >= min && delay <= max, "Delay {delay:?} outside [{min:?}, {max:?}]");
        }
    }

    /// Property: Jitter adds at most the configured amount to the inner delay.
    #[rstest]
    fn jitter_within_bounds(base_ms in 0u64..=5000, jitter_ms in 0u64..=1000) {
        let base = Duration::from_millis(base_ms);
        let jitter = Duration::from_millis(jitter_ms);
        let wait = Jittered::new(FixedWait::new(base), jitter);
        let history = failed_history(1);

        for _ in 0..20 {
            let delay = wait.next_delay(&history);
            prop_assert!(delay >= base, "Delay {delay:?} below base {base:?}");
            prop_assert!(delay <= base + jitter, "Delay {delay:?} above base {base:?} plus jitter {jitter:?}");
        }
    }

    /// Property: An always-failing operation is invoked exactly `max_attempts` times.
    #[rstest]
    fn executor_invokes_operation_max_attempts_times(max_attempts in 1u32..=20) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let executor: RetryExecutor<u32, String> = RetryExecutor::new(
            RetryOptions::new()
                .with_retry_predicate(RetryPredicate::on_failure())
                .with_stop_strategy(StopAfterAttempt::new(max_attempts).unwrap()),
        );
        let calls = AtomicU32::new(0);

        let err = runtime
            .block_on(executor.run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("failed".to_string()) }
            }))
            .unwrap_err();

        prop_assert_eq!(calls.load(Ordering::SeqCst), max_attempts);
        let numbers: Vec<u32> = err.history().unwrap().iter().map(|a| a.number()).collect();
        prop_assert_eq!(numbers, (1..=max_attempts).collect::<Vec<_>>());
    }

    /// Property: Success on the first attempt is accepted under any stop limit.
    #[rstest]
    fn first_success_is_final(max_attempts in 1u32..=20, value in any::<u32>()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let executor: RetryExecutor<u32, String> = RetryExecutor::new(
            RetryOptions::new()
                .with_retry_predicate(RetryPredicate::on_failure())
                .with_stop_strategy(StopAfterAttempt::new(max_attempts).unwrap()),
        );

        let result = runtime.block_on(executor.run(|| async move { Ok(value) }));

        prop_assert_eq!(result.unwrap(), value);
    }
}
