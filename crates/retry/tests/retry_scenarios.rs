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

//! End-to-end runs through the public API, mirroring the `flaky-demo` binary.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use steadfast_retry::{
    Attempt, AttemptHistory, FixedWait, ListenerFn, LoggingListener, RecoverWith, RetryConfig,
    RetryError, RetryExecutor, RetryOptions, RetryPredicate, StopAfterAttempt, StopAfterDelay,
    StopOr,
};
use tokio::time::Instant;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
enum CalcError {
    #[error("division by zero")]
    DivideByZero,
}

fn divide(numerator: u64, denominator: u64) -> Result<u64, CalcError> {
    numerator
        .checked_div(denominator)
        .ok_or(CalcError::DivideByZero)
}

fn demo_executor(seen: Arc<Mutex<Vec<(u32, Duration)>>>) -> RetryExecutor<u64, CalcError> {
    let config = RetryConfig::default();
    let mut options = RetryOptions::new()
        .with_retry_predicate(RetryPredicate::on_failure())
        .with_listener(LoggingListener::new("divide"))
        .with_listener(ListenerFn(
            move |attempt: &Attempt<u64, CalcError>, _: &AttemptHistory<u64, CalcError>| {
                seen.lock()
                    .unwrap()
                    .push((attempt.number(), attempt.delay_since_first_attempt()));
            },
        ));
    options.stop_strategy = config.stop_strategy().unwrap();
    options.wait_strategy = config.wait_strategy().unwrap();
    RetryExecutor::new(options).with_name("divide")
}

#[tokio::test(start_paused = true)]
async fn test_divide_by_zero_exhausts_with_history() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let executor = demo_executor(Arc::clone(&seen));

    let err = executor.run(|| async { divide(1, 0) }).await.unwrap_err();

    let history = match err {
        RetryError::Exhausted { history } => history,
        other => panic!("expected exhausted, was {other:?}"),
    };
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(Attempt::is_failure));
    assert_eq!(
        history.last().unwrap().failure_cause(),
        Ok(&CalcError::DivideByZero)
    );

    let seen = seen.lock().unwrap();
    let numbers: Vec<u32> = seen.iter().map(|(n, _)| *n).collect();
    let delays: Vec<u64> = seen.iter().map(|(_, d)| d.as_secs()).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(delays, vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_divide_by_zero_recovers_with_fallback() {
    let executor: RetryExecutor<String, CalcError> = RetryExecutor::new(
        RetryOptions::new()
            .with_retry_predicate(RetryPredicate::on_failure())
            .with_stop_strategy(StopAfterAttempt::new(3).unwrap()),
    );
    let calls = AtomicU32::new(0);

    let value = executor
        .run_with_recovery(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { divide(1, 0).map(|q| q.to_string()) }
            },
            &RecoverWith("fallback".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(value, "fallback");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_valid_division_succeeds_first_time() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let executor = demo_executor(Arc::clone(&seen));
    let start = Instant::now();

    let value = executor.run(|| async { divide(10, 2) }).await.unwrap();

    assert_eq!(value, 5);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_first_of_combined_stop_conditions_wins() {
    let executor: RetryExecutor<u64, CalcError> = RetryExecutor::new(
        RetryOptions::new()
            .with_retry_predicate(RetryPredicate::on_failure())
            .with_stop_strategy(StopOr::new(
                StopAfterAttempt::new(10).unwrap(),
                StopAfterDelay::new(Duration::from_millis(350)),
            ))
            .with_wait_strategy(FixedWait::new(Duration::from_millis(100))),
    );

    let err = executor.run(|| async { divide(1, 0) }).await.unwrap_err();

    assert_eq!(err.history().unwrap().len(), 5);
}
