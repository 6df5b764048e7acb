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

//! The retry executor: runs an operation under a predicate, stop and wait policy.
//!
//! A run records every invocation in an [`AttemptHistory`], notifies listeners, then asks
//! the stop strategy and retry predicate whether to go again. Policies are shared and
//! stateless, so one executor may drive any number of concurrent runs.

use std::{fmt::Debug, future::Future, sync::Arc, time::Duration};

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use crate::{
    attempt::AttemptHistory,
    error::RetryError,
    listener::{RetryListener, notify_listeners},
    predicate::RetryPredicate,
    recovery::RecoveryCallback,
    state::{RunLifecycle, RunTrigger},
    stop::{NeverStop, StopStrategy},
    wait::{NoWait, WaitStrategy},
};

/// The policies governing a retry run.
///
/// The defaults never retry, never stop, never wait, and notify nobody.
pub struct RetryOptions<T, E> {
    /// Decides whether an attempt's outcome should be retried.
    pub retry_predicate: RetryPredicate<T, E>,
    /// Decides whether retrying must cease.
    pub stop_strategy: Arc<dyn StopStrategy<T, E>>,
    /// Computes the pause before the next attempt.
    pub wait_strategy: Arc<dyn WaitStrategy<T, E>>,
    /// Observers notified after every attempt, in order.
    pub listeners: Vec<Arc<dyn RetryListener<T, E>>>,
}

impl<T, E> Default for RetryOptions<T, E> {
    fn default() -> Self {
        Self {
            retry_predicate: RetryPredicate::never(),
            stop_strategy: Arc::new(NeverStop),
            wait_strategy: Arc::new(NoWait),
            listeners: Vec::new(),
        }
    }
}

impl<T, E> Clone for RetryOptions<T, E> {
    fn clone(&self) -> Self {
        Self {
            retry_predicate: self.retry_predicate.clone(),
            stop_strategy: Arc::clone(&self.stop_strategy),
            wait_strategy: Arc::clone(&self.wait_strategy),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T, E> Debug for RetryOptions<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RetryOptions))
            .field("retry_predicate", &self.retry_predicate)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<T, E> RetryOptions<T, E> {
    /// Creates a new [`RetryOptions`] instance with default policies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry predicate.
    #[must_use]
    pub fn with_retry_predicate(mut self, predicate: RetryPredicate<T, E>) -> Self {
        self.retry_predicate = predicate;
        self
    }

    /// Sets the stop strategy.
    #[must_use]
    pub fn with_stop_strategy<S>(mut self, strategy: S) -> Self
    where
        S: StopStrategy<T, E> + 'static,
    {
        self.stop_strategy = Arc::new(strategy);
        self
    }

    /// Sets the wait strategy.
    #[must_use]
    pub fn with_wait_strategy<W>(mut self, strategy: W) -> Self
    where
        W: WaitStrategy<T, E> + 'static,
    {
        self.wait_strategy = Arc::new(strategy);
        self
    }

    /// Appends a listener; listeners are notified in the order they were added.
    #[must_use]
    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: RetryListener<T, E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }
}

/// Runs operations under a fixed set of [`RetryOptions`].
pub struct RetryExecutor<T, E> {
    name: String,
    options: RetryOptions<T, E>,
}

impl<T, E> Clone for RetryExecutor<T, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T, E> Debug for RetryExecutor<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RetryExecutor))
            .field("name", &self.name)
            .field("options", &self.options)
            .finish()
    }
}

impl<T, E> Default for RetryExecutor<T, E> {
    fn default() -> Self {
        Self::new(RetryOptions::default())
    }
}

impl<T, E> RetryExecutor<T, E> {
    /// Creates a new [`RetryExecutor`] instance.
    #[must_use]
    pub fn new(options: RetryOptions<T, E>) -> Self {
        Self {
            name: "operation".to_string(),
            options,
        }
    }

    /// Sets the operation name used in log lines.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the operation name used in log lines.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the policies this executor runs under.
    #[must_use]
    pub const fn options(&self) -> &RetryOptions<T, E> {
        &self.options
    }

    /// Runs `operation` until an outcome is accepted or retrying stops.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`] with the full history when retrying stops on a
    /// failure or on a success the predicate wanted retried.
    pub async fn run<F, Fut>(&self, operation: F) -> Result<T, RetryError<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation, None, None).await
    }

    /// Runs `operation`, substituting `recovery`'s result when retrying stops unsuccessfully.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Recovery`] if the recovery callback fails.
    pub async fn run_with_recovery<F, Fut>(
        &self,
        operation: F,
        recovery: &dyn RecoveryCallback<T, E>,
    ) -> Result<T, RetryError<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation, Some(recovery), None).await
    }

    /// Runs `operation` until it completes or `cancel` is triggered.
    ///
    /// Cancellation drops any in-flight attempt and interrupts any pending wait.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Cancelled`] on cancellation, otherwise as [`Self::run`].
    pub async fn run_with_cancel<F, Fut>(
        &self,
        operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation, None, Some(cancel)).await
    }

    /// Runs `operation` with both a recovery callback and a cancellation token.
    ///
    /// Cancellation takes precedence: recovery is never invoked for a cancelled run.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Cancelled`] on cancellation, otherwise as
    /// [`Self::run_with_recovery`].
    pub async fn run_with_recovery_and_cancel<F, Fut>(
        &self,
        operation: F,
        recovery: &dyn RecoveryCallback<T, E>,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(operation, Some(recovery), Some(cancel)).await
    }

    async fn execute<F, Fut>(
        &self,
        mut operation: F,
        recovery: Option<&dyn RecoveryCallback<T, E>>,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, RetryError<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut lifecycle = RunLifecycle::new();
        let mut history = AttemptHistory::new();

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            lifecycle.trigger(RunTrigger::Cancel)?;
            tracing::debug!("Operation '{}' cancelled before first attempt", self.name);
            return Err(RetryError::Cancelled { attempts: 0 });
        }
        lifecycle.trigger(RunTrigger::Start)?;

        loop {
            let started_at = Instant::now();
            let result = match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => None,
                        result = operation() => Some(result),
                    }
                }
                None => Some(operation().await),
            };

            let Some(result) = result else {
                return self.cancelled(&mut lifecycle, &history);
            };

            history.record(result.into(), started_at);
            if let Some(attempt) = history.last() {
                notify_listeners(&self.options.listeners, attempt, &history);
            }

            let retry = history
                .last()
                .is_some_and(|attempt| self.options.retry_predicate.should_retry(attempt));

            if retry && !self.options.stop_strategy.should_stop(&history) {
                let delay = self.options.wait_strategy.next_delay(&history);
                lifecycle.trigger(RunTrigger::Retry)?;
                tracing::debug!(
                    "Operation '{}' attempt {} not accepted, retrying in {delay:?}",
                    self.name,
                    history.len(),
                );

                if !Self::pause(delay, cancel).await {
                    return self.cancelled(&mut lifecycle, &history);
                }

                lifecycle.trigger(RunTrigger::Resume)?;
                continue;
            }

            if !retry {
                let attempts = history.len();
                match history.into_success() {
                    Ok(value) => {
                        lifecycle.trigger(RunTrigger::Accept)?;
                        if attempts > 1 {
                            tracing::debug!(
                                "Operation '{}' succeeded after {attempts} attempts",
                                self.name
                            );
                        }
                        return Ok(value);
                    }
                    Err(returned) => history = returned,
                }
            }

            return self.finish_unsuccessful(&mut lifecycle, history, recovery);
        }
    }

    fn finish_unsuccessful(
        &self,
        lifecycle: &mut RunLifecycle,
        history: AttemptHistory<T, E>,
        recovery: Option<&dyn RecoveryCallback<T, E>>,
    ) -> Result<T, RetryError<T, E>> {
        let Some(recovery) = recovery else {
            lifecycle.trigger(RunTrigger::Exhaust)?;
            tracing::warn!(
                "Operation '{}' gave up after {} attempt(s)",
                self.name,
                history.len()
            );
            return Err(RetryError::Exhausted { history });
        };

        match recovery.recover(&history) {
            Ok(value) => {
                lifecycle.trigger(RunTrigger::Recover)?;
                tracing::debug!(
                    "Operation '{}' recovered after {} attempt(s)",
                    self.name,
                    history.len()
                );
                Ok(value)
            }
            Err(cause) => {
                lifecycle.trigger(RunTrigger::Abort)?;
                tracing::warn!(
                    "Operation '{}' recovery failed after {} attempt(s)",
                    self.name,
                    history.len()
                );
                Err(RetryError::Recovery(cause))
            }
        }
    }

    fn cancelled(
        &self,
        lifecycle: &mut RunLifecycle,
        history: &AttemptHistory<T, E>,
    ) -> Result<T, RetryError<T, E>> {
        let interrupted = lifecycle.state();
        lifecycle.trigger(RunTrigger::Cancel)?;
        let attempts = u32::try_from(history.len()).unwrap_or(u32::MAX);
        tracing::debug!(
            "Operation '{}' cancelled while {interrupted} after {attempts} attempt(s)",
            self.name
        );
        Err(RetryError::Cancelled { attempts })
    }

    /// Sleeps for `delay`, returning `false` if cancelled first.
    async fn pause(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
        match cancel {
            Some(token) if delay.is_zero() => !token.is_cancelled(),
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => false,
                    () = sleep(delay) => true,
                }
            }
            None => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                true
            }
        }
    }
}
