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

//! Observation hooks invoked after every attempt.
//!
//! Listeners see each attempt strictly after it is recorded and before the executor acts
//! on its stop and retry decisions. They have no influence over control flow: a listener
//! that returns an error or panics is reported through `tracing` and otherwise ignored.

use std::{
    fmt::{Debug, Display},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use crate::attempt::{Attempt, AttemptHistory, AttemptOutcome};

/// Observes every attempt of a run.
pub trait RetryListener<T, E>: Send + Sync {
    /// Called once per attempt, after it has been appended to `history`.
    ///
    /// # Errors
    ///
    /// Errors are reported out-of-band and never alter the run's outcome.
    fn on_attempt(
        &self,
        attempt: &Attempt<T, E>,
        history: &AttemptHistory<T, E>,
    ) -> anyhow::Result<()>;
}

/// Adapts a closure into an infallible [`RetryListener`].
#[derive(Clone, Copy, Debug)]
pub struct ListenerFn<F>(pub F);

impl<T, E, F> RetryListener<T, E> for ListenerFn<F>
where
    F: Fn(&Attempt<T, E>, &AttemptHistory<T, E>) + Send + Sync,
{
    fn on_attempt(
        &self,
        attempt: &Attempt<T, E>,
        history: &AttemptHistory<T, E>,
    ) -> anyhow::Result<()> {
        (self.0)(attempt, history);
        Ok(())
    }
}

/// Logs every attempt at debug level through `tracing`.
#[derive(Clone, Debug)]
pub struct LoggingListener {
    operation: String,
}

impl LoggingListener {
    /// Creates a new [`LoggingListener`] for the named operation.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Returns the operation name used in log lines.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl<T, E> RetryListener<T, E> for LoggingListener
where
    T: Debug,
    E: Display,
{
    fn on_attempt(
        &self,
        attempt: &Attempt<T, E>,
        _history: &AttemptHistory<T, E>,
    ) -> anyhow::Result<()> {
        match attempt.outcome() {
            AttemptOutcome::Success(value) => tracing::debug!(
                "Operation '{}' attempt {} returned {value:?} ({:?} since first attempt)",
                self.operation,
                attempt.number(),
                attempt.delay_since_first_attempt(),
            ),
            AttemptOutcome::Failure(cause) => tracing::debug!(
                "Operation '{}' attempt {} failed: {cause} ({:?} since first attempt)",
                self.operation,
                attempt.number(),
                attempt.delay_since_first_attempt(),
            ),
        }
        Ok(())
    }
}

/// Notifies `listeners` in registration order, containing any listener failure.
pub(crate) fn notify_listeners<T, E>(
    listeners: &[Arc<dyn RetryListener<T, E>>],
    attempt: &Attempt<T, E>,
    history: &AttemptHistory<T, E>,
) {
    for (index, listener) in listeners.iter().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| listener.on_attempt(attempt, history))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(
                "Retry listener {index} failed on attempt {}: {e}",
                attempt.number()
            ),
            Err(_) => tracing::warn!(
                "Retry listener {index} panicked on attempt {}",
                attempt.number()
            ),
        }
    }
}
