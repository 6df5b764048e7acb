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

//! Immutable records of individual invocations and the ordered history of a run.

use std::{fmt::Debug, slice::Iter, time::Duration};

use tokio::time::Instant;

use crate::error::AttemptAccessError;

/// The outcome of a single invocation: exactly one of a value or a failure cause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    /// The operation returned a value.
    Success(T),
    /// The operation failed with a cause.
    Failure(E),
}

impl<T, E> From<Result<T, E>> for AttemptOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(cause) => Self::Failure(cause),
        }
    }
}

/// An immutable record of one invocation of the operation under retry.
#[derive(Clone, Debug)]
pub struct Attempt<T, E> {
    number: u32,
    outcome: AttemptOutcome<T, E>,
    started_at: Instant,
    elapsed: Duration,
    delay_since_first_attempt: Duration,
}

impl<T, E> Attempt<T, E> {
    /// Returns the ordinal of this attempt; the first call is attempt 1.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Returns the outcome of this attempt.
    #[must_use]
    pub const fn outcome(&self) -> &AttemptOutcome<T, E> {
        &self.outcome
    }

    /// Returns `true` if the operation returned a value.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success(_))
    }

    /// Returns `true` if the operation failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Failure(_))
    }

    /// Returns the value produced by this attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AttemptAccessError::NoResult`] if the attempt failed.
    pub const fn result(&self) -> Result<&T, AttemptAccessError> {
        match &self.outcome {
            AttemptOutcome::Success(value) => Ok(value),
            AttemptOutcome::Failure(_) => Err(AttemptAccessError::NoResult(self.number)),
        }
    }

    /// Returns the failure cause of this attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AttemptAccessError::NoFailureCause`] if the attempt succeeded.
    pub const fn failure_cause(&self) -> Result<&E, AttemptAccessError> {
        match &self.outcome {
            AttemptOutcome::Failure(cause) => Ok(cause),
            AttemptOutcome::Success(_) => Err(AttemptAccessError::NoFailureCause(self.number)),
        }
    }

    /// Returns the instant the invocation started.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns how long the invocation itself took.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the time from the start of the first attempt to the end of this one.
    #[must_use]
    pub const fn delay_since_first_attempt(&self) -> Duration {
        self.delay_since_first_attempt
    }

    /// Consumes the attempt, returning its outcome.
    pub fn into_outcome(self) -> AttemptOutcome<T, E> {
        self.outcome
    }
}

/// The ordered, append-only sequence of attempts made during one run.
///
/// Attempt numbers are assigned on recording and are strictly increasing from 1.
#[derive(Clone, Debug)]
pub struct AttemptHistory<T, E> {
    attempts: Vec<Attempt<T, E>>,
}

impl<T, E> Default for AttemptHistory<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> AttemptHistory<T, E> {
    /// Creates a new empty [`AttemptHistory`] instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    /// Records the outcome of an invocation that began at `started_at` and completed now.
    ///
    /// The attempt is assigned the next ordinal and returned by reference; recorded
    /// attempts are never modified afterwards.
    pub fn record(&mut self, outcome: AttemptOutcome<T, E>, started_at: Instant) -> &Attempt<T, E> {
        let completed_at = Instant::now();
        let first_started_at = self.attempts.first().map_or(started_at, Attempt::started_at);
        let number = u32::try_from(self.attempts.len() + 1).unwrap_or(u32::MAX);

        self.attempts.push(Attempt {
            number,
            outcome,
            started_at,
            elapsed: completed_at.saturating_duration_since(started_at),
            delay_since_first_attempt: completed_at.saturating_duration_since(first_started_at),
        });

        &self.attempts[self.attempts.len() - 1]
    }

    /// Returns the number of recorded attempts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Returns `true` if no attempt has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Returns the number of recorded attempts beyond the first.
    #[must_use]
    pub fn retries(&self) -> u32 {
        u32::try_from(self.attempts.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Returns the first recorded attempt.
    #[must_use]
    pub fn first(&self) -> Option<&Attempt<T, E>> {
        self.attempts.first()
    }

    /// Returns the most recently recorded attempt.
    #[must_use]
    pub fn last(&self) -> Option<&Attempt<T, E>> {
        self.attempts.last()
    }

    /// Returns the time from the start of the first attempt to the end of the latest.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.last()
            .map_or(Duration::ZERO, Attempt::delay_since_first_attempt)
    }

    /// Returns the recorded attempts in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Attempt<T, E>] {
        &self.attempts
    }

    /// Returns an iterator over the recorded attempts in order.
    pub fn iter(&self) -> Iter<'_, Attempt<T, E>> {
        self.attempts.iter()
    }

    /// Consumes the history, returning the recorded attempts.
    #[must_use]
    pub fn into_attempts(self) -> Vec<Attempt<T, E>> {
        self.attempts
    }

    /// Takes the value of the latest attempt if it succeeded, otherwise hands the history back.
    pub(crate) fn into_success(mut self) -> Result<T, Self> {
        match self.attempts.pop() {
            Some(Attempt {
                outcome: AttemptOutcome::Success(value),
                ..
            }) => Ok(value),
            Some(attempt) => {
                self.attempts.push(attempt);
                Err(self)
            }
            None => Err(self),
        }
    }
}

impl<'a, T, E> IntoIterator for &'a AttemptHistory<T, E> {
    type Item = &'a Attempt<T, E>;
    type IntoIter = Iter<'a, Attempt<T, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attempts.iter()
    }
}
