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

//! Stop strategies deciding, from the attempt history, whether to give up retrying.

use std::time::Duration;

use steadfast_core::correctness::check_positive_u32;

use crate::attempt::AttemptHistory;

/// Decides, given the attempt history, whether to stop retrying.
///
/// Implementations hold immutable configuration only; any statistics must be derived
/// from the `history` passed in so that one instance can serve concurrent runs.
pub trait StopStrategy<T, E>: Send + Sync {
    /// Returns `true` if no further attempt should be made.
    fn should_stop(&self, history: &AttemptHistory<T, E>) -> bool;
}

impl<T, E, S> StopStrategy<T, E> for Box<S>
where
    S: StopStrategy<T, E> + ?Sized,
{
    fn should_stop(&self, history: &AttemptHistory<T, E>) -> bool {
        (**self).should_stop(history)
    }
}

/// Never stops; the retry predicate alone ends the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverStop;

impl<T, E> StopStrategy<T, E> for NeverStop {
    fn should_stop(&self, _history: &AttemptHistory<T, E>) -> bool {
        false
    }
}

/// Stops once the given number of attempts has been made.
///
/// A limit of 1 allows the initial attempt only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopAfterAttempt {
    max_attempts: u32,
}

impl StopAfterAttempt {
    /// Creates a new [`StopAfterAttempt`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero.
    pub fn new(max_attempts: u32) -> anyhow::Result<Self> {
        check_positive_u32(max_attempts, stringify!(max_attempts))?;
        Ok(Self { max_attempts })
    }

    /// Returns the configured attempt limit.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl<T, E> StopStrategy<T, E> for StopAfterAttempt {
    fn should_stop(&self, history: &AttemptHistory<T, E>) -> bool {
        history.len() >= self.max_attempts as usize
    }
}

/// Stops once the time since the first attempt exceeds the given budget.
///
/// Evaluated against the completion time of the most recent attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopAfterDelay {
    max_delay: Duration,
}

impl StopAfterDelay {
    /// Creates a new [`StopAfterDelay`] instance.
    #[must_use]
    pub const fn new(max_delay: Duration) -> Self {
        Self { max_delay }
    }

    /// Returns the configured time budget.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl<T, E> StopStrategy<T, E> for StopAfterDelay {
    fn should_stop(&self, history: &AttemptHistory<T, E>) -> bool {
        history
            .last()
            .is_some_and(|a| a.delay_since_first_attempt() > self.max_delay)
    }
}

/// Adapts a function of the history into a [`StopStrategy`].
#[derive(Clone, Copy, Debug)]
pub struct StopIf<F>(pub F);

impl<T, E, F> StopStrategy<T, E> for StopIf<F>
where
    F: Fn(&AttemptHistory<T, E>) -> bool + Send + Sync,
{
    fn should_stop(&self, history: &AttemptHistory<T, E>) -> bool {
        (self.0)(history)
    }
}

/// Stops when either of two strategies says stop.
#[derive(Clone, Copy, Debug)]
pub struct StopOr<A, B>(A, B);

impl<A, B> StopOr<A, B> {
    /// Creates a new [`StopOr`] instance combining `first` and `second`.
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Self(first, second)
    }
}

impl<T, E, A, B> StopStrategy<T, E> for StopOr<A, B>
where
    A: StopStrategy<T, E>,
    B: StopStrategy<T, E>,
{
    fn should_stop(&self, history: &AttemptHistory<T, E>) -> bool {
        self.0.should_stop(history) || self.1.should_stop(history)
    }
}
