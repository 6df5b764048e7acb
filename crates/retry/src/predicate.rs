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

//! Retry predicates deciding whether an attempt's outcome warrants another try.
//!
//! A [`RetryPredicate`] is an ordered set of [`RetryCondition`]s combined by logical OR.
//! An empty predicate never retries, so the executor must be told explicitly what counts
//! as retryable.

use std::{fmt::Debug, sync::Arc};

use crate::attempt::{Attempt, AttemptOutcome};

type Matcher<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// Selects which failure causes are retryable.
pub enum FailureFilter<E> {
    /// Every failure is retryable.
    Any,
    /// Only failures matching the function are retryable; all others are terminal.
    Matching(Matcher<E>),
}

impl<E> Clone for FailureFilter<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Any => Self::Any,
            Self::Matching(f) => Self::Matching(Arc::clone(f)),
        }
    }
}

impl<E> Debug for FailureFilter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Matching(_) => write!(f, "Matching(<function>)"),
        }
    }
}

/// A single condition under which an attempt is retried.
pub enum RetryCondition<T, E> {
    /// Retry when the attempt failed with a cause accepted by the filter.
    OnFailure(FailureFilter<E>),
    /// Retry when the attempt succeeded with a value matching the function.
    OnResult(Matcher<T>),
}

impl<T, E> Clone for RetryCondition<T, E> {
    fn clone(&self) -> Self {
        match self {
            Self::OnFailure(filter) => Self::OnFailure(filter.clone()),
            Self::OnResult(f) => Self::OnResult(Arc::clone(f)),
        }
    }
}

impl<T, E> Debug for RetryCondition<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnFailure(filter) => f.debug_tuple("OnFailure").field(filter).finish(),
            Self::OnResult(_) => write!(f, "OnResult(<function>)"),
        }
    }
}

impl<T, E> RetryCondition<T, E> {
    /// Returns whether this condition fires for the given attempt.
    pub fn matches(&self, attempt: &Attempt<T, E>) -> bool {
        match (self, attempt.outcome()) {
            (Self::OnFailure(FailureFilter::Any), AttemptOutcome::Failure(_)) => true,
            (Self::OnFailure(FailureFilter::Matching(f)), AttemptOutcome::Failure(cause)) => {
                f(cause)
            }
            (Self::OnResult(f), AttemptOutcome::Success(value)) => f(value),
            _ => false,
        }
    }
}

/// Decides whether an attempt's outcome warrants a retry.
pub struct RetryPredicate<T, E> {
    conditions: Vec<RetryCondition<T, E>>,
}

impl<T, E> Clone for RetryPredicate<T, E> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
        }
    }
}

impl<T, E> Debug for RetryPredicate<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RetryPredicate))
            .field("conditions", &self.conditions)
            .finish()
    }
}

impl<T, E> Default for RetryPredicate<T, E> {
    fn default() -> Self {
        Self::never()
    }
}

impl<T, E> RetryPredicate<T, E> {
    /// Creates a predicate that never retries.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Creates a predicate that retries on any failure.
    #[must_use]
    pub fn on_failure() -> Self {
        Self::from_condition(RetryCondition::OnFailure(FailureFilter::Any))
    }

    /// Creates a predicate that retries only on failures accepted by `filter`.
    #[must_use]
    pub fn on_failure_if<F>(filter: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::from_condition(RetryCondition::OnFailure(FailureFilter::Matching(
            Arc::new(filter),
        )))
    }

    /// Creates a predicate that retries on successes whose value matches `predicate`.
    #[must_use]
    pub fn on_result<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_condition(RetryCondition::OnResult(Arc::new(predicate)))
    }

    /// Creates a predicate that retries while the returned value equals `sentinel`.
    #[must_use]
    pub fn on_result_eq(sentinel: T) -> Self
    where
        T: PartialEq + Send + Sync + 'static,
    {
        Self::on_result(move |value| *value == sentinel)
    }

    /// Creates a predicate from a single condition.
    #[must_use]
    pub fn from_condition(condition: RetryCondition<T, E>) -> Self {
        Self {
            conditions: vec![condition],
        }
    }

    /// Combines this predicate with `other` by logical OR.
    #[must_use]
    pub fn or(mut self, other: Self) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// Returns the configured conditions.
    #[must_use]
    pub fn conditions(&self) -> &[RetryCondition<T, E>] {
        &self.conditions
    }

    /// Returns whether the attempt warrants a retry.
    pub fn should_retry(&self, attempt: &Attempt<T, E>) -> bool {
        self.conditions.iter().any(|c| c.matches(attempt))
    }
}
