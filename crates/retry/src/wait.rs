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

//! Wait strategies deciding how long to pause before the next attempt.
//!
//! Every strategy here is stateless with respect to a run. Growth is derived from the
//! number of retries already made (`history.retries()`), so the first pause after the
//! initial attempt uses the base delay, and a single instance can serve concurrent runs.

use std::time::Duration;

use rand::Rng;
use steadfast_core::correctness::{check_duration_order, check_f64_finite_at_least};

use crate::attempt::AttemptHistory;

/// Decides, given the attempt history, how long to delay before the next attempt.
///
/// Only consulted when another attempt will actually be made.
pub trait WaitStrategy<T, E>: Send + Sync {
    /// Returns the delay before the next attempt.
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration;
}

impl<T, E, W> WaitStrategy<T, E> for Box<W>
where
    W: WaitStrategy<T, E> + ?Sized,
{
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration {
        (**self).next_delay(history)
    }
}

/// Retries immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoWait;

impl<T, E> WaitStrategy<T, E> for NoWait {
    fn next_delay(&self, _history: &AttemptHistory<T, E>) -> Duration {
        Duration::ZERO
    }
}

/// Waits the same delay before every retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedWait {
    delay: Duration,
}

impl FixedWait {
    /// Creates a new [`FixedWait`] instance.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl<T, E> WaitStrategy<T, E> for FixedWait {
    fn next_delay(&self, _history: &AttemptHistory<T, E>) -> Duration {
        self.delay
    }
}

/// Waits `initial + increment * retries`, capped at `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncrementingWait {
    initial: Duration,
    increment: Duration,
    max: Duration,
}

impl IncrementingWait {
    /// Creates a new [`IncrementingWait`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial` is greater than `max`.
    pub fn new(initial: Duration, increment: Duration, max: Duration) -> anyhow::Result<Self> {
        check_duration_order(initial, max, stringify!(initial), stringify!(max))?;
        Ok(Self {
            initial,
            increment,
            max,
        })
    }
}

impl<T, E> WaitStrategy<T, E> for IncrementingWait {
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration {
        self.increment
            .checked_mul(history.retries())
            .and_then(|step| self.initial.checked_add(step))
            .map_or(self.max, |delay| delay.min(self.max))
    }
}

/// Waits `initial * factor^retries`, capped at `max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExponentialWait {
    initial: Duration,
    factor: f64,
    max: Duration,
}

impl ExponentialWait {
    /// Creates a new [`ExponentialWait`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `factor` is not finite or is less than 1.0.
    /// - `initial` is greater than `max`.
    pub fn new(initial: Duration, factor: f64, max: Duration) -> anyhow::Result<Self> {
        check_f64_finite_at_least(factor, 1.0, stringify!(factor))?;
        check_duration_order(initial, max, stringify!(initial), stringify!(max))?;
        Ok(Self {
            initial,
            factor,
            max,
        })
    }
}

impl<T, E> WaitStrategy<T, E> for ExponentialWait {
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration {
        let exponent = i32::try_from(history.retries()).unwrap_or(i32::MAX);
        let nanos = self.initial.as_nanos() as f64 * self.factor.powi(exponent);
        let max_nanos = self.max.as_nanos() as f64;

        if !nanos.is_finite() || nanos >= max_nanos {
            self.max
        } else if nanos < u64::MAX as f64 {
            Duration::from_nanos(nanos as u64)
        } else {
            Duration::try_from_secs_f64(nanos / 1e9).map_or(self.max, |d| d.min(self.max))
        }
    }
}

/// Waits a uniformly random delay within `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomWait {
    min: Duration,
    max: Duration,
}

impl RandomWait {
    /// Creates a new [`RandomWait`] instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `min` is greater than `max`.
    pub fn new(min: Duration, max: Duration) -> anyhow::Result<Self> {
        check_duration_order(min, max, stringify!(min), stringify!(max))?;
        Ok(Self { min, max })
    }
}

impl<T, E> WaitStrategy<T, E> for RandomWait {
    fn next_delay(&self, _history: &AttemptHistory<T, E>) -> Duration {
        self.min + random_up_to(self.max - self.min)
    }
}

/// Adds a uniformly random jitter within `[0, jitter]` to an inner strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Jittered<W> {
    inner: W,
    jitter: Duration,
}

impl<W> Jittered<W> {
    /// Creates a new [`Jittered`] instance wrapping `inner`.
    #[must_use]
    pub const fn new(inner: W, jitter: Duration) -> Self {
        Self { inner, jitter }
    }
}

impl<T, E, W> WaitStrategy<T, E> for Jittered<W>
where
    W: WaitStrategy<T, E>,
{
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration {
        self.inner
            .next_delay(history)
            .saturating_add(random_up_to(self.jitter))
    }
}

/// Sums the delays of two strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plus<A, B>(A, B);

impl<A, B> Plus<A, B> {
    /// Creates a new [`Plus`] instance summing `first` and `second`.
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Self(first, second)
    }
}

impl<T, E, A, B> WaitStrategy<T, E> for Plus<A, B>
where
    A: WaitStrategy<T, E>,
    B: WaitStrategy<T, E>,
{
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration {
        self.0
            .next_delay(history)
            .saturating_add(self.1.next_delay(history))
    }
}

/// Adapts a function of the history into a [`WaitStrategy`].
#[derive(Clone, Copy, Debug)]
pub struct WaitFn<F>(pub F);

impl<T, E, F> WaitStrategy<T, E> for WaitFn<F>
where
    F: Fn(&AttemptHistory<T, E>) -> Duration + Send + Sync,
{
    fn next_delay(&self, history: &AttemptHistory<T, E>) -> Duration {
        (self.0)(history)
    }
}

fn random_up_to(bound: Duration) -> Duration {
    if bound.is_zero() {
        return Duration::ZERO;
    }
    let bound_nanos = u64::try_from(bound.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(rand::rng().random_range(0..=bound_nanos))
}
