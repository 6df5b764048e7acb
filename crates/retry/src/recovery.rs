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

//! Fallbacks producing a final value once retrying has been abandoned.

use crate::attempt::AttemptHistory;

/// Produces a final result after the run stopped without an acceptable outcome.
///
/// Invoked at most once per run. A failure returned here replaces the exhaustion
/// failure and is surfaced as [`RetryError::Recovery`](crate::error::RetryError::Recovery).
pub trait RecoveryCallback<T, E>: Send + Sync {
    /// Returns the fallback result for the run described by `history`.
    ///
    /// # Errors
    ///
    /// Returns an error if no fallback value can be produced.
    fn recover(&self, history: &AttemptHistory<T, E>) -> Result<T, E>;
}

/// Adapts a function of the history into a [`RecoveryCallback`].
#[derive(Clone, Copy, Debug)]
pub struct RecoverFn<F>(pub F);

impl<T, E, F> RecoveryCallback<T, E> for RecoverFn<F>
where
    F: Fn(&AttemptHistory<T, E>) -> Result<T, E> + Send + Sync,
{
    fn recover(&self, history: &AttemptHistory<T, E>) -> Result<T, E> {
        (self.0)(history)
    }
}

/// Recovers with a clone of a fixed fallback value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverWith<T>(pub T);

impl<T, E> RecoveryCallback<T, E> for RecoverWith<T>
where
    T: Clone + Send + Sync,
{
    fn recover(&self, _history: &AttemptHistory<T, E>) -> Result<T, E> {
        Ok(self.0.clone())
    }
}
