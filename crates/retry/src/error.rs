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

//! Error types surfaced by the retry executor.

use std::fmt::Display;

use steadfast_core::InvalidStateTrigger;

use crate::attempt::{Attempt, AttemptHistory};

/// Misuse of an [`Attempt`] accessor: asking a success for its cause or a failure for its value.
///
/// This is a programming fault and never a reason to retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttemptAccessError {
    /// The attempt failed, so it has no result.
    #[error("attempt {0} failed and has no result")]
    NoResult(u32),
    /// The attempt succeeded, so it has no failure cause.
    #[error("attempt {0} succeeded and has no failure cause")]
    NoFailureCause(u32),
}

/// Terminal failure of a retry run.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<T, E> {
    /// Retrying stopped without an acceptable outcome and no recovery was supplied.
    ///
    /// The message names the last failure cause, when the last attempt failed.
    #[error("{}", exhausted_message(.history))]
    Exhausted {
        /// Every attempt made during the run, in order.
        history: AttemptHistory<T, E>,
    },
    /// The recovery callback itself failed.
    #[error("recovery failed: {0}")]
    Recovery(E),
    /// The run was cancelled by an external signal.
    #[error("run cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// The number of attempts recorded before cancellation.
        attempts: u32,
    },
    /// The run lifecycle was driven through an invalid transition.
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTrigger),
}

impl<T, E> RetryError<T, E> {
    /// Returns `true` if retries were exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns `true` if the run was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the attempt history when retries were exhausted.
    #[must_use]
    pub const fn history(&self) -> Option<&AttemptHistory<T, E>> {
        match self {
            Self::Exhausted { history } => Some(history),
            _ => None,
        }
    }

    /// Returns the last attempt when retries were exhausted.
    #[must_use]
    pub fn last_attempt(&self) -> Option<&Attempt<T, E>> {
        self.history().and_then(AttemptHistory::last)
    }

    /// Returns the failure cause of the last attempt when retries were exhausted.
    ///
    /// Returns `None` when the last attempt was an unwanted success.
    #[must_use]
    pub fn last_cause(&self) -> Option<&E> {
        self.last_attempt().and_then(|a| a.failure_cause().ok())
    }

    /// Consumes the error, returning the attempt history when retries were exhausted.
    #[must_use]
    pub fn into_history(self) -> Option<AttemptHistory<T, E>> {
        match self {
            Self::Exhausted { history } => Some(history),
            _ => None,
        }
    }
}

fn exhausted_message<T, E: Display>(history: &AttemptHistory<T, E>) -> String {
    let summary = format!("retries exhausted after {} attempt(s)", history.len());
    match history.last().and_then(|a| a.failure_cause().ok()) {
        Some(cause) => format!("{summary}: {cause}"),
        None => summary,
    }
}
