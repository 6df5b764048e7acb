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

//! A policy-driven retry executor for fallible async operations.
//!
//! The `steadfast-retry` crate wraps a zero-argument operation and re-invokes it until an
//! outcome is accepted, a stop condition fires, or the run is cancelled. Behavior is
//! assembled from small, stateless policy objects:
//!
//! - [`RetryPredicate`] decides whether an outcome (a failure, or an unwanted value) is retried.
//! - [`StopStrategy`] decides when retrying must cease.
//! - [`WaitStrategy`] computes the pause before the next attempt.
//! - [`RetryListener`] observes each attempt without influencing control flow.
//! - [`RecoveryCallback`] produces a fallback value once retrying is abandoned.
//!
//! Policies derive everything from the [`AttemptHistory`] passed to them, so a single
//! [`RetryExecutor`] can serve many concurrent runs.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use steadfast_retry::{
//!     FixedWait, RecoverWith, RetryExecutor, RetryOptions, RetryPredicate, StopAfterAttempt,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let executor: RetryExecutor<String, std::io::Error> = RetryExecutor::new(
//!     RetryOptions::new()
//!         .with_retry_predicate(RetryPredicate::on_failure())
//!         .with_stop_strategy(StopAfterAttempt::new(3)?)
//!         .with_wait_strategy(FixedWait::new(Duration::from_secs(1))),
//! );
//!
//! let quotes = executor
//!     .run_with_recovery(
//!         || async { std::fs::read_to_string("quotes.json") },
//!         &RecoverWith("fallback".to_string()),
//!     )
//!     .await?;
//! println!("{quotes}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod attempt;
pub mod config;
pub mod error;
pub mod executor;
pub mod listener;
pub mod logging;
pub mod predicate;
pub mod recovery;
pub mod state;
pub mod stop;
pub mod wait;

pub use crate::{
    attempt::{Attempt, AttemptHistory, AttemptOutcome},
    config::{RetryConfig, WaitConfig, create_default_retry_executor, create_http_retry_executor},
    error::{AttemptAccessError, RetryError},
    executor::{RetryExecutor, RetryOptions},
    listener::{ListenerFn, LoggingListener, RetryListener},
    predicate::{FailureFilter, RetryCondition, RetryPredicate},
    recovery::{RecoverFn, RecoverWith, RecoveryCallback},
    state::{RunState, RunTrigger},
    stop::{NeverStop, StopAfterAttempt, StopAfterDelay, StopIf, StopOr, StopStrategy},
    wait::{
        ExponentialWait, FixedWait, IncrementingWait, Jittered, NoWait, Plus, RandomWait,
        WaitFn, WaitStrategy,
    },
};
