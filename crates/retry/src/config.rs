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

//! Serializable retry configuration and preset executors.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    executor::{RetryExecutor, RetryOptions},
    predicate::RetryPredicate,
    stop::{NeverStop, StopAfterAttempt, StopAfterDelay, StopOr, StopStrategy},
    wait::{
        ExponentialWait, FixedWait, IncrementingWait, Jittered, NoWait, RandomWait, WaitStrategy,
    },
};

/// The delay schedule between attempts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaitConfig {
    /// Retry immediately.
    None,
    /// The same delay before every retry.
    Fixed {
        /// The delay (milliseconds).
        delay_ms: u64,
    },
    /// A delay growing linearly with each retry.
    Incrementing {
        /// The delay before the first retry (milliseconds).
        initial_ms: u64,
        /// The amount added per subsequent retry (milliseconds).
        increment_ms: u64,
        /// The cap on the delay (milliseconds).
        max_ms: u64,
    },
    /// A delay growing geometrically with each retry.
    Exponential {
        /// The delay before the first retry (milliseconds).
        initial_ms: u64,
        /// The multiplier applied per subsequent retry.
        factor: f64,
        /// The cap on the delay (milliseconds).
        max_ms: u64,
    },
    /// A delay drawn uniformly at random for each retry.
    Random {
        /// The lower bound (milliseconds).
        min_ms: u64,
        /// The upper bound (milliseconds).
        max_ms: u64,
    },
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::Fixed { delay_ms: 1_000 }
    }
}

impl WaitConfig {
    /// Builds the wait strategy described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid.
    pub fn build<T, E>(&self) -> anyhow::Result<Box<dyn WaitStrategy<T, E>>>
    where
        T: 'static,
        E: 'static,
    {
        let strategy: Box<dyn WaitStrategy<T, E>> = match *self {
            Self::None => Box::new(NoWait),
            Self::Fixed { delay_ms } => Box::new(FixedWait::new(Duration::from_millis(delay_ms))),
            Self::Incrementing {
                initial_ms,
                increment_ms,
                max_ms,
            } => Box::new(IncrementingWait::new(
                Duration::from_millis(initial_ms),
                Duration::from_millis(increment_ms),
                Duration::from_millis(max_ms),
            )?),
            Self::Exponential {
                initial_ms,
                factor,
                max_ms,
            } => Box::new(ExponentialWait::new(
                Duration::from_millis(initial_ms),
                factor,
                Duration::from_millis(max_ms),
            )?),
            Self::Random { min_ms, max_ms } => Box::new(RandomWait::new(
                Duration::from_millis(min_ms),
                Duration::from_millis(max_ms),
            )?),
        };
        Ok(strategy)
    }
}

/// Configuration for [`RetryExecutor`] instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// The maximum number of attempts, including the first (`None` for unlimited).
    pub max_attempts: Option<u32>,
    /// The total time budget measured from the start of the first attempt (milliseconds).
    pub max_elapsed_ms: Option<u64>,
    /// The delay schedule between attempts.
    pub wait: WaitConfig,
    /// The maximum random jitter added to each delay (milliseconds).
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    /// Creates a new default [`RetryConfig`] instance.
    fn default() -> Self {
        Self {
            max_attempts: Some(3),
            max_elapsed_ms: None,
            wait: WaitConfig::default(),
            jitter_ms: 0,
        }
    }
}

impl RetryConfig {
    /// Builds the stop strategy described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero.
    pub fn stop_strategy<T, E>(&self) -> anyhow::Result<Arc<dyn StopStrategy<T, E>>>
    where
        T: 'static,
        E: 'static,
    {
        let max_delay = self.max_elapsed_ms.map(Duration::from_millis);
        let strategy: Arc<dyn StopStrategy<T, E>> = match (self.max_attempts, max_delay) {
            (Some(n), Some(d)) => Arc::new(StopOr::new(
                StopAfterAttempt::new(n)?,
                StopAfterDelay::new(d),
            )),
            (Some(n), None) => Arc::new(StopAfterAttempt::new(n)?),
            (None, Some(d)) => Arc::new(StopAfterDelay::new(d)),
            (None, None) => Arc::new(NeverStop),
        };
        Ok(strategy)
    }

    /// Builds the wait strategy described by this configuration, including jitter.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait parameters are invalid.
    pub fn wait_strategy<T, E>(&self) -> anyhow::Result<Arc<dyn WaitStrategy<T, E>>>
    where
        T: 'static,
        E: 'static,
    {
        let inner = self.wait.build()?;
        let strategy: Arc<dyn WaitStrategy<T, E>> = if self.jitter_ms == 0 {
            Arc::new(inner)
        } else {
            Arc::new(Jittered::new(inner, Duration::from_millis(self.jitter_ms)))
        };
        Ok(strategy)
    }

    /// Builds an executor retrying outcomes matched by `predicate`.
    ///
    /// Every policy is validated here, before any operation runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build_executor<T, E>(
        &self,
        predicate: RetryPredicate<T, E>,
    ) -> anyhow::Result<RetryExecutor<T, E>>
    where
        T: 'static,
        E: 'static,
    {
        let options = RetryOptions {
            retry_predicate: predicate,
            stop_strategy: self.stop_strategy()?,
            wait_strategy: self.wait_strategy()?,
            listeners: Vec::new(),
        };
        Ok(RetryExecutor::new(options))
    }
}

/// Convenience function to create a retry executor with default configuration.
///
/// # Errors
///
/// This function will return an error if the default configuration is invalid.
pub fn create_default_retry_executor<T, E>(
    predicate: RetryPredicate<T, E>,
) -> anyhow::Result<RetryExecutor<T, E>>
where
    T: 'static,
    E: 'static,
{
    RetryConfig::default().build_executor(predicate)
}

/// Convenience function to create a retry executor for HTTP operations.
///
/// # Errors
///
/// This function will return an error if the HTTP configuration is invalid.
pub fn create_http_retry_executor<T, E>(
    predicate: RetryPredicate<T, E>,
) -> anyhow::Result<RetryExecutor<T, E>>
where
    T: 'static,
    E: 'static,
{
    let config = RetryConfig {
        max_attempts: Some(3),
        max_elapsed_ms: Some(180_000), // 3 minutes total budget
        wait: WaitConfig::Exponential {
            initial_ms: 1_000,
            factor: 2.0,
            max_ms: 10_000,
        },
        jitter_ms: 1_000,
    };
    Ok(config.build_executor(predicate)?.with_name("http"))
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokio::time::Instant;

    use super::*;
    use crate::attempt::AttemptHistory;

    #[rstest]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, Some(3));
        assert_eq!(config.max_elapsed_ms, None);
        assert_eq!(config.wait, WaitConfig::Fixed { delay_ms: 1_000 });
        assert_eq!(config.jitter_ms, 0);
    }

    #[rstest]
    fn test_deserialize_partial_config_uses_defaults() {
        let config: RetryConfig = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
        assert_eq!(config.max_attempts, Some(5));
        assert_eq!(config.wait, WaitConfig::default());
    }

    #[rstest]
    fn test_deserialize_tagged_wait() {
        let json = r#"{
            "max_attempts": null,
            "max_elapsed_ms": 30000,
            "wait": {"type": "exponential", "initial_ms": 100, "factor": 2.0, "max_ms": 5000},
            "jitter_ms": 50
        }"#;
        let config: RetryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.max_elapsed_ms, Some(30_000));
        assert_eq!(
            config.wait,
            WaitConfig::Exponential {
                initial_ms: 100,
                factor: 2.0,
                max_ms: 5_000,
            }
        );
        assert_eq!(config.jitter_ms, 50);
    }

    #[rstest]
    #[case(r#"{"wait": {"type": "fixed", "delay_ms": -1}}"#)]
    #[case(r#"{"jitter_ms": -5}"#)]
    #[case(r#"{"wait": {"type": "sometimes"}}"#)]
    fn test_deserialize_rejects_invalid_values(#[case] json: &str) {
        assert!(serde_json::from_str::<RetryConfig>(json).is_err());
    }

    #[rstest]
    #[case(RetryConfig { max_attempts: Some(0), ..RetryConfig::default() })]
    #[case(RetryConfig {
        wait: WaitConfig::Exponential { initial_ms: 100, factor: 0.5, max_ms: 1_000 },
        ..RetryConfig::default()
    })]
    #[case(RetryConfig {
        wait: WaitConfig::Incrementing { initial_ms: 500, increment_ms: 10, max_ms: 100 },
        ..RetryConfig::default()
    })]
    #[case(RetryConfig {
        wait: WaitConfig::Random { min_ms: 10, max_ms: 5 },
        ..RetryConfig::default()
    })]
    fn test_build_executor_rejects_invalid_config(#[case] config: RetryConfig) {
        let result = config.build_executor::<u32, String>(RetryPredicate::on_failure());
        assert!(result.is_err());
    }

    #[rstest]
    fn test_wait_strategy_with_jitter_stays_in_bounds() {
        let config = RetryConfig {
            wait: WaitConfig::Fixed { delay_ms: 100 },
            jitter_ms: 20,
            ..RetryConfig::default()
        };
        let wait = config.wait_strategy::<u32, String>().unwrap();
        let history = AttemptHistory::new();

        for _ in 0..50 {
            let delay = wait.next_delay(&history);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(120));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_executor_retries_three_times_one_second_apart() {
        let executor =
            create_default_retry_executor::<u32, String>(RetryPredicate::on_failure()).unwrap();
        let start = Instant::now();

        let err = executor
            .run(|| async { Err("boom".to_string()) })
            .await
            .unwrap_err();

        assert_eq!(err.history().unwrap().len(), 3);
        assert_eq!(start.elapsed().as_secs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_executor_exhausts_after_three_attempts() {
        let executor =
            create_http_retry_executor::<u32, String>(RetryPredicate::on_failure()).unwrap();
        let start = Instant::now();

        let err = executor
            .run(|| async { Err("503".to_string()) })
            .await
            .unwrap_err();

        // Waits of 1s and 2s, each with up to 1s jitter
        let elapsed = start.elapsed();
        assert_eq!(executor.name(), "http");
        assert_eq!(err.history().unwrap().len(), 3);
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed <= Duration::from_secs(5) + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_budget_without_attempt_limit() {
        let config = RetryConfig {
            max_attempts: None,
            max_elapsed_ms: Some(2_500),
            ..RetryConfig::default()
        };
        let executor = config
            .build_executor::<u32, String>(RetryPredicate::on_failure())
            .unwrap();

        let err = executor
            .run(|| async { Err("down".to_string()) })
            .await
            .unwrap_err();

        assert_eq!(err.history().unwrap().len(), 4);
    }
}
