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

//! Runs an always-failing division under the default retry policy.
//!
//! `RUST_LOG=debug cargo run --bin flaky-demo` shows every attempt.

use std::{env, error::Error};

use steadfast_retry::{
    LoggingListener, RecoverWith, RetryConfig, RetryExecutor, RetryOptions, RetryPredicate,
    logging::init_tracing,
};

#[derive(Debug, thiserror::Error)]
enum CalcError {
    #[error("division by zero")]
    DivideByZero,
}

fn divide(numerator: u64, denominator: u64) -> Result<String, CalcError> {
    numerator
        .checked_div(denominator)
        .map(|q| q.to_string())
        .ok_or(CalcError::DivideByZero)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing()?;

    let args: Vec<String> = env::args().collect();
    let denominator = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);

    let config = RetryConfig::default();
    let mut options: RetryOptions<String, CalcError> = RetryOptions::new()
        .with_retry_predicate(RetryPredicate::on_failure())
        .with_listener(LoggingListener::new("divide"));
    options.stop_strategy = config.stop_strategy()?;
    options.wait_strategy = config.wait_strategy()?;
    let executor = RetryExecutor::new(options).with_name("divide");

    match executor.run(|| async move { divide(1, denominator) }).await {
        Ok(value) => println!("Result: {value}"),
        Err(e) => {
            println!("Failed: {e}");
            if let Some(cause) = e.last_cause() {
                println!("Last cause: {cause}");
            }
        }
    }

    let value = executor
        .run_with_recovery(
            || async move { divide(1, denominator) },
            &RecoverWith("fallback".to_string()),
        )
        .await?;
    println!("Result with recovery: {value}");

    Ok(())
}
