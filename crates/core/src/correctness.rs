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

//! Functions for correctness checks similar to the *design by contract* philosophy.
//!
//! A condition is a predicate which must be true just prior to the execution of some section of
//! code for correct behavior as per the design specification.
//!
//! Every check returns an [`anyhow::Result`] rather than panicking, so that invalid
//! configuration can be rejected eagerly at construction time and surfaced to the caller.

use std::time::Duration;

use anyhow::bail;

/// A message prefix that can be used with calls to `expect` or other assertion-related functions.
pub const FAILED: &str = "Condition failed";

/// Checks the `u32` value is positive (> 0).
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_positive_u32(value: u32, param: &str) -> anyhow::Result<()> {
    if value == 0 {
        bail!("{FAILED}: invalid u32 for '{param}' not positive, was {value}")
    }
    Ok(())
}

/// Checks the `f64` value is finite and not less than `min`.
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_f64_finite_at_least(value: f64, min: f64, param: &str) -> anyhow::Result<()> {
    if !value.is_finite() {
        bail!("{FAILED}: invalid f64 for '{param}', was {value}")
    }
    if value < min {
        bail!("{FAILED}: invalid f64 for '{param}' less than {min}, was {value}")
    }
    Ok(())
}

/// Checks the `lower` duration does not exceed the `upper` duration.
///
/// # Errors
///
/// Returns an error if the validation check fails.
pub fn check_duration_order(
    lower: Duration,
    upper: Duration,
    lower_param: &str,
    upper_param: &str,
) -> anyhow::Result<()> {
    if lower > upper {
        bail!(
            "{FAILED}: '{lower_param}' of {lower:?} was greater than '{upper_param}' of {upper:?}"
        )
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(u32::MAX)]
    fn test_check_positive_u32_when_positive(#[case] value: u32) {
        assert!(check_positive_u32(value, "value").is_ok());
    }

    #[rstest]
    fn test_check_positive_u32_when_zero() {
        let err = check_positive_u32(0, "max_attempts").unwrap_err();
        assert!(err.to_string().contains("'max_attempts' not positive"));
    }

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(2.5, 1.0)]
    #[case(0.0, 0.0)]
    fn test_check_f64_finite_at_least_valid(#[case] value: f64, #[case] min: f64) {
        assert!(check_f64_finite_at_least(value, min, "factor").is_ok());
    }

    #[rstest]
    #[case(0.5, 1.0)]
    #[case(f64::NAN, 1.0)]
    #[case(f64::INFINITY, 1.0)]
    #[case(f64::NEG_INFINITY, 0.0)]
    fn test_check_f64_finite_at_least_invalid(#[case] value: f64, #[case] min: f64) {
        assert!(check_f64_finite_at_least(value, min, "factor").is_err());
    }

    #[rstest]
    #[case(Duration::ZERO, Duration::ZERO)]
    #[case(Duration::from_millis(100), Duration::from_secs(1))]
    fn test_check_duration_order_valid(#[case] lower: Duration, #[case] upper: Duration) {
        assert!(check_duration_order(lower, upper, "initial", "max").is_ok());
    }

    #[rstest]
    fn test_check_duration_order_invalid() {
        let err = check_duration_order(
            Duration::from_secs(2),
            Duration::from_secs(1),
            "initial",
            "max",
        )
        .unwrap_err();
        assert!(err.to_string().contains("'initial' of 2s was greater than 'max' of 1s"));
    }
}
