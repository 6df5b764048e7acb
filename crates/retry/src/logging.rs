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

//! Tracing initialization for applications embedding the retry executor.

use std::env;

use tracing_subscriber::EnvFilter;

/// Initialize tracing.
///
/// The executor and its listeners emit `tracing` events. A subscriber is installed
/// only when the `RUST_LOG` environment variable is set, using its value as the filter.
///
/// Should only be called once during an application's run, ideally at the beginning.
///
/// # Errors
///
/// Returns an error if the tracing subscriber fails to initialize.
pub fn init_tracing() -> anyhow::Result<()> {
    if let Ok(v) = env::var("RUST_LOG") {
        let env_filter = EnvFilter::new(&v);

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::debug!("Initialized tracing logs with RUST_LOG={v}");
    }
    Ok(())
}
