/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Configuration for the Switchboard messaging core.
///
/// Loaded from `config.toml` in the XDG configuration directory for `switchboard`
/// (for example `~/.config/switchboard/config.toml`). Every section and field is
/// optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    /// Queue and buffer limits
    pub limits: LimitsConfig,
    /// Lifecycle timeouts
    pub timeouts: TimeoutConfig,
    /// Defaults for throttlers built without explicit parameters
    pub throttling: ThrottlingConfig,
    /// Log output settings used by [`init_tracing`](crate::common::init_tracing)
    pub tracing: TracingConfig,
}

/// Queue and buffer limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Capacity of every processor input queue
    pub processor_queue_capacity: usize,
}

/// Lifecycle timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long `start` waits to observe `Running`, in milliseconds
    pub component_start_ms: u64,
    /// Stop budget used when a caller does not supply one, in milliseconds
    pub component_stop_ms: u64,
}

/// Defaults for throttlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlingConfig {
    /// Length of one throttle interval, in milliseconds
    pub interval_ms: u64,
    /// Messages released per interval
    pub limit: u32,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Directory the log file is written to
    pub log_directory: String,
    /// Log file name
    pub log_file: String,
    /// `EnvFilter` directive applied when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            processor_queue_capacity: 4_194_304,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            component_start_ms: 5_000,
            component_stop_ms: 10_000,
        }
    }
}

impl Default for ThrottlingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            limit: 100,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_directory: "logs".to_string(),
            log_file: "switchboard.log".to_string(),
            filter: "info".to_string(),
        }
    }
}

impl SwitchboardConfig {
    /// Start timeout as a `Duration`.
    #[must_use]
    pub const fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.component_start_ms)
    }

    /// Default stop timeout as a `Duration`.
    #[must_use]
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.component_stop_ms)
    }

    /// Default throttle interval as a `Duration`.
    #[must_use]
    pub const fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttling.interval_ms)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed input.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Loads configuration from the XDG configuration directory.
    ///
    /// Falls back to defaults when no file exists. A file that cannot be read or
    /// parsed is logged and ignored.
    #[must_use]
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("switchboard") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }

    /// Loads configuration from an explicit file, with the same fallbacks as
    /// [`SwitchboardConfig::load`].
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(source) => match Self::from_toml_str(&source) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Process-wide configuration, loaded on first use.
    pub static ref CONFIG: SwitchboardConfig = SwitchboardConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SwitchboardConfig::default();
        assert_eq!(config.limits.processor_queue_capacity, 1 << 22);
        assert_eq!(config.stop_timeout(), Duration::from_secs(10));
        assert_eq!(config.throttle_interval(), Duration::from_secs(1));
    }

    #[test]
    fn partial_documents_keep_defaults_for_missing_fields() {
        let config = SwitchboardConfig::from_toml_str(
            r#"
            [limits]
            processor_queue_capacity = 1024

            [tracing]
            filter = "switchboard=trace"
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.processor_queue_capacity, 1024);
        assert_eq!(config.tracing.filter, "switchboard=trace");
        assert_eq!(config.tracing.log_file, "switchboard.log");
        assert_eq!(config.timeouts, TimeoutConfig::default());
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(SwitchboardConfig::from_toml_str("[limits]\nprocessor_queue_capacity = \"lots\"").is_err());
    }
}
