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

//! Configuration files and logging setup.

use std::io::Write;
use std::time::Duration;

use switchboard::common::config::{LimitsConfig, ThrottlingConfig};
use switchboard::common::{init_tracing, SwitchboardConfig, TracingConfig};
use switchboard::prelude::*;

#[test]
fn test_load_from_reads_partial_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[limits]
processor_queue_capacity = 64

[throttling]
interval_ms = 250
limit = 4
"#
    )?;

    let config = SwitchboardConfig::load_from(file.path());
    assert_eq!(
        config.limits,
        LimitsConfig {
            processor_queue_capacity: 64
        }
    );
    assert_eq!(
        config.throttling,
        ThrottlingConfig {
            interval_ms: 250,
            limit: 4
        }
    );
    // Sections left out keep their defaults.
    assert_eq!(config.start_timeout(), Duration::from_secs(5));
    assert_eq!(config.stop_timeout(), Duration::from_secs(10));
    assert_eq!(config.tracing, TracingConfig::default());

    let throttle = ThrottlerConfig::from_settings(&config.throttling)?;
    assert_eq!(throttle.interval(), Duration::from_millis(250));
    assert_eq!(throttle.limit(), 4);
    Ok(())
}

#[test]
fn test_missing_file_falls_back_to_defaults() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let config = SwitchboardConfig::load_from(&directory.path().join("absent.toml"));
    assert_eq!(config, SwitchboardConfig::default());
    Ok(())
}

#[test]
fn test_malformed_file_falls_back_to_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[limits\nprocessor_queue_capacity = \"lots\"")?;
    assert_eq!(
        SwitchboardConfig::load_from(file.path()),
        SwitchboardConfig::default()
    );
    assert!(SwitchboardConfig::from_toml_str("[timeouts]\ncomponent_start_ms = -1").is_err());
    Ok(())
}

#[test]
fn test_invalid_throttling_settings_are_rejected() {
    let settings = ThrottlingConfig {
        interval_ms: 0,
        limit: 10,
    };
    assert_eq!(
        ThrottlerConfig::from_settings(&settings).err(),
        Some(ValidationError::ZeroInterval)
    );
}

/// Only the first subscriber in a process is installed; later calls get no guard.
#[test]
fn test_init_tracing_installs_once() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let settings = TracingConfig {
        log_directory: directory.path().display().to_string(),
        log_file: "switchboard.log".to_string(),
        filter: "debug".to_string(),
    };

    let first = init_tracing(&settings);
    let second = init_tracing(&settings);
    assert!(first.is_some());
    assert!(second.is_none());

    tracing::info!("tracing installed");
    drop(first);
    assert!(directory.path().join("switchboard.log").exists());
    Ok(())
}
