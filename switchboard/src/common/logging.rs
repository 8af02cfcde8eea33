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
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::common::config::TracingConfig;

/// Installs a global `tracing` subscriber that writes to a file.
///
/// The filter comes from `RUST_LOG` when set, otherwise from `config.filter`. Output
/// goes through a non-blocking appender; keep the returned guard alive for as long as
/// logs should be flushed. Returns `None` when a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Option<WorkerGuard> {
    let file_appender =
        RollingFileAppender::new(Rotation::NEVER, &config.log_directory, &config.log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_span_events(FmtSpan::NONE)
        .with_max_level(Level::TRACE)
        .compact()
        .with_line_number(true)
        .with_target(true)
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .ok()
        .map(|()| guard)
}
