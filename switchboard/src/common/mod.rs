//! Configuration, injected componentry and logging setup shared across the crate.
//!
//! *   [`SwitchboardConfig`] / [`CONFIG`]: settings loaded once from the XDG config directory.
//! *   [`Componentry`]: the clock and id source handed to every component.
//! *   [`init_tracing`]: installs the file-backed `tracing` subscriber.

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

pub use componentry::{Clock, Componentry, IdProvider, ManualClock, SystemClock, UuidProvider};
pub use config::{
    LimitsConfig, SwitchboardConfig, ThrottlingConfig, TimeoutConfig, TracingConfig, CONFIG,
};
pub use logging::init_tracing;

/// Clock and id services.
mod componentry;
/// Settings and the global [`CONFIG`].
pub mod config;
/// Subscriber installation.
mod logging;
