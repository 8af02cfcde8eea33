//! The serial message execution engine.
//!
//! *   [`MessageProcessor`]: configuration phase; registers handlers and owns the queue.
//! *   [`ProcessorHandle`]: control of the running worker (`graceful_stop`, `kill`).
//! *   [`ProcessorStats`]: counters, caught exceptions and unhandled messages.
//! *   [`Reply`]: constructors for [`HandlerFuture`]s.

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

pub use handler_table::HandlerFuture;
pub use message_processor::{Directive, ExceptionCallback, MessageProcessor, UnhandledCallback};
pub use processor_handle::{ProcessorHandle, ProcessorPhase};
pub use reply::Reply;
pub use stats::{ExceptionRecord, ProcessorStats};

/// Typed handler registrations.
mod handler_table;
/// Defines [`MessageProcessor`] and its worker.
mod message_processor;
/// Defines [`ProcessorHandle`].
mod processor_handle;
/// Defines [`Reply`].
mod reply;
/// Defines [`ProcessorStats`].
mod stats;
