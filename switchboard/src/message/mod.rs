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
//! Addressing, queue endpoints, envelopes and the built-in lifecycle commands.
//!
//! *   [`Address`]: the name of an endpoint within the process.
//! *   [`Endpoint`]: the sending half of a processor's input queue.
//! *   [`Mailbox`]: an address paired with an endpoint; the handle other components hold.
//! *   [`Envelope`]: a message wrapped with routing metadata for a transport crossing.
//! *   [`Start`] / [`Stop`]: lifecycle commands accepted by every component.
//! *   [`MessageError`]: why a send was rejected.

pub use address::Address;
pub use commands::{Start, Stop};
pub use endpoint::Endpoint;
pub use envelope::Envelope;
pub use mailbox::Mailbox;
pub use message_error::MessageError;

/// Defines [`Address`].
mod address;
/// Defines [`Start`] and [`Stop`].
mod commands;
/// Defines [`Endpoint`].
mod endpoint;
/// Defines [`Envelope`].
mod envelope;
/// Defines [`Mailbox`].
mod mailbox;
/// Defines [`MessageError`].
mod message_error;
