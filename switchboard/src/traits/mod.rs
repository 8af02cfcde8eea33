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
//! Core traits shared by every part of the messaging core.
//!
//! *   [`Message`]: implemented for every type that can be queued on an endpoint.
//! *   [`Identifiable`]: messages that carry an id which envelopes propagate.
//! *   [`Component`]: the lifecycle hooks of a managed component's model.

pub use component::Component;
pub use identifiable::Identifiable;
pub use message::Message;

/// Defines the [`Component`] trait.
mod component;
/// Defines the [`Identifiable`] trait.
mod identifiable;
/// Defines the [`Message`] marker trait.
mod message;
