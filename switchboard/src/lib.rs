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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Switchboard
//!
//! An actor-style messaging core for a trading platform backbone, built on Tokio.
//! Independently addressable components exchange messages through bounded queues and
//! handle them one at a time, strictly in arrival order.
//!
//! ## Key Concepts
//!
//! - **Addressing (`Address`, `Endpoint`, `Mailbox`)**: a component is reached through
//!   its mailbox, an address paired with the sending half of its input queue.
//! - **Message processors (`MessageProcessor`)**: one worker per queue dispatches each
//!   message to the handler registered for its type. Handler failures are recorded and
//!   passed to an exception handler that decides whether processing continues.
//! - **Components (`ManagedComponent`, `ComponentHandle`)**: processors with a
//!   `Start`/`Stop` lifecycle, an injected clock and id source, and a failure policy
//!   that survives input errors and fails on everything else.
//! - **Envelopes (`Envelope`, `Directory`)**: routing metadata for messages crossing a
//!   transport boundary. Receivers open them and re-queue the bare message.
//! - **Throttling (`Throttler`)**: a component that forwards one message type
//!   downstream at a bounded rate without reordering.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchboard::prelude::*;
//!
//! #[switchboard_message]
//! struct Fill {
//!     quantity: i64,
//! }
//!
//! #[derive(Default)]
//! struct Position {
//!     net: i64,
//! }
//!
//! impl Component for Position {}
//!
//! let mut position = ManagedComponent::new(
//!     Address::new("position")?,
//!     Componentry::default(),
//!     Position::default(),
//! );
//! position.mutate_on::<Fill, _>(|agent, fill| {
//!     agent.model.net += fill.quantity;
//!     Reply::ok()
//! })?;
//! let handle = position.start().await?;
//! handle.mailbox().send(Fill { quantity: 100 });
//! assert!(handle.stop(Duration::from_secs(1)).await);
//! ```

/// Configuration, clock and id services, and logging setup.
pub mod common;

/// Lifecycle-managed components.
pub mod component;

/// The process-local address book and envelope routing.
pub mod directory;

/// Error types.
pub mod error;

/// Addresses, endpoints, mailboxes, envelopes and lifecycle commands.
pub mod message;

/// The serial message execution engine.
pub mod processor;

/// The rate-limiting relay.
pub mod throttler;

/// Core traits.
pub mod traits;

/// A prelude module for conveniently importing the most commonly used items.
///
/// ## Macros (from `switchboard-macro`)
/// *   [`switchboard_macro::switchboard_message`]: attribute for message types.
///
/// ## External Crates
/// *   [`async_trait::async_trait`]: needed to implement [`Component`](crate::traits::Component).
///
/// ## Core Types
/// *   Addressing: [`Address`](crate::message::Address), [`Endpoint`](crate::message::Endpoint),
///     [`Mailbox`](crate::message::Mailbox), [`Envelope`](crate::message::Envelope),
///     [`Directory`](crate::directory::Directory).
/// *   Processing: [`MessageProcessor`](crate::processor::MessageProcessor),
///     [`ProcessorHandle`](crate::processor::ProcessorHandle), [`Reply`](crate::processor::Reply),
///     [`Directive`](crate::processor::Directive).
/// *   Components: [`ManagedComponent`](crate::component::ManagedComponent),
///     [`ComponentHandle`](crate::component::ComponentHandle), [`Agent`](crate::component::Agent),
///     [`ComponentContext`](crate::component::ComponentContext).
/// *   Throttling: [`Throttler`](crate::throttler::Throttler),
///     [`ThrottlerConfig`](crate::throttler::ThrottlerConfig).
pub mod prelude {
    // Macros from switchboard-macro
    pub use switchboard_macro::*;

    // External crate re-exports
    pub use async_trait::async_trait;

    // Core types
    pub use crate::common::{Componentry, SwitchboardConfig, CONFIG};
    pub use crate::component::{
        Agent, ComponentContext, ComponentHandle, ComponentState, ManagedComponent, Severity,
    };
    pub use crate::directory::Directory;
    pub use crate::error::{ComponentError, InputError, ProcessorError, ValidationError};
    pub use crate::message::{Address, Endpoint, Envelope, Mailbox, MessageError, Start, Stop};
    pub use crate::processor::{
        Directive, HandlerFuture, MessageProcessor, ProcessorHandle, ProcessorPhase, Reply,
    };
    pub use crate::throttler::{Throttler, ThrottlerConfig};
    pub use crate::traits::{Component, Identifiable, Message};
}
