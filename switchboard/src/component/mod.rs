//! Lifecycle-managed components built on a [`MessageProcessor`](crate::processor::MessageProcessor).
//!
//! *   [`ManagedComponent`]: assembles a component from a [`Component`](crate::traits::Component)
//!     model, installing the `Start`/`Stop` handlers and the exception policy.
//! *   [`ComponentHandle`]: `start`, `stop` and `kill` a spawned component.
//! *   [`ComponentContext`] / [`Agent`]: what handlers see besides the message.
//! *   [`ComponentState`]: `Initialized`, `Running`, `Stopped`, `Failed`.
//! *   [`classify`] / [`Severity`]: which handler failures a component survives.

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

pub use component_handle::ComponentHandle;
pub use context::{Agent, ComponentContext};
pub use fault::{classify, Severity};
pub use managed_component::ManagedComponent;
pub use state::ComponentState;

/// Defines [`ComponentHandle`].
mod component_handle;
/// Defines [`ComponentContext`] and [`Agent`].
mod context;
/// Handler failure classification.
mod fault;
/// Defines [`ManagedComponent`].
mod managed_component;
/// Defines [`ComponentState`].
mod state;
