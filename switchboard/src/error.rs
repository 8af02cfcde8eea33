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
//! Error types raised by construction, registration and lifecycle operations.
//!
//! Send failures live in [`MessageError`](crate::message::MessageError); handler
//! failures travel as `anyhow::Error` and are classified by
//! [`classify`](crate::component::classify).

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

use crate::component::ComponentState;
use crate::message::MessageError;

/// A constructor argument was rejected. Raised at construction, never at use time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An [`Address`](crate::message::Address) was created from an empty name.
    #[error("address name cannot be empty")]
    EmptyAddress,
    /// An envelope was stamped with the default (epoch) timestamp.
    #[error("envelope timestamp cannot be the default value")]
    DefaultTimestamp,
    /// A throttler limit of zero.
    #[error("throttle limit must be greater than zero")]
    ZeroLimit,
    /// A throttler interval of zero.
    #[error("throttle interval must be greater than zero")]
    ZeroInterval,
    /// A processor queue capacity of zero.
    #[error("queue capacity must be greater than zero")]
    ZeroCapacity,
}

/// Handler registration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    /// A handler for this message type is already registered.
    #[error("a handler for message type `{type_name}` is already registered")]
    DuplicateHandler {
        /// Rust type name of the message.
        type_name: &'static str,
    },
    /// The any-message fallback handler is already registered.
    #[error("the fallback handler is already registered")]
    DuplicateFallback,
}

/// A lifecycle operation on a component did not complete.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A lifecycle command could not be delivered to the component's own endpoint.
    #[error("could not deliver {command} to `{component}`: {source}")]
    Delivery {
        /// Component name.
        component: String,
        /// The lifecycle command being sent.
        command: &'static str,
        /// Underlying send failure.
        #[source]
        source: MessageError,
    },
    /// The component did not reach `Running`.
    #[error("`{component}` did not start, state is {state}")]
    StartFailed {
        /// Component name.
        component: String,
        /// State observed instead of `Running`.
        state: ComponentState,
    },
    /// `start` did not observe `Running` within the allotted time.
    #[error("`{component}` did not start within {timeout:?}")]
    StartTimeout {
        /// Component name.
        component: String,
        /// The elapsed budget.
        timeout: Duration,
    },
    /// The processor worker exited before the component reached `Running`.
    #[error("`{component}` worker has terminated")]
    Terminated {
        /// Component name.
        component: String,
    },
    /// A handler could not be registered while assembling the component.
    #[error(transparent)]
    Registration(#[from] ProcessorError),
}

/// A handler rejected its input. Always treated as recoverable: the component logs
/// it and moves on to the next message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// An argument was outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A value the handler needs was absent.
    #[error("missing value: {0}")]
    MissingValue(String),
}

/// A handler panicked while processing a message.
///
/// The processor catches the unwind and reports it through the exception path like
/// any other handler error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler panicked: {message}")]
pub struct HandlerPanic {
    message: String,
}

impl HandlerPanic {
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "no panic message".to_string());
        Self { message }
    }

    /// The panic payload rendered as text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
