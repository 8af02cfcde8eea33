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

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Span};
use uuid::Uuid;

use crate::common::Componentry;
use crate::component::ComponentState;
use crate::error::ValidationError;
use crate::message::{Address, Endpoint, Envelope, Mailbox};
use crate::traits::{Identifiable, Message};

/// Everything a component knows about itself besides its model.
///
/// Cloned into the component's handle; the worker and the handle observe the same
/// lifecycle state.
#[derive(Clone, Debug)]
pub struct ComponentContext {
    mailbox: Mailbox,
    componentry: Componentry,
    span: Span,
    state: Arc<watch::Sender<ComponentState>>,
    drain: CancellationToken,
}

impl ComponentContext {
    pub(crate) fn new(
        mailbox: Mailbox,
        componentry: Componentry,
        span: Span,
        drain: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(ComponentState::Initialized);
        Self {
            mailbox,
            componentry,
            span,
            state: Arc::new(state),
            drain,
        }
    }

    /// The component's name (its address).
    #[must_use]
    pub fn name(&self) -> &str {
        self.mailbox.address().as_str()
    }

    /// The component's address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        self.mailbox.address()
    }

    /// The component's own mailbox.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// The component's own endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        self.mailbox.endpoint()
    }

    /// The injected clock and id source.
    #[must_use]
    pub const fn componentry(&self) -> &Componentry {
        &self.componentry
    }

    /// The span every log line of this component is recorded in.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Current time from the injected clock.
    #[must_use]
    pub fn time_now(&self) -> DateTime<Utc> {
        self.componentry.time_now()
    }

    /// A fresh id from the injected id source.
    #[must_use]
    pub fn new_id(&self) -> Uuid {
        self.componentry.new_id()
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ComponentState {
        *self.state.borrow()
    }

    /// A receiver that observes every lifecycle change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ComponentState> {
        self.state.subscribe()
    }

    /// Queues `message` on this component's own endpoint, behind everything already
    /// queued.
    pub fn send_to_self(&self, message: impl Message) {
        self.mailbox.send(message);
    }

    /// Wraps `message` in an envelope sent from this component, stamped with the
    /// injected clock.
    ///
    /// # Errors
    ///
    /// [`ValidationError::DefaultTimestamp`] when the clock reports the epoch.
    pub fn envelope<T: Identifiable>(
        &self,
        message: T,
        receiver: Option<Address>,
    ) -> Result<Envelope<T>, ValidationError> {
        Envelope::new(
            message,
            receiver,
            Some(self.address().clone()),
            self.time_now(),
        )
    }

    /// Moves to `to` unless the current state is already final. Returns whether the
    /// state changed.
    pub(crate) fn transition(&self, to: ComponentState) -> bool {
        let mut from = None;
        let changed = self.state.send_if_modified(|current| {
            if current.is_terminal() || *current == to {
                return false;
            }
            from = Some(*current);
            *current = to;
            true
        });
        if let Some(from) = from {
            debug!(component = %self.name(), %from, %to, "State changed");
        }
        changed
    }

    /// Closes the component's input; queued messages are still processed.
    pub(crate) fn close_input(&self) {
        self.drain.cancel();
    }
}

/// The state a component's handlers run against: the user's model plus its context.
#[derive(Debug)]
pub struct Agent<C> {
    /// The user-defined component model.
    pub model: C,
    pub(crate) ctx: ComponentContext,
}

impl<C> Agent<C> {
    pub(crate) const fn new(model: C, ctx: ComponentContext) -> Self {
        Self { model, ctx }
    }

    /// The component's context.
    #[must_use]
    pub const fn ctx(&self) -> &ComponentContext {
        &self.ctx
    }

    /// Shorthand for `self.ctx().state()`.
    #[must_use]
    pub fn state(&self) -> ComponentState {
        self.ctx.state()
    }
}
