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

use std::fmt;

use tracing::{error, info_span, trace, warn};

use crate::common::Componentry;
use crate::component::{Agent, ComponentContext, ComponentHandle, ComponentState, Severity};
use crate::error::{ComponentError, ProcessorError, ValidationError};
use crate::message::{Address, Envelope, Mailbox, Start, Stop};
use crate::processor::{Directive, HandlerFuture, MessageProcessor, Reply};
use crate::traits::{Component, Message};

/// A component being assembled: its model, context and not-yet-started processor.
///
/// `Start` and `Stop` handlers and the component exception policy are installed on
/// construction. Add the component's own handlers with [`mutate_on`](Self::mutate_on)
/// and friends, then [`start`](Self::start) it.
pub struct ManagedComponent<C: Component> {
    model: C,
    ctx: ComponentContext,
    processor: MessageProcessor<Agent<C>>,
}

impl<C: Component> ManagedComponent<C> {
    /// Assembles a component with the configured queue capacity.
    #[must_use]
    pub fn new(address: Address, componentry: Componentry, model: C) -> Self {
        let processor = MessageProcessor::new(address.as_str());
        Self::assemble(address, componentry, model, processor)
    }

    /// Assembles a component whose queue holds `capacity` messages.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ZeroCapacity`] when `capacity` is zero.
    pub fn with_capacity(
        address: Address,
        componentry: Componentry,
        model: C,
        capacity: usize,
    ) -> Result<Self, ValidationError> {
        let processor = MessageProcessor::with_capacity(address.as_str(), capacity)?;
        Ok(Self::assemble(address, componentry, model, processor))
    }

    fn assemble(
        address: Address,
        componentry: Componentry,
        model: C,
        mut processor: MessageProcessor<Agent<C>>,
    ) -> Self {
        let span = info_span!("component", name = %address);
        processor.set_span(span.clone());
        let mailbox = Mailbox::new(address, processor.endpoint().clone());
        let ctx = ComponentContext::new(mailbox, componentry, span, processor.drain_token());

        let lifecycle = processor
            .register_handler::<Start, _>(handle_start::<C>)
            .and_then(|processor| processor.register_handler::<Stop, _>(handle_stop::<C>));
        debug_assert!(lifecycle.is_ok(), "a fresh processor has no handlers");
        processor.register_exception_handler(apply_exception_policy::<C>);

        Self {
            model,
            ctx,
            processor,
        }
    }

    /// The component's mailbox. Messages sent before the component starts are queued.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        self.ctx.mailbox()
    }

    /// The component's context.
    #[must_use]
    pub const fn context(&self) -> &ComponentContext {
        &self.ctx
    }

    /// Registers the handler for messages of type `M`.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::DuplicateHandler`] when `M` already has a handler, including
    /// `Start` and `Stop`.
    pub fn mutate_on<M, F>(&mut self, callback: F) -> Result<&mut Self, ProcessorError>
    where
        M: Message,
        F: for<'a> Fn(&'a mut Agent<C>, M) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        self.processor.register_handler::<M, F>(callback)?;
        Ok(self)
    }

    /// Registers the any-message fallback.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::DuplicateFallback`] when one is already registered.
    pub fn mutate_on_any<F>(&mut self, callback: F) -> Result<&mut Self, ProcessorError>
    where
        F: for<'a> Fn(&'a mut Agent<C>, Box<dyn Message>) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.processor.register_fallback(callback)?;
        Ok(self)
    }

    /// Replaces the default unhandled-message recording.
    pub fn on_unhandled<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Agent<C>, Box<dyn Message>) + Send + Sync + 'static,
    {
        self.processor.register_unhandled(callback);
        self
    }

    /// Accepts `Envelope<T>`: each envelope is opened and its message re-queued on
    /// this component's endpoint, where the handler for `T` picks it up.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::DuplicateHandler`] when `Envelope<T>` is already handled.
    pub fn open_envelopes<T>(&mut self) -> Result<&mut Self, ProcessorError>
    where
        T: Message + Clone,
    {
        self.processor
            .register_handler::<Envelope<T>, _>(open_envelope::<C, T>)?;
        Ok(self)
    }

    /// Spawns the worker without sending `Start`. The component stays `Initialized`
    /// until [`ComponentHandle::start`] is called.
    #[must_use]
    pub fn spawn(self) -> ComponentHandle {
        let agent = Agent::new(self.model, self.ctx.clone());
        let processor = self.processor.start(agent);
        ComponentHandle::new(self.ctx, processor)
    }

    /// Spawns the worker and starts the component.
    ///
    /// # Errors
    ///
    /// See [`ComponentHandle::start`].
    pub async fn start(self) -> Result<ComponentHandle, ComponentError> {
        let handle = self.spawn();
        handle.start().await?;
        Ok(handle)
    }
}

impl<C: Component> fmt::Debug for ManagedComponent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedComponent")
            .field("name", &self.ctx.name())
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}

fn handle_start<C: Component>(agent: &mut Agent<C>, command: Start) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Agent { model, ctx } = agent;
        let state = ctx.state();
        if state != ComponentState::Initialized {
            warn!(%state, "Start ignored, component is not Initialized");
            return Ok(());
        }
        if let Err(error) = model.on_start(ctx, &command).await {
            ctx.transition(ComponentState::Failed);
            return Err(error.context(format!("`{}` failed to start", ctx.name())));
        }
        ctx.transition(ComponentState::Running);
        Ok(())
    })
}

fn handle_stop<C: Component>(agent: &mut Agent<C>, command: Stop) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Agent { model, ctx } = agent;
        let state = ctx.state();
        if state != ComponentState::Running {
            warn!(%state, "Stop received while not Running, stopping anyway");
        }
        let outcome = model.on_stop(ctx, &command).await;
        ctx.transition(ComponentState::Stopped);
        ctx.close_input();
        outcome.map_err(|error| error.context(format!("`{}` failed to stop cleanly", ctx.name())))
    })
}

fn open_envelope<C: Component, T: Message + Clone>(
    agent: &mut Agent<C>,
    envelope: Envelope<T>,
) -> HandlerFuture<'_> {
    trace!(
        sender = ?envelope.sender(),
        timestamp = %envelope.timestamp(),
        message_type = std::any::type_name::<T>(),
        "Envelope received"
    );
    match agent.ctx.endpoint().try_send(envelope.open()) {
        Ok(()) => Reply::ok(),
        Err(error) => Reply::err(error),
    }
}

fn apply_exception_policy<C: Component>(agent: &mut Agent<C>, error: &anyhow::Error) -> Directive {
    let severity = if agent.ctx.state() == ComponentState::Failed {
        Severity::Fatal
    } else {
        agent.model.severity(error)
    };
    match severity {
        Severity::Recoverable => {
            error!(
                component = %agent.ctx.name(),
                error = %format!("{error:#}"),
                "Handler failed, continuing"
            );
            Directive::Resume
        }
        Severity::Fatal => {
            error!(
                critical = true,
                component = %agent.ctx.name(),
                error = %format!("{error:#}"),
                "Unrecoverable handler failure, component failed"
            );
            agent.ctx.transition(ComponentState::Failed);
            Directive::Escalate
        }
    }
}
