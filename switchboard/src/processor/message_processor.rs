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

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{channel, Receiver};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info_span, trace, Instrument, Span};

use crate::common::CONFIG;
use crate::error::{HandlerPanic, ProcessorError, ValidationError};
use crate::message::Endpoint;
use crate::processor::handler_table::HandlerTable;
use crate::processor::{
    ExceptionRecord, HandlerFuture, ProcessorHandle, ProcessorPhase, ProcessorStats,
};
use crate::traits::Message;

/// What the processor does after an exception handler has seen a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Carry on with the next message.
    Resume,
    /// Fault the processor: stop the worker and abandon the remaining input.
    Escalate,
}

/// Called once per failing message. Replaces the default, which escalates.
pub type ExceptionCallback<S> = Box<dyn Fn(&mut S, &anyhow::Error) -> Directive + Send + Sync>;

/// Called with each message no handler accepts. Replaces the default, which records it
/// in [`ProcessorStats::unhandled`].
pub type UnhandledCallback<S> = Box<dyn Fn(&mut S, Box<dyn Message>) + Send + Sync>;

/// A serial execution engine for messages.
///
/// A processor owns one bounded input queue. Its single worker takes messages in the
/// order the queue accepted them and runs the handler registered for each message's
/// type against the processor's state `S`. Handlers never run concurrently, so `S`
/// needs no synchronisation of its own.
///
/// A `MessageProcessor` is the configuration phase: register handlers, hand out
/// [`endpoint`](Self::endpoint)s, then call [`start`](Self::start) to spawn the worker.
/// Messages sent before `start` wait in the queue.
///
/// ```ignore
/// let mut processor = MessageProcessor::<Vec<String>>::new("journal");
/// processor.register_handler::<String, _>(|lines, line| {
///     lines.push(line);
///     Reply::ok()
/// })?;
/// let handle = processor.start(Vec::new());
/// handle.endpoint().send("first".to_string());
/// assert!(handle.graceful_stop().await);
/// ```
pub struct MessageProcessor<S> {
    name: Arc<str>,
    handlers: HandlerTable<S>,
    on_exception: Option<ExceptionCallback<S>>,
    on_unhandled: Option<UnhandledCallback<S>>,
    endpoint: Endpoint,
    inbox: Receiver<Box<dyn Message>>,
    stats: Arc<ProcessorStats>,
    drain: CancellationToken,
    span: Option<Span>,
}

impl<S: Send + 'static> MessageProcessor<S> {
    /// Creates a processor whose queue holds `limits.processor_queue_capacity`
    /// messages (2^22 unless configured otherwise).
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        let capacity = CONFIG.limits.processor_queue_capacity.max(1);
        Self::build(name.as_ref(), capacity)
    }

    /// Creates a processor with an explicit queue capacity.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ZeroCapacity`] when `capacity` is zero.
    pub fn with_capacity(name: impl AsRef<str>, capacity: usize) -> Result<Self, ValidationError> {
        if capacity == 0 {
            return Err(ValidationError::ZeroCapacity);
        }
        Ok(Self::build(name.as_ref(), capacity))
    }

    fn build(name: &str, capacity: usize) -> Self {
        let (outbox, inbox) = channel(capacity);
        let stats = Arc::new(ProcessorStats::default());
        let endpoint = Endpoint::new(outbox, stats.input_counter());
        Self {
            name: Arc::from(name),
            handlers: HandlerTable::new(),
            on_exception: None,
            on_unhandled: None,
            endpoint,
            inbox,
            stats,
            drain: CancellationToken::new(),
            span: None,
        }
    }

    /// The endpoint feeding this processor. Usable before the processor is started.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Counters and diagnostics, shared with the eventual [`ProcessorHandle`].
    #[must_use]
    pub const fn stats(&self) -> &Arc<ProcessorStats> {
        &self.stats
    }

    /// Registered message type names in dispatch order, the fallback (`*`) last.
    #[must_use]
    pub fn registered_types(&self) -> Vec<&'static str> {
        self.handlers.registered_types()
    }

    /// Runs the worker inside `span` instead of a span named after the processor.
    pub fn set_span(&mut self, span: Span) -> &mut Self {
        self.span = Some(span);
        self
    }

    /// A token that, once cancelled, makes the running worker close its input and
    /// drain what was already accepted.
    pub(crate) fn drain_token(&self) -> CancellationToken {
        self.drain.clone()
    }

    /// Registers the handler for messages of type `M`.
    ///
    /// The handler receives the state and owns the message.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::DuplicateHandler`] when `M` already has a handler.
    pub fn register_handler<M, F>(&mut self, callback: F) -> Result<&mut Self, ProcessorError>
    where
        M: Message,
        F: for<'a> Fn(&'a mut S, M) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.insert::<M, F>(callback)?;
        Ok(self)
    }

    /// Registers the any-message fallback, consulted only when no typed handler
    /// matches.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::DuplicateFallback`] when a fallback is already registered.
    pub fn register_fallback<F>(&mut self, callback: F) -> Result<&mut Self, ProcessorError>
    where
        F: for<'a> Fn(&'a mut S, Box<dyn Message>) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        self.handlers.insert_fallback(callback)?;
        Ok(self)
    }

    /// Replaces the exception handler.
    ///
    /// It is called exactly once for every message whose handler returns an error or
    /// panics, after the failure has been recorded. If the callback itself panics, the
    /// failure escalates.
    pub fn register_exception_handler<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut S, &anyhow::Error) -> Directive + Send + Sync + 'static,
    {
        self.on_exception = Some(Box::new(callback));
        self
    }

    /// Replaces the unhandled-message callback.
    ///
    /// A panic in the callback is treated as a failure of that message and goes to the
    /// exception handler.
    pub fn register_unhandled<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut S, Box<dyn Message>) + Send + Sync + 'static,
    {
        self.on_unhandled = Some(Box::new(callback));
        self
    }

    /// Spawns the worker onto the current Tokio runtime and returns its handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self, state: S) -> ProcessorHandle {
        let span = self
            .span
            .unwrap_or_else(|| info_span!("processor", name = %self.name));
        let (phase_tx, phase_rx) = watch::channel(ProcessorPhase::Idle);
        let kill = CancellationToken::new();
        let tracker = TaskTracker::new();

        let worker = Worker {
            name: Arc::clone(&self.name),
            state,
            handlers: self.handlers,
            on_exception: self.on_exception,
            on_unhandled: self.on_unhandled,
            inbox: self.inbox,
            stats: Arc::clone(&self.stats),
            phase: phase_tx,
        };

        debug!(processor = %self.name, handlers = ?worker.handlers, "Starting processor");
        tracker.spawn(worker.run(self.drain.clone(), kill.clone()).instrument(span));
        tracker.close();

        ProcessorHandle::new(
            self.name,
            self.endpoint,
            self.stats,
            phase_rx,
            self.drain,
            kill,
            tracker,
        )
    }
}

impl<S> fmt::Debug for MessageProcessor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageProcessor")
            .field("name", &self.name)
            .field("handlers", &self.handlers)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

enum Flow {
    Continue,
    Escalate,
}

struct Worker<S> {
    name: Arc<str>,
    state: S,
    handlers: HandlerTable<S>,
    on_exception: Option<ExceptionCallback<S>>,
    on_unhandled: Option<UnhandledCallback<S>>,
    inbox: Receiver<Box<dyn Message>>,
    stats: Arc<ProcessorStats>,
    phase: watch::Sender<ProcessorPhase>,
}

impl<S: Send + 'static> Worker<S> {
    async fn run(mut self, drain: CancellationToken, kill: CancellationToken) {
        self.phase.send_replace(ProcessorPhase::Running);
        trace!("Worker running");

        let mut draining = false;
        let outcome = loop {
            tokio::select! {
                biased;

                () = kill.cancelled() => break ProcessorPhase::Cancelled,

                () = drain.cancelled(), if !draining => {
                    draining = true;
                    self.inbox.close();
                    self.phase.send_replace(ProcessorPhase::Draining);
                    trace!(remaining = self.inbox.len(), "Input closed, draining");
                }

                incoming = self.inbox.recv() => {
                    let Some(message) = incoming else {
                        break ProcessorPhase::Completed;
                    };
                    let flow = tokio::select! {
                        biased;
                        () = kill.cancelled() => None,
                        flow = self.dispatch(message) => Some(flow),
                    };
                    match flow {
                        Some(Flow::Continue) => {}
                        Some(Flow::Escalate) => break ProcessorPhase::Faulted,
                        None => break ProcessorPhase::Cancelled,
                    }
                }
            }
        };

        if outcome != ProcessorPhase::Completed {
            self.inbox.close();
            let abandoned = self.inbox.len();
            if abandoned > 0 {
                debug!(abandoned, %outcome, "Abandoning queued messages");
            }
        }
        trace!(
            processed = self.stats.processed_count(),
            %outcome,
            "Worker exiting"
        );
        self.phase.send_replace(outcome);
    }

    async fn dispatch(&mut self, message: Box<dyn Message>) -> Flow {
        let message_type = (*message).type_name();
        let type_id = (*message).as_any().type_id();

        let Some(handler) = self.handlers.lookup(type_id) else {
            trace!(message_type, "No handler registered");
            let outcome = match &self.on_unhandled {
                Some(callback) => {
                    let state = &mut self.state;
                    panic::catch_unwind(AssertUnwindSafe(|| callback(state, message)))
                }
                None => {
                    self.stats.record_unhandled(message);
                    Ok(())
                }
            };
            self.stats.record_processed();
            // A panicking unhandled callback fails the message like a panicking handler.
            return match outcome {
                Ok(()) => Flow::Continue,
                Err(payload) => {
                    let error = anyhow::Error::new(HandlerPanic::from_payload(&*payload));
                    self.on_failure(message_type, error)
                }
            };
        };

        trace!(message_type, "Dispatching");
        let state = &mut self.state;
        let outcome = AssertUnwindSafe(async move { handler.call(state, message).await })
            .catch_unwind()
            .await;
        let result = outcome.unwrap_or_else(|payload: Box<dyn Any + Send>| {
            Err(anyhow::Error::new(HandlerPanic::from_payload(&*payload)))
        });
        self.stats.record_processed();

        match result {
            Ok(()) => Flow::Continue,
            Err(error) => self.on_failure(message_type, error),
        }
    }

    fn on_failure(&mut self, message_type: &'static str, error: anyhow::Error) -> Flow {
        let error = Arc::new(error);
        self.stats
            .record_exception(ExceptionRecord::new(message_type, Arc::clone(&error)));

        let directive = match &self.on_exception {
            Some(callback) => {
                let state = &mut self.state;
                panic::catch_unwind(AssertUnwindSafe(|| callback(state, &*error))).unwrap_or_else(
                    |payload| {
                        let panic = HandlerPanic::from_payload(&*payload);
                        error!(message_type, %panic, "Exception handler panicked, escalating");
                        Directive::Escalate
                    },
                )
            }
            None => Directive::Escalate,
        };

        match directive {
            Directive::Resume => {
                trace!(message_type, error = %format!("{error:#}"), "Handler failure resumed");
                Flow::Continue
            }
            Directive::Escalate => {
                error!(
                    processor = %self.name,
                    message_type,
                    error = %format!("{error:#}"),
                    "Handler failure escalated, processor faulted"
                );
                Flow::Escalate
            }
        }
    }
}
