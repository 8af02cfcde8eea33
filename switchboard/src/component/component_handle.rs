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
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, instrument, trace, warn};

use crate::common::CONFIG;
use crate::component::{ComponentContext, ComponentState};
use crate::error::ComponentError;
use crate::message::{Address, Mailbox, Start, Stop};
use crate::processor::{ProcessorHandle, ProcessorStats};

/// External control of a spawned component.
///
/// Cheap to clone. Lifecycle commands go through the component's own queue, so they are
/// ordered with every other message sent to it.
#[derive(Clone, Debug)]
pub struct ComponentHandle {
    ctx: ComponentContext,
    processor: ProcessorHandle,
}

impl ComponentHandle {
    pub(crate) const fn new(ctx: ComponentContext, processor: ProcessorHandle) -> Self {
        Self { ctx, processor }
    }

    /// The component's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// The component's address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        self.ctx.address()
    }

    /// The component's mailbox.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        self.ctx.mailbox()
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ComponentState {
        self.ctx.state()
    }

    /// A receiver that observes every lifecycle change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ComponentState> {
        self.ctx.watch_state()
    }

    /// The underlying processor's counters and diagnostics.
    #[must_use]
    pub const fn stats(&self) -> &Arc<ProcessorStats> {
        self.processor.stats()
    }

    /// The underlying processor.
    #[must_use]
    pub const fn processor(&self) -> &ProcessorHandle {
        &self.processor
    }

    /// Sends `Start` and waits until the component is `Running`, using the configured
    /// start timeout.
    ///
    /// # Errors
    ///
    /// See [`start_within`](Self::start_within).
    pub async fn start(&self) -> Result<(), ComponentError> {
        self.start_within(CONFIG.start_timeout()).await
    }

    /// Sends `Start` and waits until the component is `Running`.
    ///
    /// Returns as soon as the `Start` handler has run, without polling. Calling it on a
    /// running component is harmless: the extra `Start` is ignored with a warning.
    ///
    /// # Errors
    ///
    /// *   [`ComponentError::StartFailed`] if the component is or becomes `Stopped` or
    ///     `Failed` instead.
    /// *   [`ComponentError::StartTimeout`] if `Running` is not observed within `timeout`.
    /// *   [`ComponentError::Delivery`] if `Start` cannot be queued.
    /// *   [`ComponentError::Terminated`] if the worker exits before `Start` is handled.
    #[instrument(skip(self), fields(component = %self.name()))]
    pub async fn start_within(&self, timeout: Duration) -> Result<(), ComponentError> {
        let state = self.state();
        if state.is_terminal() {
            return Err(ComponentError::StartFailed {
                component: self.name().to_string(),
                state,
            });
        }

        let command = Start::new(self.ctx.new_id(), self.ctx.time_now());
        self.mailbox()
            .send_async(command)
            .await
            .map_err(|source| ComponentError::Delivery {
                component: self.name().to_string(),
                command: "Start",
                source,
            })?;

        let mut states = self.watch_state();
        let started = async {
            states
                .wait_for(|state| *state != ComponentState::Initialized)
                .await
                .map(|state| *state)
        };

        let observed = tokio::select! {
            biased;
            outcome = tokio::time::timeout(timeout, started) => match outcome {
                Ok(Ok(state)) => state,
                Ok(Err(_)) => return Err(self.terminated()),
                Err(_) => {
                    return Err(ComponentError::StartTimeout {
                        component: self.name().to_string(),
                        timeout,
                    })
                }
            },
            _ = self.processor.wait() => match self.state() {
                ComponentState::Initialized => return Err(self.terminated()),
                state => state,
            },
        };

        if observed == ComponentState::Running {
            trace!("Component running");
            Ok(())
        } else {
            Err(ComponentError::StartFailed {
                component: self.name().to_string(),
                state: observed,
            })
        }
    }

    /// Sends `Stop`, then waits up to `timeout` for the component to finish every message
    /// it had accepted.
    ///
    /// Returns whether the component ended `Stopped`; `false` on timeout or when it
    /// failed instead.
    #[instrument(skip(self), fields(component = %self.name()))]
    pub async fn stop(&self, timeout: Duration) -> bool {
        let command = Stop::new(self.ctx.new_id(), self.ctx.time_now());
        if let Err(error) = self.mailbox().send_async(command).await {
            debug!(%error, "Stop not delivered, input already closed");
        }
        // The Stop handler closes the input; everything accepted before that still runs.
        match tokio::time::timeout(timeout, self.processor.wait()).await {
            Ok(phase) => {
                let state = self.state();
                trace!(%state, %phase, "Worker exited");
                state == ComponentState::Stopped
            }
            Err(_) => {
                warn!(?timeout, "Component did not stop in time");
                false
            }
        }
    }

    /// [`stop`](Self::stop) with the configured stop timeout.
    pub async fn shutdown(&self) -> bool {
        self.stop(CONFIG.stop_timeout()).await
    }

    /// Marks the component `Failed` and cancels its worker immediately. Queued messages
    /// are abandoned. A component that already stopped keeps its `Stopped` state.
    pub fn kill(&self) {
        if self.ctx.transition(ComponentState::Failed) {
            warn!(component = %self.name(), "Component killed");
        }
        self.processor.kill();
    }

    fn terminated(&self) -> ComponentError {
        ComponentError::Terminated {
            component: self.name().to_string(),
        }
    }
}
