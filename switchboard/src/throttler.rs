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

//! A rate-limiting relay for one message type.
//!
//! A [`Throttler<T>`] is a component that accepts `T` (bare or in an
//! [`Envelope`](crate::message::Envelope)) and
//! forwards it to a downstream [`Endpoint`], at most `limit` messages per `interval`,
//! in arrival order. Messages beyond the allowance wait in a buffer until the next
//! tick, and so do messages the downstream queue has no room for. Messages still
//! buffered when the throttler stops are handed back by [`Throttler::stop`].
//!
//! ```ignore
//! let config = ThrottlerConfig::new(Duration::from_secs(1), 50)?;
//! let throttler = Throttler::<NewOrder>::start(
//!     Address::new("order-throttle")?,
//!     exchange_gateway.endpoint().clone(),
//!     config,
//!     Componentry::default(),
//! )
//! .await?;
//! throttler.send(order);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::common::{Componentry, ThrottlingConfig, CONFIG};
use crate::component::{Agent, ComponentContext, ComponentHandle, ManagedComponent};
use crate::error::{ComponentError, ValidationError};
use crate::message::{Address, Endpoint, Mailbox, MessageError, Start, Stop};
use crate::processor::{HandlerFuture, Reply};
use crate::traits::{Component, Message};

/// Rate and buffering parameters of a [`Throttler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlerConfig {
    interval: Duration,
    limit: u32,
    buffer_capacity: Option<NonZeroUsize>,
}

impl ThrottlerConfig {
    /// At most `limit` messages per `interval`, with an unbounded buffer.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ZeroLimit`] or [`ValidationError::ZeroInterval`].
    pub fn new(interval: Duration, limit: u32) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::ZeroLimit);
        }
        if interval.is_zero() {
            return Err(ValidationError::ZeroInterval);
        }
        Ok(Self {
            interval,
            limit,
            buffer_capacity: None,
        })
    }

    /// Builds a config from the `[throttling]` settings.
    ///
    /// # Errors
    ///
    /// As for [`ThrottlerConfig::new`].
    pub fn from_settings(settings: &ThrottlingConfig) -> Result<Self, ValidationError> {
        Self::new(Duration::from_millis(settings.interval_ms), settings.limit)
    }

    /// Bounds the buffer. Messages arriving while it is full are rejected and counted.
    #[must_use]
    pub const fn with_buffer_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Length of one interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Messages released per interval.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Buffer bound, if any.
    #[must_use]
    pub const fn buffer_capacity(&self) -> Option<NonZeroUsize> {
        self.buffer_capacity
    }
}

impl Default for ThrottlerConfig {
    /// The configured `[throttling]` defaults, or one message per second if those are
    /// invalid.
    fn default() -> Self {
        Self::from_settings(&CONFIG.throttling).unwrap_or(Self {
            interval: Duration::from_secs(1),
            limit: 1,
            buffer_capacity: None,
        })
    }
}

/// Live counters of a [`Throttler`].
#[derive(Debug, Default)]
pub struct ThrottlerStats {
    total_count: AtomicU64,
    forwarded_count: AtomicU64,
    rejected_count: AtomicU64,
    dropped_count: AtomicU64,
    buffered: AtomicUsize,
    active: AtomicBool,
}

impl ThrottlerStats {
    /// Messages received over the throttler's lifetime.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Messages handed to the downstream endpoint.
    #[must_use]
    pub fn forwarded_count(&self) -> u64 {
        self.forwarded_count.load(Ordering::Relaxed)
    }

    /// Messages turned away because the buffer was full.
    #[must_use]
    pub fn rejected_count(&self) -> u64 {
        self.rejected_count.load(Ordering::Relaxed)
    }

    /// Messages lost because the downstream endpoint was closed.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Messages waiting for the next tick.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffered.load(Ordering::Relaxed)
    }

    /// `true` while the interval timer is armed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// Interval boundary, sent by the throttler's timer to itself.
#[derive(Debug, Clone, Copy)]
struct Tick;

/// The throttler's component model.
struct ThrottleModel<T> {
    downstream: Endpoint,
    config: ThrottlerConfig,
    buffer: VecDeque<T>,
    vouchers: u32,
    active: bool,
    timer: Option<JoinHandle<()>>,
    stats: Arc<ThrottlerStats>,
    unsent: Arc<Mutex<Vec<T>>>,
}

impl<T: Message> ThrottleModel<T> {
    fn new(
        downstream: Endpoint,
        config: ThrottlerConfig,
        stats: Arc<ThrottlerStats>,
        unsent: Arc<Mutex<Vec<T>>>,
    ) -> Self {
        Self {
            downstream,
            config,
            buffer: VecDeque::new(),
            vouchers: config.limit,
            active: false,
            timer: None,
            stats,
            unsent,
        }
    }

    fn accept(&mut self, message: T, ctx: &ComponentContext) {
        self.stats.total_count.fetch_add(1, Ordering::Relaxed);
        if let Some(capacity) = self.config.buffer_capacity {
            if self.buffer.len() >= capacity.get() {
                warn!(
                    capacity = capacity.get(),
                    message_type = std::any::type_name::<T>(),
                    "Throttle buffer full, message rejected"
                );
                self.stats.rejected_count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        self.buffer.push_back(message);
        self.release();
        if !self.active {
            self.set_active(true);
            self.arm(ctx);
        }
    }

    fn tick(&mut self, ctx: &ComponentContext) {
        self.vouchers = self.config.limit;
        if self.buffer.is_empty() {
            trace!("Throttle idle");
            self.timer = None;
            self.set_active(false);
            return;
        }
        self.release();
        self.arm(ctx);
    }

    /// Forwards buffered messages while vouchers remain. A full downstream queue
    /// stops the drain; the message goes back to the front and keeps its voucher.
    fn release(&mut self) {
        while self.vouchers > 0 {
            let Some(message) = self.buffer.pop_front() else {
                break;
            };
            match self.downstream.try_send_or_return(message) {
                Ok(()) => {
                    self.vouchers -= 1;
                    self.stats.forwarded_count.fetch_add(1, Ordering::Relaxed);
                }
                Err((message, MessageError::QueueFull)) => {
                    self.buffer.push_front(message);
                    trace!(
                        buffered = self.buffer.len(),
                        "Downstream full, holding until the next tick"
                    );
                    break;
                }
                Err((_, error)) => {
                    self.vouchers -= 1;
                    self.stats.dropped_count.fetch_add(1, Ordering::Relaxed);
                    error!(%error, "Downstream rejected throttled message, dropped");
                }
            }
        }
        self.stats.buffered.store(self.buffer.len(), Ordering::Relaxed);
    }

    fn arm(&mut self, ctx: &ComponentContext) {
        let endpoint = ctx.endpoint().clone();
        let interval = self.config.interval;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Err(error) = endpoint.try_send(Tick) {
                trace!(%error, "Tick not delivered");
            }
        }));
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.stats.active.store(active, Ordering::Relaxed);
    }
}

#[async_trait]
impl<T: Message> Component for ThrottleModel<T> {
    async fn on_start(&mut self, ctx: &ComponentContext, _command: &Start) -> anyhow::Result<()> {
        self.vouchers = self.config.limit;
        debug!(
            component = %ctx.name(),
            interval = ?self.config.interval,
            limit = self.config.limit,
            "Throttler started"
        );
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &ComponentContext, _command: &Stop) -> anyhow::Result<()> {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.set_active(false);
        if !self.buffer.is_empty() {
            debug!(
                component = %ctx.name(),
                unsent = self.buffer.len(),
                "Throttler stopped with buffered messages"
            );
        }
        self.unsent.lock().extend(self.buffer.drain(..));
        self.stats.buffered.store(0, Ordering::Relaxed);
        Ok(())
    }
}

impl<T> Drop for ThrottleModel<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

fn on_message<T: Message>(agent: &mut Agent<ThrottleModel<T>>, message: T) -> HandlerFuture<'_> {
    let Agent { model, ctx } = agent;
    model.accept(message, ctx);
    Reply::ok()
}

fn on_tick<T: Message>(agent: &mut Agent<ThrottleModel<T>>, _tick: Tick) -> HandlerFuture<'_> {
    let Agent { model, ctx } = agent;
    model.tick(ctx);
    Reply::ok()
}

/// A started throttling relay for messages of type `T`.
pub struct Throttler<T> {
    handle: ComponentHandle,
    stats: Arc<ThrottlerStats>,
    unsent: Arc<Mutex<Vec<T>>>,
}

impl<T: Message + Clone> Throttler<T> {
    /// Assembles and starts a throttler forwarding to `downstream`.
    ///
    /// # Errors
    ///
    /// Fails when the component cannot be started; see [`ComponentHandle::start`].
    pub async fn start(
        address: Address,
        downstream: Endpoint,
        config: ThrottlerConfig,
        componentry: Componentry,
    ) -> Result<Self, ComponentError> {
        let stats = Arc::new(ThrottlerStats::default());
        let unsent = Arc::new(Mutex::new(Vec::new()));
        let model =
            ThrottleModel::<T>::new(downstream, config, Arc::clone(&stats), Arc::clone(&unsent));
        let mut component = ManagedComponent::new(address, componentry, model);
        component
            .mutate_on::<T, _>(on_message::<T>)?
            .mutate_on::<Tick, _>(on_tick::<T>)?
            .open_envelopes::<T>()?;
        let handle = component.start().await?;
        Ok(Self {
            handle,
            stats,
            unsent,
        })
    }

    /// Queues `message` for forwarding. See [`Endpoint::send`].
    pub fn send(&self, message: T) {
        self.handle.mailbox().send(message);
    }
}

impl<T> Throttler<T> {
    /// Where producers send `T` (or `Envelope<T>`).
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        self.handle.mailbox()
    }

    /// Forwarding counters.
    #[must_use]
    pub const fn stats(&self) -> &Arc<ThrottlerStats> {
        &self.stats
    }

    /// The underlying component.
    #[must_use]
    pub const fn handle(&self) -> &ComponentHandle {
        &self.handle
    }

    /// Stops the throttler and hands back the messages it had not forwarded yet, in
    /// arrival order. Returns `None` when it did not stop within `timeout`.
    pub async fn stop(&self, timeout: Duration) -> Option<Vec<T>> {
        if !self.handle.stop(timeout).await {
            return None;
        }
        Some(std::mem::take(&mut *self.unsent.lock()))
    }
}

impl<T> fmt::Debug for Throttler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttler")
            .field("name", &self.handle.name())
            .field("stats", &self.stats)
            .finish()
    }
}
