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
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use static_assertions::assert_impl_all;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tracing::{error, instrument, trace};

use crate::message::MessageError;
use crate::traits::Message;

/// The sending half of a processor's input queue.
///
/// An `Endpoint` accepts any [`Message`] and enqueues it for the owning processor's
/// single worker. All messages accepted by the same endpoint are processed in the
/// order they were accepted, regardless of how many clones of the endpoint exist or
/// which tasks send through them.
///
/// Two endpoints are equal when they feed the same queue.
#[derive(Clone)]
pub struct Endpoint {
    target: Sender<Box<dyn Message>>,
    input_count: Arc<AtomicU64>,
}

assert_impl_all!(Endpoint: Send, Sync, Clone);

impl Endpoint {
    pub(crate) fn new(target: Sender<Box<dyn Message>>, input_count: Arc<AtomicU64>) -> Self {
        Self {
            target,
            input_count,
        }
    }

    /// Enqueues a message without waiting.
    ///
    /// Fire-and-forget: a rejected message is logged at error level and dropped. A
    /// rejection only happens once the processor has stopped accepting input or when
    /// its (very large) queue bound is exhausted. Use [`Endpoint::try_send`] to observe
    /// the outcome.
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub fn send(&self, message: impl Message) {
        if let Err(e) = self.try_send(message) {
            error!(error = %e, "Message dropped by endpoint");
        }
    }

    /// Enqueues a message without waiting and reports whether it was accepted.
    ///
    /// # Errors
    ///
    /// [`MessageError::ChannelClosed`] when the processor no longer accepts input,
    /// [`MessageError::QueueFull`] when the queue bound is reached.
    pub fn try_send(&self, message: impl Message) -> Result<(), MessageError> {
        self.try_send_boxed(Box::new(message))
    }

    pub(crate) fn try_send_boxed(&self, message: Box<dyn Message>) -> Result<(), MessageError> {
        let permit = self.target.try_reserve()?;
        self.input_count.fetch_add(1, Ordering::Relaxed);
        trace!(message_type = (*message).type_name(), "Message accepted");
        permit.send(message);
        Ok(())
    }

    /// Like [`Endpoint::try_send`], but a rejected message is handed back with the
    /// reason so the caller can hold on to it.
    pub(crate) fn try_send_or_return<M: Message>(
        &self,
        message: M,
    ) -> Result<(), (M, MessageError)> {
        match self.target.try_reserve() {
            Ok(permit) => {
                self.input_count.fetch_add(1, Ordering::Relaxed);
                trace!(message_type = std::any::type_name::<M>(), "Message accepted");
                permit.send(Box::new(message));
                Ok(())
            }
            Err(error) => Err((message, error.into())),
        }
    }

    /// Enqueues a message, waiting for queue capacity if necessary.
    ///
    /// Resolves once the message has been accepted into the queue, not once it has
    /// been processed.
    ///
    /// # Errors
    ///
    /// [`MessageError::ChannelClosed`] when the processor no longer accepts input.
    #[instrument(skip(self, message), level = "trace", fields(message_type = std::any::type_name_of_val(&message)))]
    pub async fn send_async(&self, message: impl Message) -> Result<(), MessageError> {
        self.send_boxed_async(Box::new(message)).await
    }

    pub(crate) async fn send_boxed_async(&self, message: Box<dyn Message>) -> Result<(), MessageError> {
        // Fast path: capacity is almost always available.
        let permit = match self.target.try_reserve() {
            Ok(permit) => permit,
            Err(TrySendError::Closed(())) => return Err(MessageError::ChannelClosed),
            Err(TrySendError::Full(())) => self.target.reserve().await?,
        };
        self.input_count.fetch_add(1, Ordering::Relaxed);
        permit.send(message);
        Ok(())
    }

    /// Number of messages this queue has accepted so far, across all clones.
    #[inline]
    #[must_use]
    pub fn input_count(&self) -> u64 {
        self.input_count.load(Ordering::Relaxed)
    }

    /// Returns `true` once the processor has stopped accepting input.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.target.is_closed()
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.target.same_channel(&other.target)
    }
}

impl Eq for Endpoint {}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("input_count", &self.input_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
