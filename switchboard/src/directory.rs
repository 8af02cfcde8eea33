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

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::message::{Address, Envelope, Mailbox, MessageError};
use crate::traits::Message;

/// A process-local address book of component mailboxes.
///
/// Transport adapters use [`Directory::route`] to hand inbound envelopes to the
/// component named as their receiver. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Arc<DashMap<Address, Mailbox>>,
}

impl Directory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `mailbox` under its address, returning the mailbox it replaced.
    pub fn register(&self, mailbox: Mailbox) -> Option<Mailbox> {
        debug!(address = %mailbox.address(), "Registering mailbox");
        self.entries.insert(mailbox.address().clone(), mailbox)
    }

    /// Removes the mailbox registered under `address`.
    pub fn deregister(&self, address: &Address) -> Option<Mailbox> {
        debug!(%address, "Deregistering mailbox");
        self.entries.remove(address).map(|(_, mailbox)| mailbox)
    }

    /// The mailbox registered under `address`.
    #[must_use]
    pub fn lookup(&self, address: &Address) -> Option<Mailbox> {
        self.entries.get(address).map(|entry| entry.value().clone())
    }

    /// Number of registered mailboxes.
    #[must_use]
    pub fn mailbox_count(&self) -> usize {
        self.entries.len()
    }

    /// Queues `envelope`, unopened, on the mailbox of its receiver.
    ///
    /// # Errors
    ///
    /// *   [`MessageError::MissingReceiver`] when the envelope names no receiver (or the
    ///     `None` address).
    /// *   [`MessageError::UnknownAddress`] when nothing is registered under it.
    /// *   The receiving endpoint's own send errors.
    pub fn route<T: Message + Clone>(&self, envelope: Envelope<T>) -> Result<(), MessageError> {
        let mailbox = self.receiver_of(&envelope)?;
        mailbox.endpoint().try_send(envelope)
    }

    /// Like [`route`](Self::route), but waits for queue capacity.
    ///
    /// # Errors
    ///
    /// As for [`route`](Self::route).
    pub async fn route_async<T: Message + Clone>(
        &self,
        envelope: Envelope<T>,
    ) -> Result<(), MessageError> {
        let mailbox = self.receiver_of(&envelope)?;
        mailbox.send_async(envelope).await
    }

    fn receiver_of<T>(&self, envelope: &Envelope<T>) -> Result<Mailbox, MessageError> {
        let receiver = envelope
            .receiver()
            .filter(|address| !address.is_none())
            .ok_or(MessageError::MissingReceiver)?;
        trace!(%receiver, sender = ?envelope.sender(), "Routing envelope");
        self.lookup(receiver).ok_or(MessageError::UnknownAddress)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;

    use tokio::sync::mpsc::channel;

    use super::*;
    use crate::message::Endpoint;

    fn mailbox(name: &str) -> (Mailbox, tokio::sync::mpsc::Receiver<Box<dyn Message>>) {
        let (tx, rx) = channel(4);
        let endpoint = Endpoint::new(tx, Arc::new(AtomicU64::new(0)));
        (Mailbox::new(Address::new(name).unwrap(), endpoint), rx)
    }

    #[test]
    fn register_replaces_and_deregister_removes() {
        let directory = Directory::new();
        let (first, _rx1) = mailbox("risk");
        let (second, _rx2) = mailbox("risk");

        assert!(directory.register(first.clone()).is_none());
        let replaced = directory.register(second.clone()).unwrap();
        assert_eq!(replaced.endpoint(), first.endpoint());
        assert_eq!(directory.mailbox_count(), 1);
        assert_eq!(
            directory.lookup(first.address()).unwrap().endpoint(),
            second.endpoint()
        );

        assert!(directory.deregister(first.address()).is_some());
        assert_eq!(directory.mailbox_count(), 0);
        assert!(directory.lookup(first.address()).is_none());
    }
}
