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
use std::hash::{Hash, Hasher};

use crate::message::{Address, Endpoint, MessageError};
use crate::traits::Message;

/// The addressable handle of a component: its [`Address`] paired with its [`Endpoint`].
///
/// Mailboxes are what other parties hold in order to talk to a component. Equality and
/// hashing use the address only.
#[derive(Clone, Debug)]
pub struct Mailbox {
    address: Address,
    endpoint: Endpoint,
}

impl Mailbox {
    /// Pairs an address with an endpoint.
    #[must_use]
    pub const fn new(address: Address, endpoint: Endpoint) -> Self {
        Self { address, endpoint }
    }

    /// The component's address.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// The component's endpoint.
    #[inline]
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Fire-and-forget send to the component. See [`Endpoint::send`].
    pub fn send(&self, message: impl Message) {
        self.endpoint.send(message);
    }

    /// Sends and waits for the message to be accepted. See [`Endpoint::send_async`].
    ///
    /// # Errors
    ///
    /// Fails when the component no longer accepts input.
    pub async fn send_async(&self, message: impl Message) -> Result<(), MessageError> {
        self.endpoint.send_async(message).await
    }
}

impl PartialEq for Mailbox {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Mailbox {}

impl Hash for Mailbox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}
