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
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::message::Address;
use crate::traits::Identifiable;

/// A message wrapped for a trip across a transport boundary.
///
/// Transport adapters wrap outbound messages with the sending and receiving
/// [`Address`]es and the time of wrapping. On arrival the receiving component opens
/// the envelope and re-submits the bare message to its own endpoint, so the message
/// is handled on the component's worker in arrival order rather than on the
/// transport's thread.
///
/// The envelope's id is the wrapped message's id; it is never regenerated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    message: T,
    receiver: Option<Address>,
    sender: Option<Address>,
    timestamp: DateTime<Utc>,
    id: Uuid,
}

impl<T: Identifiable> Envelope<T> {
    /// Wraps `message`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DefaultTimestamp`] when `timestamp` is the default
    /// (Unix epoch) value.
    pub fn new(
        message: T,
        receiver: Option<Address>,
        sender: Option<Address>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if timestamp == DateTime::<Utc>::default() {
            return Err(ValidationError::DefaultTimestamp);
        }
        let id = message.id();
        Ok(Self {
            message,
            receiver,
            sender,
            timestamp,
            id,
        })
    }
}

impl<T> Envelope<T> {
    /// Unwraps the message. Consumes the envelope, so it can be opened only once.
    #[must_use]
    pub fn open(self) -> T {
        self.message
    }

    /// The wrapped message.
    #[must_use]
    pub const fn message(&self) -> &T {
        &self.message
    }

    /// The intended receiver, if the producer named one.
    #[must_use]
    pub const fn receiver(&self) -> Option<&Address> {
        self.receiver.as_ref()
    }

    /// The producer, if it identified itself.
    #[must_use]
    pub const fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// When the message was wrapped.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl<T> Identifiable for Envelope<T> {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::message::Start;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap()
    }

    #[test]
    fn rejects_default_timestamp() {
        let start = Start::new(Uuid::new_v4(), now());
        let result = Envelope::new(start, None, None, DateTime::<Utc>::default());
        assert_eq!(result.unwrap_err(), ValidationError::DefaultTimestamp);
    }

    #[test]
    fn propagates_the_message_id() {
        let id = Uuid::new_v4();
        let receiver = Address::new("execution-gateway").unwrap();
        let sender = Address::new("order-server").unwrap();
        let envelope = Envelope::new(
            Start::new(id, now()),
            Some(receiver.clone()),
            Some(sender.clone()),
            now(),
        )
        .unwrap();

        assert_eq!(envelope.id(), id);
        assert_eq!(envelope.receiver(), Some(&receiver));
        assert_eq!(envelope.sender(), Some(&sender));
        assert_eq!(envelope.timestamp(), now());
        assert_eq!(envelope.open().id(), id);
    }
}
