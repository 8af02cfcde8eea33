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
use thiserror::Error;

/// Represents errors that can occur when handing a message to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The target processor has stopped accepting input (drained, killed or faulted).
    #[error("target queue is closed")]
    ChannelClosed,
    /// The target queue is at capacity and the send was not allowed to wait.
    #[error("target queue is full")]
    QueueFull,
    /// The envelope has no receiver address to route on.
    #[error("envelope has no receiver")]
    MissingReceiver,
    /// No mailbox is registered under the receiver address.
    #[error("no mailbox registered for the receiver address")]
    UnknownAddress,
}

/// Converts a `SendError` from Tokio's MPSC channel to a `MessageError`.
impl<T> From<tokio::sync::mpsc::error::SendError<T>> for MessageError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::ChannelClosed
    }
}

impl<T> From<tokio::sync::mpsc::error::TrySendError<T>> for MessageError {
    fn from(error: tokio::sync::mpsc::error::TrySendError<T>) -> Self {
        match error {
            tokio::sync::mpsc::error::TrySendError::Full(_) => Self::QueueFull,
            tokio::sync::mpsc::error::TrySendError::Closed(_) => Self::ChannelClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::error::{SendError, TrySendError};

    use super::*;

    #[test]
    fn channel_errors_map_to_message_errors() {
        assert_eq!(
            MessageError::from(TrySendError::Full(())),
            MessageError::QueueFull
        );
        assert_eq!(
            MessageError::from(TrySendError::Closed(())),
            MessageError::ChannelClosed
        );
        assert_eq!(MessageError::from(SendError(())), MessageError::ChannelClosed);
    }
}
