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

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::Message;

/// A handler failure captured by a processor.
#[derive(Debug, Clone)]
pub struct ExceptionRecord {
    message_type: &'static str,
    error: Arc<anyhow::Error>,
}

impl ExceptionRecord {
    pub(crate) const fn new(message_type: &'static str, error: Arc<anyhow::Error>) -> Self {
        Self {
            message_type,
            error,
        }
    }

    /// Type name of the message whose handler failed.
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        self.message_type
    }

    /// The error the handler returned (or the panic it raised).
    #[must_use]
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }
}

/// Counters and diagnostic lists of one message processor.
///
/// The worker is the only writer. Counters never decrease and can be read at any
/// time without locking.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    input_count: Arc<AtomicU64>,
    processed_count: AtomicU64,
    exceptions: Mutex<Vec<ExceptionRecord>>,
    unhandled: Mutex<Vec<Box<dyn Message>>>,
}

impl ProcessorStats {
    /// The counter shared with the processor's [`Endpoint`](crate::message::Endpoint).
    pub(crate) fn input_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.input_count)
    }

    /// Messages accepted into the input queue.
    #[must_use]
    pub fn input_count(&self) -> u64 {
        self.input_count.load(Ordering::Relaxed)
    }

    /// Messages the worker has finished with, whether handled, unhandled or failed.
    #[must_use]
    pub fn processed_count(&self) -> u64 {
        self.processed_count.load(Ordering::Acquire)
    }

    /// Messages accepted but not yet processed.
    #[must_use]
    pub fn pending_count(&self) -> u64 {
        self.input_count().saturating_sub(self.processed_count())
    }

    /// Snapshot of every handler failure seen so far, oldest first.
    #[must_use]
    pub fn exceptions(&self) -> Vec<ExceptionRecord> {
        self.exceptions.lock().clone()
    }

    /// Number of handler failures seen so far.
    #[must_use]
    pub fn exception_count(&self) -> usize {
        self.exceptions.lock().len()
    }

    /// Snapshot of the messages no handler accepted, oldest first.
    ///
    /// Only populated while the processor uses the default unhandled callback.
    #[must_use]
    pub fn unhandled(&self) -> Vec<Box<dyn Message>> {
        self.unhandled.lock().clone()
    }

    /// Number of recorded unhandled messages.
    #[must_use]
    pub fn unhandled_count(&self) -> usize {
        self.unhandled.lock().len()
    }

    /// The recorded unhandled messages of type `M`.
    #[must_use]
    pub fn unhandled_of<M: Message + Clone>(&self) -> Vec<M> {
        self.unhandled
            .lock()
            .iter()
            .filter_map(|message| (**message).as_any().downcast_ref::<M>().cloned())
            .collect()
    }

    pub(crate) fn record_processed(&self) {
        self.processed_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_exception(&self, record: ExceptionRecord) {
        self.exceptions.lock().push(record);
    }

    pub(crate) fn record_unhandled(&self, message: Box<dyn Message>) {
        self.unhandled.lock().push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_input_minus_processed() {
        let stats = ProcessorStats::default();
        stats.input_counter().fetch_add(3, Ordering::Relaxed);
        stats.record_processed();
        assert_eq!(stats.input_count(), 3);
        assert_eq!(stats.processed_count(), 1);
        assert_eq!(stats.pending_count(), 2);
    }

    #[test]
    fn unhandled_messages_can_be_recovered_by_type() {
        let stats = ProcessorStats::default();
        stats.record_unhandled(Box::new(7_i64));
        stats.record_unhandled(Box::new("heartbeat"));
        stats.record_unhandled(Box::new(9_i64));

        assert_eq!(stats.unhandled_count(), 3);
        assert_eq!(stats.unhandled_of::<i64>(), vec![7, 9]);
        assert_eq!(stats.unhandled_of::<&'static str>(), vec!["heartbeat"]);
    }
}
