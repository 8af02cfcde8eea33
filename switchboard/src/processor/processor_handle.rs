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
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace};

use crate::message::Endpoint;
use crate::processor::ProcessorStats;

/// Where a processor's worker is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorPhase {
    /// Built but not started.
    Idle,
    /// Accepting and processing input.
    Running,
    /// Input is closed; already accepted messages are still being processed.
    Draining,
    /// Every accepted message was processed after a graceful stop.
    Completed,
    /// An exception handler escalated a handler failure. Remaining input was abandoned.
    Faulted,
    /// Killed. Remaining input was abandoned.
    Cancelled,
}

impl ProcessorPhase {
    /// `true` once the worker has exited.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Faulted | Self::Cancelled)
    }
}

impl fmt::Display for ProcessorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Faulted => "faulted",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// External control of a started [`MessageProcessor`](super::MessageProcessor).
///
/// Cloning is cheap; all clones control the same worker.
#[derive(Clone, Debug)]
pub struct ProcessorHandle {
    name: Arc<str>,
    endpoint: Endpoint,
    stats: Arc<ProcessorStats>,
    phase: watch::Receiver<ProcessorPhase>,
    drain: CancellationToken,
    kill: CancellationToken,
    tracker: TaskTracker,
}

impl ProcessorHandle {
    pub(crate) const fn new(
        name: Arc<str>,
        endpoint: Endpoint,
        stats: Arc<ProcessorStats>,
        phase: watch::Receiver<ProcessorPhase>,
        drain: CancellationToken,
        kill: CancellationToken,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            name,
            endpoint,
            stats,
            phase,
            drain,
            kill,
            tracker,
        }
    }

    /// The processor's name, as used in its tracing span.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The endpoint feeding this processor.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Live counters and diagnostics.
    #[must_use]
    pub const fn stats(&self) -> &Arc<ProcessorStats> {
        &self.stats
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> ProcessorPhase {
        *self.phase.borrow()
    }

    /// A receiver that observes every phase change.
    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<ProcessorPhase> {
        self.phase.clone()
    }

    /// Stops accepting input, lets the worker finish every message already accepted,
    /// and waits for it to exit.
    ///
    /// Returns `true` when the worker completed normally and `false` when it faulted or
    /// was killed. Never panics. Callers wanting a bound wrap this in
    /// `tokio::time::timeout`.
    #[instrument(skip(self), fields(processor = %self.name))]
    pub async fn graceful_stop(&self) -> bool {
        trace!("Graceful stop requested");
        self.drain.cancel();
        self.tracker.wait().await;
        let phase = self.phase();
        trace!(%phase, "Worker exited");
        phase == ProcessorPhase::Completed
    }

    /// Cancels the worker immediately. Queued messages are abandoned; a handler in
    /// progress is dropped at its next suspension point.
    pub fn kill(&self) {
        trace!(processor = %self.name, "Kill requested");
        self.kill.cancel();
    }

    /// Waits for the worker to exit without asking it to, and returns its final phase.
    pub async fn wait(&self) -> ProcessorPhase {
        self.tracker.wait().await;
        self.phase()
    }
}
