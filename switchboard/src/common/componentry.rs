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
//! The clock and identifier services injected into every component.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    /// The current UTC time.
    fn time_now(&self) -> DateTime<Utc>;
}

/// Source of fresh identifiers.
pub trait IdProvider: Debug + Send + Sync {
    /// A new, unique identifier.
    fn new_id(&self) -> Uuid;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock to `time`.
    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.lock() = time;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn time_now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// The capability set handed to a component at construction.
#[derive(Debug, Clone)]
pub struct Componentry {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdProvider>,
}

impl Componentry {
    /// Bundles a clock and an id provider.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdProvider>) -> Self {
        Self { clock, ids }
    }

    /// The injected clock.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The injected id provider.
    #[must_use]
    pub fn ids(&self) -> &Arc<dyn IdProvider> {
        &self.ids
    }

    /// Shorthand for `self.clock().time_now()`.
    #[must_use]
    pub fn time_now(&self) -> DateTime<Utc> {
        self.clock.time_now()
    }

    /// Shorthand for `self.ids().new_id()`.
    #[must_use]
    pub fn new_id(&self) -> Uuid {
        self.ids.new_id()
    }
}

impl Default for Componentry {
    /// System clock and random UUIDs.
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(UuidProvider))
    }
}
