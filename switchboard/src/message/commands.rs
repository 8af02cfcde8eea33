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
//! The two lifecycle commands every component accepts.

use chrono::{DateTime, Utc};
use switchboard_macro::switchboard_message;
use uuid::Uuid;

use crate::traits::Identifiable;

/// Asks a component to move from `Initialized` to `Running`.
#[switchboard_message(serde)]
#[derive(PartialEq, Eq)]
pub struct Start {
    id: Uuid,
    timestamp: DateTime<Utc>,
}

/// Asks a component to move from `Running` to `Stopped`.
#[switchboard_message(serde)]
#[derive(PartialEq, Eq)]
pub struct Stop {
    id: Uuid,
    timestamp: DateTime<Utc>,
}

impl Start {
    /// Creates a start command.
    #[must_use]
    pub const fn new(id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self { id, timestamp }
    }

    /// When the command was issued.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Stop {
    /// Creates a stop command.
    #[must_use]
    pub const fn new(id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self { id, timestamp }
    }

    /// When the command was issued.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Identifiable for Start {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Identifiable for Stop {
    fn id(&self) -> Uuid {
        self.id
    }
}
