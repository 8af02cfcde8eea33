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
#![allow(unused)]

use chrono::{DateTime, Utc};
use switchboard::prelude::*;
use uuid::Uuid;

/// A fill against a position.
#[switchboard_message]
pub struct Fill {
    pub quantity: i64,
}

/// A message nobody registers a handler for.
#[switchboard_message]
#[derive(PartialEq, Eq)]
pub struct Heartbeat(pub u32);

/// Asks a recorder to sleep inside its handler.
#[switchboard_message]
pub struct Stall(pub std::time::Duration);

/// An order routed between components in envelopes.
#[switchboard_message(serde)]
#[derive(PartialEq, Eq)]
pub struct NewOrder {
    pub id: Uuid,
    pub symbol: String,
    pub quantity: i64,
}

impl NewOrder {
    pub fn new(symbol: &str, quantity: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            quantity,
        }
    }
}

impl Identifiable for NewOrder {
    fn id(&self) -> Uuid {
        self.id
    }
}
