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

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use switchboard::prelude::*;

/// What a [`Recorder`] saw, shared with the test that owns it.
#[derive(Debug, Default)]
pub struct Journal {
    pub entries: Vec<String>,
    pub start_timestamp: Option<DateTime<Utc>>,
}

pub type SharedJournal = Arc<Mutex<Journal>>;

/// A component that writes its lifecycle and messages into a shared journal.
#[derive(Debug, Default)]
pub struct Recorder {
    pub journal: SharedJournal,
    pub fail_on_start: bool,
}

impl Recorder {
    pub fn new(journal: SharedJournal) -> Self {
        Self {
            journal,
            fail_on_start: false,
        }
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.journal.lock().entries.push(entry.into());
    }
}

#[async_trait]
impl Component for Recorder {
    async fn on_start(&mut self, ctx: &ComponentContext, command: &Start) -> anyhow::Result<()> {
        // The hook runs before the state flips.
        assert_eq!(ctx.state(), ComponentState::Initialized);
        if self.fail_on_start {
            anyhow::bail!("market data session refused");
        }
        self.journal.lock().start_timestamp = Some(command.timestamp());
        self.record("started");
        Ok(())
    }

    async fn on_stop(&mut self, ctx: &ComponentContext, _command: &Stop) -> anyhow::Result<()> {
        self.record(format!("stopping from {}", ctx.state()));
        Ok(())
    }
}
