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

/// The lifecycle state of a component.
///
/// `Initialized -> Running` on `Start`, `Running -> Stopped` on `Stop`, and any state
/// to `Failed` on an unrecoverable error or a kill. `Stopped` and `Failed` are final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Constructed, waiting for `Start`.
    #[default]
    Initialized,
    /// Processing messages.
    Running,
    /// Stopped on request.
    Stopped,
    /// Stopped by an unrecoverable error or a kill.
    Failed,
}

impl ComponentState {
    /// `true` for `Stopped` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialized => "Initialized",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}
