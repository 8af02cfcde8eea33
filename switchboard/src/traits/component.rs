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

use async_trait::async_trait;
use tracing::warn;

use crate::component::{classify, ComponentContext, Severity};
use crate::message::{Start, Stop};
use crate::traits::Identifiable;

/// The model of a managed component: its lifecycle hooks and failure policy.
///
/// The hooks run on the component's worker, before the lifecycle state changes. The
/// default implementations do nothing except log a warning, which makes components
/// that forget to override them easy to spot.
///
/// ```ignore
/// struct Gateway { session: Option<Session> }
///
/// #[async_trait]
/// impl Component for Gateway {
///     async fn on_start(&mut self, ctx: &ComponentContext, _: &Start) -> anyhow::Result<()> {
///         self.session = Some(Session::open(ctx.name()).await?);
///         Ok(())
///     }
///
///     async fn on_stop(&mut self, _: &ComponentContext, _: &Stop) -> anyhow::Result<()> {
///         if let Some(session) = self.session.take() {
///             session.close().await?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + 'static {
    /// Runs when `Start` is processed, before the state becomes `Running`.
    ///
    /// An error leaves the component `Failed`.
    async fn on_start(&mut self, ctx: &ComponentContext, command: &Start) -> anyhow::Result<()> {
        warn!(
            component = %ctx.name(),
            command = %command.id(),
            "on_start is not overridden, nothing to do"
        );
        Ok(())
    }

    /// Runs when `Stop` is processed, before the state becomes `Stopped`.
    async fn on_stop(&mut self, ctx: &ComponentContext, command: &Stop) -> anyhow::Result<()> {
        warn!(
            component = %ctx.name(),
            command = %command.id(),
            "on_stop is not overridden, nothing to do"
        );
        Ok(())
    }

    /// Decides whether a handler failure is recoverable. Defaults to [`classify`].
    fn severity(&self, error: &anyhow::Error) -> Severity {
        classify(error)
    }
}
