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

//! Helpers for building handler return values.
//!
//! Every handler returns a [`HandlerFuture`]. [`Reply`] saves writing
//! `Box::pin(async move { ... })` by hand:
//!
//! ```ignore
//! // Synchronous handler
//! processor.register_handler::<Fill, _>(|book, fill| {
//!     book.apply(fill);
//!     Reply::ok()
//! })?;
//!
//! // Handler that awaits
//! processor.register_handler::<Fill, _>(|book, fill| {
//!     Reply::pending(async move {
//!         book.persist(fill).await?;
//!         Ok(())
//!     })
//! })?;
//!
//! // Rejecting input
//! processor.register_handler::<Quantity, _>(|_, quantity| {
//!     if quantity.0 < 0 {
//!         return Reply::err(InputError::InvalidArgument("negative quantity".into()));
//!     }
//!     Reply::ok()
//! })?;
//! ```

use std::future::Future;

use super::HandlerFuture;

/// Namespace for the [`HandlerFuture`] constructors.
#[derive(Debug, Clone, Copy)]
pub struct Reply;

impl Reply {
    /// A handler that finished synchronously.
    #[inline]
    #[must_use]
    pub fn ok<'a>() -> HandlerFuture<'a> {
        Box::pin(futures::future::ready(Ok(())))
    }

    /// A handler that failed synchronously.
    #[inline]
    pub fn err<'a>(error: impl Into<anyhow::Error>) -> HandlerFuture<'a> {
        let error = error.into();
        Box::pin(futures::future::ready(Err(error)))
    }

    /// Wraps an async block.
    #[inline]
    pub fn pending<'a, F>(future: F) -> HandlerFuture<'a>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'a,
    {
        Box::pin(future)
    }
}
