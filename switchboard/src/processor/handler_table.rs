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

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::ProcessorError;
use crate::traits::Message;

/// The future a message handler returns.
///
/// It may borrow the processor state for the duration of the handler, so handlers
/// can `await` while mutating it.
pub type HandlerFuture<'a> = BoxFuture<'a, anyhow::Result<()>>;

/// A handler with its message type erased.
pub(crate) trait ErasedHandler<S>: Send + Sync {
    fn call<'a>(&'a self, state: &'a mut S, message: Box<dyn Message>) -> HandlerFuture<'a>;
}

struct TypedHandler<M, F> {
    callback: F,
    _message: PhantomData<fn(M)>,
}

impl<S, M, F> ErasedHandler<S> for TypedHandler<M, F>
where
    S: Send + 'static,
    M: Message,
    F: for<'a> Fn(&'a mut S, M) -> HandlerFuture<'a> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, state: &'a mut S, message: Box<dyn Message>) -> HandlerFuture<'a> {
        match message.into_any().downcast::<M>() {
            Ok(message) => (self.callback)(state, *message),
            // The table only routes `M` here.
            Err(_) => Box::pin(futures::future::ready(Err(anyhow::anyhow!(
                "handler for `{}` received a different message type",
                type_name::<M>()
            )))),
        }
    }
}

struct FallbackHandler<F> {
    callback: F,
}

impl<S, F> ErasedHandler<S> for FallbackHandler<F>
where
    S: Send + 'static,
    F: for<'a> Fn(&'a mut S, Box<dyn Message>) -> HandlerFuture<'a> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, state: &'a mut S, message: Box<dyn Message>) -> HandlerFuture<'a> {
        (self.callback)(state, message)
    }
}

struct Registration<S> {
    type_name: &'static str,
    handler: Box<dyn ErasedHandler<S>>,
}

/// The ordered handler registrations of one processor.
///
/// Typed handlers are indexed by the `TypeId` of their message. The any-message
/// fallback is kept apart so that it is always consulted last, however late it was
/// registered.
pub(crate) struct HandlerTable<S> {
    typed: Vec<Registration<S>>,
    index: HashMap<TypeId, usize>,
    fallback: Option<Registration<S>>,
}

impl<S: Send + 'static> HandlerTable<S> {
    pub(crate) fn new() -> Self {
        Self {
            typed: Vec::new(),
            index: HashMap::new(),
            fallback: None,
        }
    }

    pub(crate) fn insert<M, F>(&mut self, callback: F) -> Result<(), ProcessorError>
    where
        M: Message,
        F: for<'a> Fn(&'a mut S, M) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<M>();
        let type_name = type_name::<M>();
        if self.index.contains_key(&type_id) {
            return Err(ProcessorError::DuplicateHandler { type_name });
        }
        debug!(message_type = type_name, "Registering handler");
        self.index.insert(type_id, self.typed.len());
        self.typed.push(Registration {
            type_name,
            handler: Box::new(TypedHandler {
                callback,
                _message: PhantomData::<fn(M)>,
            }),
        });
        Ok(())
    }

    pub(crate) fn insert_fallback<F>(&mut self, callback: F) -> Result<(), ProcessorError>
    where
        F: for<'a> Fn(&'a mut S, Box<dyn Message>) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        if self.fallback.is_some() {
            return Err(ProcessorError::DuplicateFallback);
        }
        debug!("Registering any-message fallback");
        self.fallback = Some(Registration {
            type_name: "*",
            handler: Box::new(FallbackHandler { callback }),
        });
        Ok(())
    }

    /// The handler for a message of type `type_id`: its exact-type registration if
    /// there is one, otherwise the fallback.
    pub(crate) fn lookup(&self, type_id: TypeId) -> Option<&dyn ErasedHandler<S>> {
        self.index
            .get(&type_id)
            .and_then(|&position| self.typed.get(position))
            .or(self.fallback.as_ref())
            .map(|registration| registration.handler.as_ref())
    }

    /// Registered message type names in dispatch order, the fallback (`*`) last.
    pub(crate) fn registered_types(&self) -> Vec<&'static str> {
        self.typed
            .iter()
            .chain(self.fallback.as_ref())
            .map(|registration| registration.type_name)
            .collect()
    }
}

impl<S> fmt::Debug for HandlerTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("handlers", &self.typed.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
