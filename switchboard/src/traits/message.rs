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
use std::any::Any;
use std::fmt::Debug;

use dyn_clone::DynClone;

/// A marker trait for every value that can travel through an [`Endpoint`](crate::message::Endpoint).
///
/// Messages are type-erased while they sit in a processor's queue and are recovered
/// by the handler table through [`Any`]. `DynClone` lets the processor keep a copy of
/// an unhandled message for diagnostics and lets envelopes be opened from a borrowed
/// view when needed.
///
/// A blanket implementation covers every `Clone + Debug + Send + Sync + 'static`
/// type, so message structs only need the usual derives (or `#[switchboard_message]`).
pub trait Message: DynClone + Any + Send + Sync + Debug {
    /// Returns the message as [`Any`] for type inspection and borrowed downcasts.
    fn as_any(&self) -> &dyn Any;

    /// Converts the boxed message into a boxed [`Any`] so it can be moved out as its
    /// concrete type.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    /// The Rust type name of the concrete message, used in logs and diagnostics.
    fn type_name(&self) -> &'static str;
}

dyn_clone::clone_trait_object!(Message);

impl<T> Message for T
where
    T: Any + Send + Sync + Debug + DynClone + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Quote(u32);

    #[test]
    fn boxed_message_keeps_its_concrete_type() {
        let boxed: Box<dyn Message> = Box::new(Quote(7));
        // `Box<dyn Message>` is itself a `Message`, so inspect through the deref.
        assert_eq!((*boxed).as_any().type_id(), TypeId::of::<Quote>());
        assert!((*boxed).type_name().ends_with("Quote"));

        let cloned = dyn_clone::clone_box(&*boxed);
        let recovered = cloned.into_any().downcast::<Quote>().map(|q| *q);
        assert_eq!(recovered.ok(), Some(Quote(7)));
    }
}
