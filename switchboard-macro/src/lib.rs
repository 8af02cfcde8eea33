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
#![forbid(unsafe_code)]

//! Procedural macros for the Switchboard messaging core.
//!
//! ```ignore
//! // Plain in-process message
//! #[switchboard_message]
//! pub struct Heartbeat;
//!
//! // Message that crosses a transport and therefore needs serde
//! #[switchboard_message(serde)]
//! pub struct OrderAccepted {
//!     pub order_id: String,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Options accepted by `#[switchboard_message(...)]`.
#[derive(Default)]
struct MessageOptions {
    /// Derive `serde::Serialize` and `serde::Deserialize`.
    serde: bool,
}

impl MessageOptions {
    fn parse(attr: &TokenStream) -> Self {
        let mut options = Self::default();
        for part in attr.to_string().split(',') {
            if part.trim() == "serde" {
                options.serde = true;
            }
        }
        options
    }
}

/// Declares a type as a Switchboard message.
///
/// Expands to:
/// - `#[derive(Clone, Debug)]` for whichever of the two is not already derived
/// - `#[derive(serde::Serialize, serde::Deserialize)]` with the `serde` option
/// - a compile-time assertion that the type is `Send + Sync + 'static`, which is what
///   the blanket `Message` implementation requires
///
/// The `serde` option expects `serde` to be a dependency of the calling crate.
#[proc_macro_attribute]
pub fn switchboard_message(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = MessageOptions::parse(&attr);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut traits = Vec::new();
    if !has_derive(&input, "Clone") {
        traits.push(quote!(Clone));
    }
    if !has_derive(&input, "Debug") {
        traits.push(quote!(Debug));
    }
    if options.serde {
        if !has_derive(&input, "Serialize") {
            traits.push(quote!(serde::Serialize));
        }
        if !has_derive(&input, "Deserialize") {
            traits.push(quote!(serde::Deserialize));
        }
    }
    let derives = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    };

    let assert_ident = quote::format_ident!("_assert_switchboard_message_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
