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

//! Test attribute for Switchboard components.
//!
//! `#[switchboard_test]` turns an `async fn` into a `#[test]` that runs on a
//! multi-threaded Tokio runtime. Processor workers are spawned onto that runtime,
//! so a panic raised inside a worker does not fail the test on its own. The macro
//! installs a panic hook that remembers the first panic seen anywhere in the
//! process while the test runs and fails the test with its location afterwards.
//!
//! The expanded code refers to `tokio`, `tracing` and `parking_lot`, which must be
//! available to the crate using the attribute.

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Runs an async test body on a fresh multi-threaded Tokio runtime.
///
/// ```ignore
/// #[switchboard_test]
/// async fn processes_in_order() -> anyhow::Result<()> {
///     // ...
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn switchboard_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;
    let attrs = &input.attrs;
    let name = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let async_name = syn::Ident::new(&format!("__{name}_async"), name.span());

    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() {
            use std::panic;
            use std::sync::Arc;

            let first_panic: Arc<parking_lot::Mutex<Option<String>>> =
                Arc::new(parking_lot::Mutex::new(None));
            let recorder = Arc::clone(&first_panic);

            let previous_hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                let payload = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "no panic message".to_string());
                let location = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                    .unwrap_or_else(|| "unknown location".to_string());
                let mut slot = recorder.lock();
                if slot.is_none() {
                    *slot = Some(format!(
                        "Panic at {}: {}",
                        location,
                        payload.trim().replace('\n', " ")
                    ));
                }
                tracing::error!(%location, "panic: {}", payload);
                previous_hook(info);
            }));

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("failed to build the test runtime");

            let result = runtime.block_on(async {
                let test_span = tracing::info_span!("switchboard_test", name = stringify!(#name));
                tracing::Instrument::instrument(#async_name(), test_span).await
            });
            drop(runtime);

            if let Some(message) = first_panic.lock().take() {
                panic!("{}", message);
            }

            result.unwrap()
        }

        async fn #async_name(#inputs) #output #body
    };

    expanded.into()
}
