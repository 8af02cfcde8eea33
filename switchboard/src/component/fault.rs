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

use crate::error::{HandlerPanic, InputError};

/// How a component treats a handler failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Logged at error level; processing continues.
    Recoverable,
    /// Logged as critical; the component fails and its processor stops.
    Fatal,
}

/// The default classification: an [`InputError`] anywhere in the error chain is
/// recoverable, everything else (panics included) is fatal.
#[must_use]
pub fn classify(error: &anyhow::Error) -> Severity {
    if error.chain().any(|cause| cause.is::<HandlerPanic>()) {
        return Severity::Fatal;
    }
    if error.chain().any(|cause| cause.is::<InputError>()) {
        Severity::Recoverable
    } else {
        Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn input_errors_are_recoverable_even_when_wrapped() {
        let error = anyhow::Error::new(InputError::InvalidArgument("qty".into()));
        assert_eq!(classify(&error), Severity::Recoverable);

        let wrapped: anyhow::Result<()> =
            Err(InputError::MissingValue("price".into())).context("pricing order 42");
        assert_eq!(classify(&wrapped.unwrap_err()), Severity::Recoverable);
    }

    #[test]
    fn everything_else_is_fatal() {
        assert_eq!(classify(&anyhow::anyhow!("socket reset")), Severity::Fatal);
        let panic_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let panicked = anyhow::Error::new(HandlerPanic::from_payload(&*panic_payload));
        assert_eq!(classify(&panicked), Severity::Fatal);
    }
}
