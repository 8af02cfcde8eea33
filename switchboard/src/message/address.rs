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
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

const NONE_NAME: &str = "None";

/// The name of a messaging endpoint within a process.
///
/// Addresses are cheap to clone (the name is shared) and compare and hash by name.
/// [`Address::none`] is the reserved sentinel for "no particular endpoint".
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    name: Arc<str>,
}

impl Address {
    /// Creates an address from a non-empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAddress`] when `name` is empty.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        Ok(Self { name: name.into() })
    }

    /// The reserved `None` address.
    #[must_use]
    pub fn none() -> Self {
        Self {
            name: NONE_NAME.into(),
        }
    }

    /// Returns `true` for the reserved `None` address.
    #[must_use]
    pub fn is_none(&self) -> bool {
        &*self.name == NONE_NAME
    }

    /// The address name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The UTF-8 byte form of the name, as written to a transport.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&&*self.name).finish()
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::new(name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert_eq!(Address::new(""), Err(ValidationError::EmptyAddress));
    }

    #[test]
    fn equality_and_hash_follow_the_name() {
        let a = Address::new("risk-engine").unwrap();
        let b = Address::new(String::from("risk-engine")).unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert_eq!(b.as_bytes(), b"risk-engine");
    }

    #[test]
    fn none_sentinel() {
        assert!(Address::none().is_none());
        assert!(!Address::new("gateway").unwrap().is_none());
        assert_eq!(Address::none().to_string(), "None");
    }
}
