//! Node and edge addresses
//!
//! An address is an ordered sequence of string parts. Plugins namespace
//! their entities by prefix (e.g. `N[example,forum,TOPIC,42]`), and weights
//! are keyed by address prefix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address part at index {0} is empty")]
    EmptyPart(usize),
}

macro_rules! address_type {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Vec<String>);

        impl $name {
            /// The empty address; a prefix of every address.
            pub fn empty() -> Self {
                Self(Vec::new())
            }

            /// Build an address from parts, rejecting empty parts.
            pub fn from_parts<I, S>(parts: I) -> Result<Self, AddressError>
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
                if let Some(index) = parts.iter().position(|p| p.is_empty()) {
                    return Err(AddressError::EmptyPart(index));
                }
                Ok(Self(parts))
            }

            /// Build an address from parts the caller knows are non-empty.
            pub(crate) fn from_parts_unchecked(parts: Vec<String>) -> Self {
                debug_assert!(parts.iter().all(|p| !p.is_empty()));
                Self(parts)
            }

            pub fn parts(&self) -> &[String] {
                &self.0
            }

            /// Return a new address with `part` appended.
            pub fn append(&self, part: impl Into<String>) -> Result<Self, AddressError> {
                let part = part.into();
                if part.is_empty() {
                    return Err(AddressError::EmptyPart(self.0.len()));
                }
                let mut parts = self.0.clone();
                parts.push(part);
                Ok(Self(parts))
            }

            pub fn has_prefix(&self, prefix: &$name) -> bool {
                self.0.starts_with(&prefix.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($tag, "[{}]"), self.0.join(","))
            }
        }
    };
}

address_type!(
    /// Canonical address of a node (an entity such as a post or an identity)
    NodeAddress,
    "N"
);

address_type!(
    /// Canonical address of an edge
    EdgeAddress,
    "E"
);
