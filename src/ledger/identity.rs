//! Identities: the participants the ledger keeps track of

use super::accounts::{LedgerError, LedgerResult};
use crate::graph::NodeAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of an identity name
pub const MAX_NAME_LENGTH: usize = 39;

const IDENTITY_PREFIX: [&str; 3] = ["credweave", "core", "IDENTITY"];

/// Prefix shared by every identity address
pub fn identity_prefix() -> NodeAddress {
    NodeAddress::from_parts_unchecked(IDENTITY_PREFIX.iter().map(|p| p.to_string()).collect())
}

/// Unique, stable identifier for an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(Uuid);

impl IdentityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated identity name: 1 to 39 ASCII alphanumerics, `-` or `_`.
///
/// Names are unique within a ledger, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityName(String);

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl IdentityName {
    pub fn parse(name: impl Into<String>) -> LedgerResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LedgerError::InvalidName(name, "empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(LedgerError::InvalidName(name, "longer than 39 characters"));
        }
        if !name.chars().all(is_name_char) {
            return Err(LedgerError::InvalidName(
                name,
                "only alphanumerics, '-' and '_' are allowed",
            ));
        }
        Ok(Self(name))
    }

    /// Turn an arbitrary plugin-supplied name into a valid one.
    ///
    /// Invalid characters become `-` and the result is truncated to the
    /// maximum length. Fails only when nothing is left.
    pub fn coerce(raw: &str) -> LedgerResult<Self> {
        let coerced: String = raw
            .chars()
            .map(|c| if is_name_char(c) { c } else { '-' })
            .take(MAX_NAME_LENGTH)
            .collect();
        Self::parse(coerced)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used for case-insensitive uniqueness and lookup
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for IdentityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdentityName {
    type Error = LedgerError;

    fn try_from(value: String) -> LedgerResult<Self> {
        Self::parse(value)
    }
}

impl From<IdentityName> for String {
    fn from(name: IdentityName) -> Self {
        name.0
    }
}

/// What kind of participant an identity represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityType {
    User,
    Project,
    Organization,
    Bot,
}

/// A plugin-level address attached to an identity, e.g. a forum account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub address: NodeAddress,
    pub description: String,
}

impl Alias {
    pub fn new(address: NodeAddress, description: impl Into<String>) -> Self {
        Self {
            address,
            description: description.into(),
        }
    }
}

/// A participant known to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub subtype: IdentityType,
    pub name: IdentityName,
    /// Canonical address, derived from the id
    pub address: NodeAddress,
    pub aliases: Vec<Alias>,
}

impl Identity {
    pub fn new(subtype: IdentityType, name: IdentityName) -> Self {
        let id = IdentityId::new();
        Self {
            id,
            subtype,
            name,
            address: identity_address(id),
            aliases: Vec::new(),
        }
    }
}

/// Canonical node address for an identity id
pub fn identity_address(id: IdentityId) -> NodeAddress {
    let mut parts: Vec<String> = IDENTITY_PREFIX.iter().map(|p| p.to_string()).collect();
    parts.push(id.to_string());
    NodeAddress::from_parts_unchecked(parts)
}
