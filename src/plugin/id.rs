//! PluginId: the `owner/name` key plugins are registered under

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginIdError {
    #[error("plugin id {0:?} must have the form owner/name")]
    Malformed(String),

    #[error("plugin id {id:?} contains invalid character {ch:?}")]
    InvalidCharacter { id: String, ch: char },
}

/// Unique, stable identifier of a plugin, e.g. `example/forum`.
///
/// Both parts are non-empty and made of lowercase ASCII letters, digits,
/// `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId {
    owner: String,
    name: String,
}

impl PluginId {
    pub fn parse(id: &str) -> Result<Self, PluginIdError> {
        let (owner, name) = id
            .split_once('/')
            .ok_or_else(|| PluginIdError::Malformed(id.to_string()))?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(PluginIdError::Malformed(id.to_string()));
        }
        if let Some(ch) = id
            .chars()
            .filter(|c| *c != '/')
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(PluginIdError::InvalidCharacter {
                id: id.to_string(),
                ch,
            });
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl std::str::FromStr for PluginId {
    type Err = PluginIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PluginId {
    type Error = PluginIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.to_string()
    }
}
