//! Instance configuration (`credweave.yaml`)

use super::traits::{InstanceError, InstanceResult};
use crate::plugin::PluginId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const CONFIG_FILE: &str = "credweave.yaml";

/// Which plugins an instance runs, in aggregation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    #[serde(default)]
    pub plugins: Vec<PluginId>,
}

impl InstanceConfig {
    pub fn from_yaml(yaml: &str) -> InstanceResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> InstanceResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> InstanceResult<()> {
        let mut seen = HashSet::new();
        for id in &self.plugins {
            if !seen.insert(id) {
                return Err(InstanceError::DuplicatePlugin(id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plugin_list_in_order() {
        let config = InstanceConfig::from_yaml("plugins:\n  - example/forum\n  - example/chat\n").unwrap();
        let ids: Vec<_> = config.plugins.iter().map(|p| p.to_string()).collect();
        assert_eq!(ids, vec!["example/forum", "example/chat"]);
    }

    #[test]
    fn missing_plugins_key_means_none() {
        let config = InstanceConfig::from_yaml("{}").unwrap();
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn duplicate_plugin_rejected() {
        let err = InstanceConfig::from_yaml("plugins: [example/forum, example/forum]").unwrap_err();
        assert!(matches!(err, InstanceError::DuplicatePlugin(id) if id.to_string() == "example/forum"));
    }

    #[test]
    fn malformed_plugin_id_rejected() {
        let err = InstanceConfig::from_yaml("plugins: [forum]").unwrap_err();
        assert!(matches!(err, InstanceError::Yaml(_)));
    }

    #[test]
    fn yaml_round_trip() {
        let config = InstanceConfig::from_yaml("plugins: [example/forum]").unwrap();
        assert_eq!(InstanceConfig::from_yaml(&config.to_yaml().unwrap()).unwrap(), config);
    }
}
