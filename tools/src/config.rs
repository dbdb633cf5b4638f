//! CLI configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use net::NetConfig;
use scene::SyncConfig;
use serde::Deserialize;

/// Contents of the `--config` JSON file. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub sync: SyncConfig,
    pub net: NetConfig,
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::ComponentKind;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ToolConfig::parse("{}").unwrap(), ToolConfig::default());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = ToolConfig::parse(
            r#"{
                "sync": { "tick_rate_hz": 10, "kinds": ["transform", "text"] },
                "net": { "nodelay": false }
            }"#,
        )
        .unwrap();
        assert!((config.sync.tick_rate_hz - 10.0).abs() < f32::EPSILON);
        assert_eq!(
            config.sync.kinds,
            vec![ComponentKind::Transform, ComponentKind::Text]
        );
        assert!(!config.net.nodelay);
        assert_eq!(config.net.max_frame_bytes, NetConfig::default().max_frame_bytes);
    }

    #[test]
    fn unknown_section_rejected() {
        assert!(ToolConfig::parse(r#"{ "metrics": {} }"#).is_err());
    }
}
