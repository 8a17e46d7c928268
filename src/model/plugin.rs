//! Plugins installed on the server.

use super::json;
use crate::error::{ParsingError, Result};
use serde_json::Value;

/// A dependency of a plugin on another plugin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginDependency {
    /// Short name of the dependency
    pub short_name: Option<String>,
    /// Required version
    pub version: Option<String>,
    /// Whether the dependency is optional
    pub optional: bool,
}

/// A single installed plugin
#[derive(Clone, Debug)]
pub struct Plugin {
    /// Machine-readable short name
    pub short_name: String,
    /// Human-readable long name
    pub long_name: Option<String>,
    /// Installed version
    pub version: Option<String>,
    /// Whether the plugin is active
    pub active: bool,
    /// Whether the plugin is enabled
    pub enabled: bool,
    /// Whether a newer version is available
    pub has_update: bool,
    /// Dependencies on other plugins
    pub dependencies: Vec<PluginDependency>,
}

impl Plugin {
    fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let dependencies = json::array_or_empty(object, "dependencies")
            .iter()
            .filter_map(Value::as_object)
            .map(|dependency| PluginDependency {
                short_name: json::optional_str(dependency, "shortName"),
                version: json::optional_str(dependency, "version"),
                optional: json::optional_bool(dependency, "optional").unwrap_or(false),
            })
            .collect();

        Ok(Plugin {
            short_name: json::required_str(object, "shortName")?.to_string(),
            long_name: json::optional_str(object, "longName"),
            version: object.get("version").and_then(version_string),
            active: json::optional_bool(object, "active").unwrap_or(false),
            enabled: json::optional_bool(object, "enabled").unwrap_or(false),
            has_update: json::optional_bool(object, "hasUpdate").unwrap_or(false),
            dependencies,
        })
    }
}

/// The plugin list payload
#[derive(Clone, Debug)]
pub struct PluginList {
    /// All installed plugins
    pub plugins: Vec<Plugin>,
}

impl PluginList {
    /// Loose-decode a plugin list payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let plugins = json::required(object, "plugins")?
            .as_array()
            .ok_or(ParsingError::DataNotCorrectFormat)?;
        Ok(PluginList {
            plugins: plugins
                .iter()
                .map(Plugin::parse)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// Versions arrive as strings or bare numbers depending on the plugin.
fn version_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
