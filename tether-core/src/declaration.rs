use crate::error::TetherError;
use crate::state::ResourceState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::Path;

/// Declaration file: named plugin resources.
///
/// ```yaml
/// plugins:
///   svc-rate-limit:
///     name: rate-limiting
///     protocols: [http, https]
///     service: svc-123
///     config:
///       minute: 20
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginDeclaration>,
}

/// Desired state of one plugin attachment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginDeclaration {
    pub name: String,
    #[serde(default)]
    pub protocols: Vec<String>,
    /// Plugin configuration as a mapping.
    pub config: Option<Map<String, Value>>,
    /// Plugin configuration as a raw JSON string.
    pub config_json: Option<String>,
    pub service: Option<String>,
    pub route: Option<String>,
    pub consumer: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub enabled: Option<bool>,
}

impl Declarations {
    pub fn load(path: &Path) -> Result<Self, TetherError> {
        let data = std::fs::read_to_string(path)?;
        let decls = Self::from_yaml(&data)?;
        tracing::debug!(path = %path.display(), plugins = decls.plugins.len(), "Declarations loaded");
        Ok(decls)
    }

    pub fn from_yaml(data: &str) -> Result<Self, TetherError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn get(&self, resource: &str) -> Result<&PluginDeclaration, TetherError> {
        self.plugins.get(resource).ok_or_else(|| {
            TetherError::Validation(format!("no plugin named \"{resource}\" is declared"))
        })
    }
}

impl PluginDeclaration {
    /// Flatten into a resource record. `enabled` is left unset when not
    /// declared so the schema default applies.
    pub fn to_resource_state(&self) -> Result<ResourceState, TetherError> {
        let config_json = match (&self.config, &self.config_json) {
            (Some(_), Some(_)) => {
                return Err(TetherError::Validation(
                    "only one of \"config\" and \"config_json\" may be set".into(),
                ));
            }
            (Some(map), None) => Some(serde_json::to_string(map)?),
            (None, raw) => raw.clone(),
        };

        let mut attrs = Map::new();
        attrs.insert("name".into(), json!(self.name));
        attrs.insert("protocols".into(), json!(self.protocols));
        if let Some(raw) = config_json {
            attrs.insert("config_json".into(), Value::String(raw));
        }
        for (key, value) in [
            ("service", &self.service),
            ("route", &self.route),
            ("consumer", &self.consumer),
        ] {
            attrs.insert(key.into(), json!(value.clone().unwrap_or_default()));
        }
        attrs.insert("tags".into(), json!(self.tags));
        if let Some(enabled) = self.enabled {
            attrs.insert("enabled".into(), Value::Bool(enabled));
        }

        Ok(ResourceState::with_attributes(attrs))
    }
}
