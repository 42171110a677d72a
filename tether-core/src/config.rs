use crate::error::TetherError;
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level Tether configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TetherConfig {
    #[serde(default)]
    pub admin: AdminApiConfig,
    #[serde(default)]
    pub state: StateConfig,
}

/// Gateway Admin API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminApiConfig {
    /// Base URL of the Admin API.
    #[serde(default = "default_admin_url")]
    pub url: String,
    /// Admin token sent with every request (optional).
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Transport timeout. Unset means the request waits for the gateway.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Extra static headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Local state file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_admin_url() -> String { "http://localhost:8001/".into() }
fn default_api_key_header() -> String { "Kong-Admin-Token".into() }
fn default_state_path() -> PathBuf { PathBuf::from("tether-state.json") }

// ── Impls ─────────────────────────────────────────────────────

impl Default for AdminApiConfig {
    fn default() -> Self {
        Self {
            url: default_admin_url(),
            api_key: None,
            api_key_header: default_api_key_header(),
            timeout_ms: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl TetherConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> Result<Self, TetherError> {
        Self::figment(path)
            .extract()
            .map_err(|e| TetherError::Config(e.to_string()))
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("TETHER_").split("__"))
    }
}
