use crate::scope::Scope;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Plugin attachment as exchanged with the gateway Admin API.
///
/// Scope fields are read from responses only; the gateway takes the scope
/// from the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(
        rename = "config",
        default,
        skip_serializing_if = "Map::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub configuration: Map<String, Value>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub protocols: Vec<String>,

    #[serde(default, skip_serializing, deserialize_with = "scope_ref")]
    pub service: Option<String>,

    #[serde(default, skip_serializing, deserialize_with = "scope_ref")]
    pub route: Option<String>,

    #[serde(default, skip_serializing, deserialize_with = "scope_ref")]
    pub consumer: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for Plugin {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            configuration: Map::new(),
            protocols: Vec::new(),
            service: None,
            route: None,
            consumer: None,
            tags: Vec::new(),
            enabled: true,
        }
    }
}

impl Plugin {
    /// The scope echoed by the gateway, if exactly one field names it.
    pub fn echoed_scope(&self) -> Option<Scope> {
        match (&self.service, &self.route, &self.consumer) {
            (Some(s), None, None) => Some(Scope::Service(s.clone())),
            (None, Some(r), None) => Some(Scope::Route(r.clone())),
            (None, None, Some(c)) => Some(Scope::Consumer(c.clone())),
            _ => None,
        }
    }
}

/// Scope reference in a response: a bare id (pre-1.0 gateways) or `{"id": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeRef {
    Id(String),
    Object { id: String },
}

fn scope_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<ScopeRef> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|r| match r {
            ScopeRef::Id(id) | ScopeRef::Object { id } => id,
        })
        .filter(|id| !id.is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
