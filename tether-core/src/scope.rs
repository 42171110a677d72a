use crate::error::TetherError;
use crate::state::ResourceData;
use serde_json::Value;
use std::fmt;

pub const SCOPE_KEYS: [&str; 3] = ["service", "route", "consumer"];

/// Parent resource a plugin is bound to. `Global` applies everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Global,
    Service(String),
    Route(String),
    Consumer(String),
}

impl Scope {
    /// Build the scope from declared state.
    ///
    /// Empty strings count as unset. More than one set field is rejected.
    pub fn from_resource(d: &dyn ResourceData) -> Result<Self, TetherError> {
        let set: Vec<(&'static str, String)> = SCOPE_KEYS
            .iter()
            .filter_map(|&key| {
                d.get_ok(key)
                    .and_then(Value::as_str)
                    .map(|id| (key, id.to_string()))
            })
            .collect();

        match set.as_slice() {
            [] => Ok(Scope::Global),
            [(key, id)] => Ok(Self::from_key(key, id.clone())),
            [(first, _), (second, _), ..] => Err(TetherError::ConflictingScope {
                first: *first,
                second: *second,
            }),
        }
    }

    fn from_key(key: &str, id: String) -> Self {
        match key {
            "service" => Scope::Service(id),
            "route" => Scope::Route(id),
            "consumer" => Scope::Consumer(id),
            _ => Scope::Global,
        }
    }

    /// Attribute key holding this scope's id, `None` for global.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Scope::Global => None,
            Scope::Service(_) => Some("service"),
            Scope::Route(_) => Some("route"),
            Scope::Consumer(_) => Some("consumer"),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Service(id) | Scope::Route(id) | Scope::Consumer(id) => Some(id),
        }
    }

    /// Admin API collection of the parent resource and its id.
    pub fn path_prefix(&self) -> Option<(&'static str, &str)> {
        match self {
            Scope::Global => None,
            Scope::Service(id) => Some(("services", id)),
            Scope::Route(id) => Some(("routes", id)),
            Scope::Consumer(id) => Some(("consumers", id)),
        }
    }

    /// Write this scope into the record; the other two keys are cleared.
    pub fn write_to(&self, d: &mut dyn ResourceData) {
        for key in SCOPE_KEYS {
            let value = if self.key() == Some(key) {
                self.id().unwrap_or_default()
            } else {
                ""
            };
            d.set(key, Value::String(value.to_string()));
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path_prefix() {
            None => write!(f, "global"),
            Some((collection, id)) => write!(f, "{collection}/{id}"),
        }
    }
}
