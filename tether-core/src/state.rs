use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Accessor over one declared resource record.
///
/// An empty id means the resource does not exist on the gateway side.
/// `get_ok` distinguishes "unset" from "set": zero values (empty string,
/// empty list, `false`, `0`, `null`) report as unset.
pub trait ResourceData: Send {
    fn id(&self) -> &str;

    fn set_id(&mut self, id: &str);

    fn get(&self, key: &str) -> Option<&Value>;

    fn set(&mut self, key: &str, value: Value);

    /// Keys currently present in the record.
    fn keys(&self) -> Vec<String>;

    fn get_ok(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !is_zero(v))
    }

    fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    /// String elements of a list attribute; non-string elements are skipped.
    fn get_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Zero value check used by [`ResourceData::get_ok`].
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// In-memory resource record, as stored in the state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// True once the gateway has assigned an id.
    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }
}

impl ResourceData for ResourceState {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.attributes.insert(key.to_string(), value);
    }

    fn keys(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }
}
