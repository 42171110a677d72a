//! Attribute schema for declared resources.
//!
//! Carries the checks a declarative framework would normally run before
//! calling into a resource: required attributes, attribute kinds, defaults
//! and mutually exclusive attributes.

use crate::error::TetherError;
use crate::state::ResourceData;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    /// List of strings.
    List,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::List => "list of strings",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub conflicts_with: &'static [&'static str],
    pub description: &'static str,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            conflicts_with: &[],
            description: "",
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    fn conflicts_with(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts_with = names;
        self
    }

    fn describe(mut self, text: &'static str) -> Self {
        self.description = text;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Schema of the plugin resource.
    pub fn plugin() -> Self {
        Self {
            fields: vec![
                Field::new("name", FieldKind::String)
                    .required()
                    .describe("The name of the plugin to use."),
                Field::new("protocols", FieldKind::List)
                    .required()
                    .describe("Request protocols that trigger this plugin."),
                Field::new("config_json", FieldKind::String)
                    .describe("Plugin configuration as a JSON object."),
                Field::new("service", FieldKind::String)
                    .conflicts_with(&["route", "consumer"])
                    .describe("Id of the service to scope this plugin to."),
                Field::new("route", FieldKind::String)
                    .conflicts_with(&["service", "consumer"])
                    .describe("Id of the route to scope this plugin to."),
                Field::new("consumer", FieldKind::String)
                    .conflicts_with(&["service", "route"])
                    .describe("Id of the consumer to scope this plugin to."),
                Field::new("tags", FieldKind::List)
                    .describe("Free-form labels for grouping and filtering."),
                Field::new("enabled", FieldKind::Bool)
                    .default_value(Value::Bool(true))
                    .describe("Whether the plugin is applied."),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fill in defaults for attributes that are absent or null.
    pub fn apply_defaults(&self, d: &mut dyn ResourceData) {
        for field in &self.fields {
            if let Some(default) = &field.default
                && d.get(field.name).is_none_or(Value::is_null)
            {
                d.set(field.name, default.clone());
            }
        }
    }

    pub fn validate(&self, d: &dyn ResourceData) -> Result<(), TetherError> {
        for key in d.keys() {
            if self.field(&key).is_none() {
                return Err(TetherError::Validation(format!(
                    "unknown attribute \"{key}\""
                )));
            }
        }

        for field in &self.fields {
            if let Some(value) = d.get(field.name)
                && !value.is_null()
                && !field.kind.accepts(value)
            {
                return Err(TetherError::Validation(format!(
                    "attribute \"{}\" must be a {}",
                    field.name,
                    field.kind.name()
                )));
            }

            if field.required && d.get_ok(field.name).is_none() {
                return Err(TetherError::Validation(format!(
                    "attribute \"{}\" is required",
                    field.name
                )));
            }

            if d.get_ok(field.name).is_some() {
                for other in field.conflicts_with {
                    if d.get_ok(other).is_some() {
                        return Err(TetherError::ConflictingScope {
                            first: field.name,
                            second: *other,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
