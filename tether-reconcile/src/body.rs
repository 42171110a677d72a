//! Request bodies for create and update.

use serde_json::{Map, Value};
use tether_client::RequestBody;
use tether_core::{Plugin, ResourceData, TetherError};

/// Build the wire object from declared state. Configuration is not set here.
pub fn plugin_from_resource(d: &dyn ResourceData) -> Plugin {
    let scope_id = |key: &str| Some(d.get_string(key)).filter(|s| !s.is_empty());
    Plugin {
        id: d.id().to_string(),
        name: d.get_string("name"),
        configuration: Map::new(),
        protocols: d.get_list("protocols"),
        service: scope_id("service"),
        route: scope_id("route"),
        consumer: scope_id("consumer"),
        tags: d.get_list("tags"),
        enabled: d.get_bool("enabled"),
    }
}

/// Parse `config_json` into a JSON object.
pub fn parse_config(raw: &str) -> Result<Map<String, Value>, TetherError> {
    serde_json::from_str(raw).map_err(TetherError::InvalidConfigJson)
}

/// Body for create/update.
///
/// With a non-empty `config_json` the whole plugin is sent as JSON. Without
/// one only `name` is sent, form-urlencoded.
pub fn build_modify_body(d: &dyn ResourceData) -> Result<RequestBody, TetherError> {
    let mut plugin = plugin_from_resource(d);

    match d.get_ok("config_json").and_then(Value::as_str) {
        Some(raw) => {
            plugin.configuration = parse_config(raw)?;
            Ok(RequestBody::json(&plugin)?)
        }
        None => Ok(RequestBody::form([("name", plugin.name)])),
    }
}
