use serde_json::json;
use tether_core::{Declarations, Plugin, ResourceData, Schema, Scope, TetherError};

// =============================================================================
// Declaration → record → schema
// =============================================================================

#[test]
fn test_declared_plugin_passes_schema_after_defaults() {
    let yaml = r#"
plugins:
  consumer-acl:
    name: acl
    protocols: [http, https]
    consumer: c-42
    config_json: '{"allow": ["admins"]}'
"#;
    let decls = Declarations::from_yaml(yaml).unwrap();
    let mut d = decls.get("consumer-acl").unwrap().to_resource_state().unwrap();

    let schema = Schema::plugin();
    schema.apply_defaults(&mut d);
    schema.validate(&d).unwrap();

    assert!(d.get_bool("enabled"));
    assert_eq!(Scope::from_resource(&d).unwrap(), Scope::Consumer("c-42".into()));
}

#[test]
fn test_declared_plugin_with_two_scopes_fails_schema() {
    let yaml = r#"
plugins:
  broken:
    name: acl
    protocols: [http]
    service: s-1
    route: r-1
"#;
    let decls = Declarations::from_yaml(yaml).unwrap();
    let d = decls.get("broken").unwrap().to_resource_state().unwrap();

    let err = Schema::plugin().validate(&d).unwrap_err();
    assert!(matches!(err, TetherError::ConflictingScope { .. }));
    assert!(Scope::from_resource(&d).is_err());
}

#[test]
fn test_declared_plugin_without_protocols_fails_schema() {
    let decls = Declarations::from_yaml("plugins:\n  p:\n    name: cors\n").unwrap();
    let d = decls.get("p").unwrap().to_resource_state().unwrap();
    let err = Schema::plugin().validate(&d).unwrap_err();
    assert!(err.to_string().contains("\"protocols\" is required"));
}

// =============================================================================
// Plugin wire object
// =============================================================================

#[test]
fn test_plugin_response_from_pre_1_0_gateway() {
    let p: Plugin = serde_json::from_value(json!({
        "id": "p-1",
        "name": "basic-auth",
        "consumer_id": "ignored",
        "service": "svc-1",
        "config": null,
        "protocols": null,
        "enabled": false
    }))
    .unwrap();
    assert!(p.configuration.is_empty());
    assert!(p.protocols.is_empty());
    assert!(!p.enabled);
    assert_eq!(p.echoed_scope(), Some(Scope::Service("svc-1".into())));
}

#[test]
fn test_plugin_response_roundtrip_drops_scope() {
    let p: Plugin = serde_json::from_value(json!({
        "id": "p-1",
        "name": "cors",
        "route": {"id": "r-1"},
        "tags": ["edge"],
        "enabled": true
    }))
    .unwrap();
    let out = serde_json::to_value(&p).unwrap();
    assert!(out.get("route").is_none());
    assert_eq!(out["tags"], json!(["edge"]));
}
