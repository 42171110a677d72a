//! End-to-end tests for `Session`: declaration file in, state file out,
//! with a mock Admin API in between.

use httpmock::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tether_cli::Session;
use tether_cli::persist;
use tether_client::AdminClient;
use tether_core::ResourceData;
use tether_reconcile::PluginReconciler;

const DECLARATIONS: &str = r#"
plugins:
  svc-limit:
    name: rate-limiting
    protocols: [http, https]
    service: svc-123
    tags: [team-a]
    config:
      minute: 20
"#;

struct Fixture {
    _dir: TempDir,
    decls: PathBuf,
    state: PathBuf,
}

fn fixture(decls: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let decl_path = dir.path().join("plugins.yaml");
    std::fs::write(&decl_path, decls).unwrap();
    Fixture {
        decls: decl_path,
        state: dir.path().join("state").join("tether-state.json"),
        _dir: dir,
    }
}

fn session(server: &MockServer, state: &Path) -> Session {
    let client = AdminClient::with_http(reqwest::Client::new(), &server.base_url()).unwrap();
    Session::new(PluginReconciler::new(client), state.to_path_buf())
}

fn plugin_body(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "rate-limiting",
        "config": {"minute": 20},
        "protocols": ["http", "https"],
        "tags": ["team-a"],
        "enabled": true
    })
}

#[tokio::test]
async fn create_records_gateway_id_in_state_file() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path("/services/svc-123/plugins/").json_body(json!({
            "name": "rate-limiting",
            "config": {"minute": 20},
            "protocols": ["http", "https"],
            "tags": ["team-a"],
            "enabled": true
        }));
        then.status(201).json_body(plugin_body("p-1"));
    });

    let fx = fixture(DECLARATIONS);
    let d = session(&server, &fx.state)
        .create("svc-limit", &fx.decls)
        .await
        .unwrap();

    m.assert();
    assert_eq!(d.id(), "p-1");
    let state = persist::load_state(&fx.state).unwrap();
    assert_eq!(state.resources["svc-limit"].id(), "p-1");
    assert_eq!(state.resources["svc-limit"].get_string("service"), "svc-123");
}

#[tokio::test]
async fn create_twice_is_refused_without_a_request() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path("/services/svc-123/plugins/");
        then.status(201).json_body(plugin_body("p-1"));
    });

    let fx = fixture(DECLARATIONS);
    let s = session(&server, &fx.state);
    s.create("svc-limit", &fx.decls).await.unwrap();
    let err = s.create("svc-limit", &fx.decls).await.unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(m.calls(), 1);
}

#[tokio::test]
async fn read_of_deleted_plugin_drops_it_from_state() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/services/svc-123/plugins/");
        then.status(201).json_body(plugin_body("p-1"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/plugins/p-1");
        then.status(404);
    });

    let fx = fixture(DECLARATIONS);
    let s = session(&server, &fx.state);
    s.create("svc-limit", &fx.decls).await.unwrap();

    let refreshed = s.read("svc-limit").await.unwrap();
    assert!(refreshed.is_none());
    assert!(persist::load_state(&fx.state).unwrap().resources.is_empty());
}

#[tokio::test]
async fn update_sends_stored_id() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/services/svc-123/plugins/");
        then.status(201).json_body(plugin_body("p-1"));
    });
    let patch = server.mock(|when, then| {
        when.method(PATCH).path("/plugins/p-1");
        then.status(200).json_body(plugin_body("p-1"));
    });

    let fx = fixture(DECLARATIONS);
    let s = session(&server, &fx.state);
    s.create("svc-limit", &fx.decls).await.unwrap();
    let d = s.update("svc-limit", &fx.decls).await.unwrap();

    patch.assert();
    assert_eq!(d.id(), "p-1");
}

#[tokio::test]
async fn delete_removes_record() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/services/svc-123/plugins/");
        then.status(201).json_body(plugin_body("p-1"));
    });
    let del = server.mock(|when, then| {
        when.method(DELETE).path("/plugins/p-1");
        then.status(204);
    });

    let fx = fixture(DECLARATIONS);
    let s = session(&server, &fx.state);
    s.create("svc-limit", &fx.decls).await.unwrap();
    s.delete("svc-limit").await.unwrap();

    del.assert();
    assert!(persist::load_state(&fx.state).unwrap().resources.is_empty());
    assert!(s.delete("svc-limit").await.is_err());
}

#[tokio::test]
async fn import_adopts_existing_plugin() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/plugins/p-existing");
        then.status(200).json_body(plugin_body("p-existing"));
    });

    let fx = fixture(DECLARATIONS);
    let d = session(&server, &fx.state)
        .import("svc-limit", "p-existing", Some(&fx.decls))
        .await
        .unwrap();

    assert_eq!(d.id(), "p-existing");
    // no scope echoed: the declared one is kept
    assert_eq!(d.get_string("service"), "svc-123");
    assert!(persist::load_state(&fx.state).unwrap().resources.contains_key("svc-limit"));
}

#[tokio::test]
async fn import_of_missing_plugin_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/plugins/nope");
        then.status(404);
    });

    let fx = fixture(DECLARATIONS);
    let err = session(&server, &fx.state)
        .import("svc-limit", "nope", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    assert!(!fx.state.exists());
}

#[tokio::test]
async fn create_with_undeclared_resource_fails() {
    let server = MockServer::start();
    let fx = fixture(DECLARATIONS);
    let err = session(&server, &fx.state)
        .create("nope", &fx.decls)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("no plugin named \"nope\""));
}

#[test]
fn schema_lists_every_attribute() {
    let server = MockServer::start();
    let fx = fixture(DECLARATIONS);
    let lines = session(&server, &fx.state).schema();
    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("name"));
    assert!(lines.iter().any(|l| l.starts_with("enabled") && l.contains("default true")));
}
