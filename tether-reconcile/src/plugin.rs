use crate::body::build_modify_body;
use crate::error::ReconcileError;
use crate::resource::{Resource, check_id};
use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::json;
use tether_client::{AdminClient, RequestBuilder, Response};
use tether_core::{Plugin, ResourceData, Schema, Scope, TetherError};
use tracing::{debug, info, warn};

/// Reconciles one declared plugin attachment against the Admin API.
///
/// Create and update address `[<scope>/<id>/]plugins/`; read and delete use
/// the scope-independent `plugins/<id>` endpoint.
pub struct PluginReconciler {
    client: AdminClient,
    schema: Schema,
}

impl PluginReconciler {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            schema: Schema::plugin(),
        }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    /// Defaults, schema checks and the single active scope.
    fn prepare(&self, d: &mut dyn ResourceData) -> Result<Scope, TetherError> {
        self.schema.apply_defaults(d);
        self.schema.validate(d)?;
        Scope::from_resource(d)
    }

    fn scoped_request(&self, scope: &Scope) -> RequestBuilder {
        let request = self.client.request();
        match scope.path_prefix() {
            Some((collection, id)) => request.path(&format!("{collection}/")).segment(id),
            None => request,
        }
    }

    fn stored_id(d: &dyn ResourceData) -> Result<String, TetherError> {
        match d.id() {
            "" => Err(TetherError::MissingId),
            id => {
                check_id(id)?;
                Ok(id.to_string())
            }
        }
    }
}

/// Write a gateway response back into the record.
///
/// The gateway does not echo the scope consistently across versions; when it
/// does not name exactly one, the declared scope is kept.
fn write_back(d: &mut dyn ResourceData, plugin: &Plugin, declared: &Scope) {
    d.set_id(&plugin.id);
    d.set("name", json!(plugin.name));
    d.set("protocols", json!(plugin.protocols));

    let scope = plugin.echoed_scope().unwrap_or_else(|| declared.clone());
    if &scope != declared {
        debug!(declared = %declared, reported = %scope, "Gateway reports a different scope");
    }
    scope.write_to(d);

    d.set("tags", json!(plugin.tags));
    d.set("enabled", json!(plugin.enabled));
}

fn expect_body(resp: Response<Plugin>, action: &'static str) -> Result<Plugin, ReconcileError> {
    resp.body.ok_or(ReconcileError::EmptyResponse { action })
}

#[async_trait]
impl Resource for PluginReconciler {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError> {
        let scope = self.prepare(d)?;
        let body = build_modify_body(d)?;

        let resp = self
            .scoped_request(&scope)
            .post("plugins/")
            .body(body)
            .receive::<Plugin>()
            .await
            .map_err(ReconcileError::transport("creating"))?;

        match resp.status {
            StatusCode::CREATED => {}
            StatusCode::CONFLICT => return Err(ReconcileError::Conflict),
            status => return Err(ReconcileError::UnexpectedStatus(status)),
        }

        let plugin = expect_body(resp, "creating")?;
        info!(id = %plugin.id, name = %plugin.name, scope = %scope, "Plugin created");
        write_back(d, &plugin, &scope);
        Ok(())
    }

    async fn read(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError> {
        let id = Self::stored_id(d)?;
        let scope = Scope::from_resource(d)?;

        let resp = self
            .client
            .request()
            .path("plugins/")
            .segment(&id)
            .method(Method::GET)
            .receive::<Plugin>()
            .await
            .map_err(ReconcileError::transport("reading"))?;

        match resp.status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                warn!(id = %id, "Plugin no longer exists, clearing stored id");
                d.set_id("");
                return Ok(());
            }
            status => return Err(ReconcileError::UnexpectedStatus(status)),
        }

        let plugin = expect_body(resp, "reading")?;
        debug!(id = %plugin.id, name = %plugin.name, "Plugin read");
        write_back(d, &plugin, &scope);
        Ok(())
    }

    async fn update(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError> {
        let id = Self::stored_id(d)?;
        let scope = self.prepare(d)?;
        let body = build_modify_body(d)?;

        let resp = self
            .client
            .request()
            .path("plugins/")
            .segment(&id)
            .method(Method::PATCH)
            .body(body)
            .receive::<Plugin>()
            .await
            .map_err(ReconcileError::transport("updating"))?;

        if resp.status != StatusCode::OK {
            return Err(ReconcileError::UnexpectedStatus(resp.status));
        }

        let plugin = expect_body(resp, "updating")?;
        info!(id = %plugin.id, name = %plugin.name, scope = %scope, "Plugin updated");
        write_back(d, &plugin, &scope);
        Ok(())
    }

    async fn delete(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError> {
        let id = Self::stored_id(d)?;

        let status = self
            .client
            .request()
            .path("plugins/")
            .segment(&id)
            .method(Method::DELETE)
            .send()
            .await
            .map_err(ReconcileError::transport("deleting"))?;

        if status != StatusCode::NO_CONTENT {
            return Err(ReconcileError::UnexpectedStatus(status));
        }

        info!(id = %id, "Plugin deleted");
        d.set_id("");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::ResourceState;

    fn reconciler() -> PluginReconciler {
        let client =
            AdminClient::with_http(reqwest::Client::new(), "http://localhost:8001/").unwrap();
        PluginReconciler::new(client)
    }

    #[test]
    fn scoped_request_paths() {
        let r = reconciler();
        let cases = [
            (Scope::Service("svc-123".into()), "http://localhost:8001/services/svc-123/plugins/"),
            (Scope::Route("r-1".into()), "http://localhost:8001/routes/r-1/plugins/"),
            (Scope::Consumer("c-1".into()), "http://localhost:8001/consumers/c-1/plugins/"),
            (Scope::Global, "http://localhost:8001/plugins/"),
        ];
        for (scope, expected) in cases {
            let url = r.scoped_request(&scope).post("plugins/").url().unwrap();
            assert_eq!(url.as_str(), expected);
        }
    }

    #[test]
    fn write_back_falls_back_to_declared_scope() {
        let mut d = ResourceState::new();
        let plugin = Plugin {
            id: "p-1".into(),
            name: "cors".into(),
            protocols: vec!["http".into()],
            ..Plugin::default()
        };
        write_back(&mut d, &plugin, &Scope::Route("r-1".into()));
        assert_eq!(d.id(), "p-1");
        assert_eq!(d.get_string("route"), "r-1");
        assert_eq!(d.get_string("service"), "");
        assert_eq!(d.get_string("consumer"), "");
        assert!(d.get_bool("enabled"));
    }

    #[test]
    fn write_back_prefers_echoed_scope() {
        let mut d = ResourceState::new();
        let plugin = Plugin {
            id: "p-1".into(),
            consumer: Some("c-9".into()),
            ..Plugin::default()
        };
        write_back(&mut d, &plugin, &Scope::Consumer("c-1".into()));
        assert_eq!(d.get_string("consumer"), "c-9");
    }

    #[test]
    fn stored_id_required() {
        let d = ResourceState::new();
        assert!(matches!(
            PluginReconciler::stored_id(&d),
            Err(TetherError::MissingId)
        ));
    }

    #[test]
    fn import_is_passthrough() {
        let r = reconciler();
        let mut d = ResourceState::new();
        r.import(&mut d, "  weird id  ").unwrap();
        assert_eq!(d.id(), "  weird id  ");
        assert!(r.import(&mut d, "").is_err());
        assert!(r.import(&mut d, "..").is_err());
    }

    #[test]
    fn stored_id_rejects_dot_segments() {
        let mut d = ResourceState::new();
        d.set_id(".");
        assert!(matches!(
            PluginReconciler::stored_id(&d),
            Err(TetherError::Validation(_))
        ));
    }
}
