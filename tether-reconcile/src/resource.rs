use crate::error::ReconcileError;
use async_trait::async_trait;
use tether_core::{ResourceData, Schema, TetherError};

/// Lifecycle contract a declarative orchestrator drives.
///
/// Each call is one Admin API round trip against a single record. A `read`
/// that leaves the id empty means the remote object is gone.
#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> &Schema;

    async fn create(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError>;

    async fn read(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError>;

    async fn update(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError>;

    async fn delete(&self, d: &mut dyn ResourceData) -> Result<(), ReconcileError>;

    /// Adopt an existing remote object. The id is taken verbatim.
    fn import(&self, d: &mut dyn ResourceData, id: &str) -> Result<(), ReconcileError> {
        if id.is_empty() {
            return Err(TetherError::Validation("import id must not be empty".into()).into());
        }
        check_id(id)?;
        d.set_id(id);
        Ok(())
    }
}

/// Reject ids that a URL path would resolve away (`.` and `..`).
pub(crate) fn check_id(id: &str) -> Result<(), TetherError> {
    if matches!(id, "." | "..") {
        return Err(TetherError::Validation(format!(
            "plugin id \"{id}\" is not a valid path segment"
        )));
    }
    Ok(())
}
