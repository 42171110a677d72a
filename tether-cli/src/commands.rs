use crate::persist::{self, StateFile};
use anyhow::{Context, Result, anyhow, bail};
use std::path::{Path, PathBuf};
use tether_core::{Declarations, ResourceData, ResourceState};
use tether_reconcile::{PluginReconciler, Resource};
use tracing::info;

/// One CLI invocation: a reconciler plus the state file it records into.
///
/// Each method runs exactly one reconciler operation and persists the
/// resulting record.
pub struct Session {
    reconciler: PluginReconciler,
    state_path: PathBuf,
}

impl Session {
    pub fn new(reconciler: PluginReconciler, state_path: PathBuf) -> Self {
        Self {
            reconciler,
            state_path,
        }
    }

    fn declared(file: &Path, resource: &str) -> Result<ResourceState> {
        let decls = Declarations::load(file)
            .with_context(|| format!("failed to load declarations from {}", file.display()))?;
        Ok(decls.get(resource)?.to_resource_state()?)
    }

    fn stored(state: &StateFile, resource: &str) -> Result<ResourceState> {
        state
            .resources
            .get(resource)
            .filter(|d| d.exists())
            .cloned()
            .ok_or_else(|| anyhow!("\"{resource}\" is not in the state file"))
    }

    pub async fn create(&self, resource: &str, file: &Path) -> Result<ResourceState> {
        let mut state = persist::load_state(&self.state_path)?;
        if let Some(existing) = state.resources.get(resource).filter(|d| d.exists()) {
            bail!(
                "\"{resource}\" already exists with id {}; use `tether update`",
                existing.id()
            );
        }

        let mut d = Self::declared(file, resource)?;
        self.reconciler.create(&mut d).await?;

        state.resources.insert(resource.to_string(), d.clone());
        persist::save_state(&self.state_path, &state)?;
        Ok(d)
    }

    /// Refresh a stored record. Returns `None` when the plugin is gone; the
    /// record is then dropped from the state file.
    pub async fn read(&self, resource: &str) -> Result<Option<ResourceState>> {
        let mut state = persist::load_state(&self.state_path)?;
        let mut d = Self::stored(&state, resource)?;

        self.reconciler.read(&mut d).await?;

        let result = if d.exists() {
            state.resources.insert(resource.to_string(), d.clone());
            Some(d)
        } else {
            info!(resource, "Plugin is gone from the gateway, dropping it from state");
            state.resources.remove(resource);
            None
        };
        persist::save_state(&self.state_path, &state)?;
        Ok(result)
    }

    pub async fn update(&self, resource: &str, file: &Path) -> Result<ResourceState> {
        let mut state = persist::load_state(&self.state_path)?;
        let stored = Self::stored(&state, resource)?;

        let mut d = Self::declared(file, resource)?;
        d.set_id(stored.id());
        self.reconciler.update(&mut d).await?;

        state.resources.insert(resource.to_string(), d.clone());
        persist::save_state(&self.state_path, &state)?;
        Ok(d)
    }

    pub async fn delete(&self, resource: &str) -> Result<()> {
        let mut state = persist::load_state(&self.state_path)?;
        let mut d = Self::stored(&state, resource)?;

        self.reconciler.delete(&mut d).await?;

        state.resources.remove(resource);
        persist::save_state(&self.state_path, &state)
    }

    /// Adopt an existing gateway plugin under `resource`, then read it.
    pub async fn import(
        &self,
        resource: &str,
        id: &str,
        file: Option<&Path>,
    ) -> Result<ResourceState> {
        let mut state = persist::load_state(&self.state_path)?;
        if state.resources.get(resource).is_some_and(|d| d.exists()) {
            bail!("\"{resource}\" is already managed");
        }

        let mut d = match file {
            Some(file) => Self::declared(file, resource)?,
            None => ResourceState::new(),
        };
        self.reconciler.import(&mut d, id)?;
        self.reconciler.read(&mut d).await?;
        if !d.exists() {
            bail!("plugin {id} does not exist on the gateway");
        }

        state.resources.insert(resource.to_string(), d.clone());
        persist::save_state(&self.state_path, &state)?;
        Ok(d)
    }

    pub fn show(&self, resource: Option<&str>) -> Result<serde_json::Value> {
        let state = persist::load_state(&self.state_path)?;
        match resource {
            Some(name) => Ok(serde_json::to_value(Self::stored(&state, name)?)?),
            None => Ok(serde_json::to_value(&state.resources)?),
        }
    }

    /// Attribute table for `tether schema`.
    pub fn schema(&self) -> Vec<String> {
        self.reconciler
            .schema()
            .fields
            .iter()
            .map(|f| {
                let mut flags = vec![if f.required { "required" } else { "optional" }];
                if !f.conflicts_with.is_empty() {
                    flags.push("exclusive");
                }
                let default = f
                    .default
                    .as_ref()
                    .map(|v| format!(" (default {v})"))
                    .unwrap_or_default();
                format!(
                    "{:<12} {:<16} {}{} {}",
                    f.name,
                    format!("{:?}", f.kind).to_lowercase(),
                    flags.join(","),
                    default,
                    f.description
                )
            })
            .collect()
    }
}
