//! File-based state for declared resources.
//!
//! Every operation that changes a record rewrites the whole state file. The
//! file is written atomically: first to a `.tmp` sibling, then renamed over
//! the final path, so a crash mid-write never corrupts the stored ids.
//!
//! Unlike a cache, losing this file means losing gateway ids, so a malformed
//! file is an error rather than a fresh start.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tether_core::ResourceState;

const STATE_VERSION: u32 = 1;

/// The shape serialized to / deserialized from the state file.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
        }
    }
}

/// Load the state file.
///
/// * If the file does not exist          → empty state (first run).
/// * If the file exists but is malformed → error.
pub fn load_state(path: &Path) -> Result<StateFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "persist: no state file found, starting fresh");
        return Ok(StateFile::default());
    }

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let state: StateFile = serde_json::from_str(&data)
        .with_context(|| format!("state file {} is malformed", path.display()))?;

    if state.version != STATE_VERSION {
        bail!(
            "state file {} has version {}, expected {}",
            path.display(),
            state.version,
            STATE_VERSION
        );
    }

    tracing::debug!(
        resources = state.resources.len(),
        path = %path.display(),
        "persist: state loaded"
    );
    Ok(state)
}

/// Save `state` to `path` atomically.
pub fn save_state(path: &Path, state: &StateFile) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("failed to serialize state")?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state dir {}", parent.display()))?;
    }

    // Atomic write: tmp file → rename
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename {} over state file", tmp.display()))?;

    tracing::debug!(path = %path.display(), "persist: state saved");
    Ok(())
}
