use std::collections::HashSet;

use log::{info, warn};

use super::config::CanvasConfig;
use super::error::CanvasError;
use super::types::GraphSnapshot;

pub const STORAGE_KEY: &str = "node-canvas.graph";
/// Optional user overrides, merged over the defaults.
pub const CONFIG_KEY: &str = "node-canvas.config";

pub fn encode(snapshot: &GraphSnapshot) -> Result<String, CanvasError> {
	Ok(serde_json::to_string(snapshot)?)
}

/// Parses a stored graph. Duplicate node ids are rejected; self-loop edges are dropped.
pub fn decode(json: &str) -> Result<GraphSnapshot, CanvasError> {
	let mut snapshot: GraphSnapshot = serde_json::from_str(json)?;

	let mut seen = HashSet::new();
	if let Some(dup) = snapshot.nodes.iter().find(|n| !seen.insert(n.id)) {
		return Err(CanvasError::InvalidSnapshot(format!("duplicate node id {}", dup.id)));
	}

	let before = snapshot.edges.len();
	snapshot.edges.retain(|e| e.source != e.target);
	if snapshot.edges.len() != before {
		warn!("dropped {} self-loop edges", before - snapshot.edges.len());
	}
	Ok(snapshot)
}

fn local_storage() -> Result<web_sys::Storage, CanvasError> {
	web_sys::window()
		.ok_or(CanvasError::StorageUnavailable)?
		.local_storage()
		.map_err(|e| CanvasError::Storage(format!("{e:?}")))?
		.ok_or(CanvasError::StorageUnavailable)
}

pub fn save_to_local_storage(snapshot: &GraphSnapshot) -> Result<(), CanvasError> {
	let json = encode(snapshot)?;
	local_storage()?
		.set_item(STORAGE_KEY, &json)
		.map_err(|e| CanvasError::Storage(format!("{e:?}")))?;
	info!("saved {} nodes to local storage", snapshot.nodes.len());
	Ok(())
}

/// `Ok(None)` when nothing has been saved yet.
pub fn load_from_local_storage() -> Result<Option<GraphSnapshot>, CanvasError> {
	let stored = local_storage()?
		.get_item(STORAGE_KEY)
		.map_err(|e| CanvasError::Storage(format!("{e:?}")))?;
	stored.as_deref().map(decode).transpose()
}

/// Defaults when no overrides are stored.
pub fn load_config_from_local_storage() -> Result<CanvasConfig, CanvasError> {
	let stored = local_storage()?
		.get_item(CONFIG_KEY)
		.map_err(|e| CanvasError::Storage(format!("{e:?}")))?;
	match stored {
		Some(json) => {
			info!("applying stored canvas config");
			Ok(CanvasConfig::from_json(&json)?)
		}
		None => Ok(CanvasConfig::default()),
	}
}
