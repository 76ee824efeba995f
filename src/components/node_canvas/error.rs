use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
	#[error("malformed graph json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("browser storage is unavailable")]
	StorageUnavailable,
	#[error("browser storage failed: {0}")]
	Storage(String),
	#[error("invalid graph snapshot: {0}")]
	InvalidSnapshot(String),
}
