//! Error types for asset manifests.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Errors raised while saving or loading an [`AssetManifest`](crate::AssetManifest).
///
/// Lookups never fail; only manifest I/O does.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to access asset manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed asset manifest")]
    Json(#[from] serde_json::Error),
}
