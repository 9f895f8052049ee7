//! Development tooling acquisition
//!
//! Debug builds fetch a devtools bundle into the platform cache directory
//! so the hosted page can be inspected. Failures are reported to the
//! caller; they never block startup.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::config::DevtoolsConfig;

/// Devtools acquisition errors
#[derive(Error, Debug)]
pub enum DevtoolsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache directory not found")]
    NoCacheDir,
}

/// Location of the cached devtools bundle.
pub fn bundle_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "tempo", "tempo").map(|p| p.cache_dir().join("devtools.bundle"))
}

/// Ensure the devtools bundle is present, downloading it when missing or
/// when `force_download` is set. Returns `None` when no bundle URL is
/// configured.
pub async fn ensure_devtools(config: &DevtoolsConfig) -> Result<Option<PathBuf>, DevtoolsError> {
    if config.bundle_url.is_empty() {
        return Ok(None);
    }
    let path = bundle_path().ok_or(DevtoolsError::NoCacheDir)?;
    ensure_devtools_at(config, &path).await.map(Some)
}

/// Same as [`ensure_devtools`] with an explicit cache location.
pub async fn ensure_devtools_at(
    config: &DevtoolsConfig,
    path: &Path,
) -> Result<PathBuf, DevtoolsError> {
    if path.exists() && !config.force_download {
        log::debug!("Devtools bundle already cached at {}", path.display());
        return Ok(path.to_path_buf());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    log::info!("Fetching devtools bundle from {}", config.bundle_url);
    let bytes = reqwest::get(&config.bundle_url)
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    std::fs::write(path, &bytes)?;

    Ok(path.to_path_buf())
}
