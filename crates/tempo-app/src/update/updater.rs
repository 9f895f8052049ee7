//! GitHub release update checker and downloader
//!
//! Checks the release feed for a newer version, downloads the package for
//! this platform, and verifies its integrity before the installer is
//! pointed at it.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use semver::Version;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Cache directives sent with every feed request, so a stale intermediary
/// can never answer a version check.
const NO_CACHE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0";

/// Errors that can occur during update operations
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse version: {0}")]
    Version(String),

    #[error("Failed to parse JSON: {0}")]
    Json(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checksum verification failed")]
    ChecksumMismatch,

    #[error("No suitable release asset found for this platform")]
    NoAssetFound,

    #[error("Release feed rate limit exceeded")]
    RateLimited,

    #[error("Release not found")]
    NotFound,
}

/// Information about an available update
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    /// Version string (e.g., "1.2.3")
    pub version: String,
    /// Parsed semantic version
    pub semver: Version,
    /// URL to download the package
    pub download_url: String,
    /// URL to download the SHA256 checksum file (if available)
    pub checksum_url: Option<String>,
    /// Size of the download in bytes
    pub size: u64,
    /// Release notes / changelog
    pub release_notes: String,
    /// Release name/title
    pub name: String,
    /// Whether this is a prerelease
    pub prerelease: bool,
}

/// Remote source of application updates.
///
/// Both operations are opaque to the session driving them: a check either
/// reports a newer version or not, and a fetch either yields a package
/// path ready for the installer or fails.
pub trait UpdateSource {
    /// Ask the source whether a newer version exists.
    fn check(&self) -> impl Future<Output = Result<Option<UpdateInfo>, UpdateError>> + Send;

    /// Download the package for `info`, verify it, and return the path
    /// the installer should be pointed at.
    fn fetch_package(
        &self,
        info: &UpdateInfo,
    ) -> impl Future<Output = Result<PathBuf, UpdateError>> + Send;
}

/// Update checker for GitHub releases
pub struct Updater {
    /// GitHub repository in "owner/repo" format
    repo: String,
    /// Current version of the application
    current_version: Version,
    /// HTTP client
    client: reqwest::Client,
}

impl Updater {
    /// Create a new updater
    ///
    /// # Arguments
    /// * `repo` - GitHub repository in "owner/repo" format
    /// * `current_version` - Current version string
    /// * `timeout` - Request timeout for checks and downloads
    pub fn new(repo: &str, current_version: &str, timeout: Duration) -> Result<Self, UpdateError> {
        let version =
            Version::parse(current_version).map_err(|e| UpdateError::Version(e.to_string()))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CACHE_CONTROL,
            reqwest::header::HeaderValue::from_static(NO_CACHE),
        );

        let client = reqwest::Client::builder()
            .user_agent(format!("tempo/{}", current_version))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            repo: repo.to_string(),
            current_version: version,
            client,
        })
    }

    /// Check for available updates
    ///
    /// Returns `Some(UpdateInfo)` if a newer version is available,
    /// `None` if already on the latest version.
    pub async fn check_for_update(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        let url = format!("https://api.github.com/repos/{}/releases/latest", self.repo);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(UpdateError::NotFound);
        }

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            // Check if it's rate limiting
            if response
                .headers()
                .get("X-RateLimit-Remaining")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == "0")
                .unwrap_or(false)
            {
                return Err(UpdateError::RateLimited);
            }
        }

        let release: Value = response
            .json()
            .await
            .map_err(|e| UpdateError::Json(e.to_string()))?;

        self.parse_release(&release)
    }

    /// Parse a release feed response
    fn parse_release(&self, release: &Value) -> Result<Option<UpdateInfo>, UpdateError> {
        let tag_name = release["tag_name"]
            .as_str()
            .ok_or_else(|| UpdateError::Json("Missing tag_name".to_string()))?;

        // Strip 'v' prefix if present
        let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);

        let version =
            Version::parse(version_str).map_err(|e| UpdateError::Version(e.to_string()))?;

        // Check if this is newer than current
        if version <= self.current_version {
            return Ok(None);
        }

        // Find the appropriate asset for this platform
        let (download_url, size) = self.find_asset(release)?;

        // Look for checksum file
        let checksum_url = self.find_checksum_asset(release);

        let release_notes = release["body"].as_str().unwrap_or("").to_string();

        let name = release["name"].as_str().unwrap_or(tag_name).to_string();

        let prerelease = release["prerelease"].as_bool().unwrap_or(false);

        Ok(Some(UpdateInfo {
            version: version_str.to_string(),
            semver: version,
            download_url,
            checksum_url,
            size,
            release_notes,
            name,
            prerelease,
        }))
    }

    /// Find the appropriate release asset for the current platform
    fn find_asset(&self, release: &Value) -> Result<(String, u64), UpdateError> {
        let assets = release["assets"]
            .as_array()
            .ok_or(UpdateError::NoAssetFound)?;

        let target = Self::platform_target();

        for asset in assets {
            let name = asset["name"].as_str().unwrap_or("");

            // Look for asset matching our platform
            if name.contains(&target) && !name.ends_with(".sha256") {
                let url = asset["browser_download_url"]
                    .as_str()
                    .ok_or(UpdateError::NoAssetFound)?
                    .to_string();

                let size = asset["size"].as_u64().unwrap_or(0);

                return Ok((url, size));
            }
        }

        Err(UpdateError::NoAssetFound)
    }

    /// Find the checksum asset if available
    fn find_checksum_asset(&self, release: &Value) -> Option<String> {
        let assets = release["assets"].as_array()?;
        let target = Self::platform_target();

        for asset in assets {
            let name = asset["name"].as_str().unwrap_or("");

            // Look for checksum file matching our platform
            if name.contains(&target) && name.ends_with(".sha256") {
                return asset["browser_download_url"]
                    .as_str()
                    .map(|s| s.to_string());
            }
        }

        None
    }

    /// Get the platform target string used in release asset names
    fn platform_target() -> String {
        let os = if cfg!(target_os = "linux") {
            "linux"
        } else if cfg!(target_os = "macos") {
            "darwin"
        } else if cfg!(target_os = "windows") {
            "windows"
        } else {
            "unknown"
        };

        let arch = if cfg!(target_arch = "x86_64") {
            "x86_64"
        } else if cfg!(target_arch = "aarch64") {
            "aarch64"
        } else {
            "unknown"
        };

        format!("{}-{}", os, arch)
    }

    /// Download the update to a temporary file
    ///
    /// # Arguments
    /// * `info` - Update information from `check_for_update`
    /// * `on_progress` - Callback for progress updates (bytes_downloaded, total_bytes)
    ///
    /// # Returns
    /// Path to the downloaded file
    pub async fn download<F>(
        &self,
        info: &UpdateInfo,
        mut on_progress: F,
    ) -> Result<PathBuf, UpdateError>
    where
        F: FnMut(u64, u64) + Send,
    {
        let response = self.client.get(&info.download_url).send().await?;

        let total_size = response.content_length().unwrap_or(info.size);

        // Create temp file, keeping the archive suffix so the extraction
        // step can recognize it
        let temp_dir = std::env::temp_dir();
        let mut file_name = format!("tempo-update-{}", info.version);
        if info.download_url.ends_with(".tar.gz") {
            file_name.push_str(".tar.gz");
        }
        let file_path = temp_dir.join(&file_name);

        let mut file = std::fs::File::create(&file_path)?;
        let mut downloaded: u64 = 0;

        // Stream the download
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            on_progress(downloaded, total_size);
        }

        file.flush()?;

        // Make executable on Unix (for plain binary packages)
        #[cfg(unix)]
        if !file_path.to_string_lossy().ends_with(".tar.gz") {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&file_path)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&file_path, perms)?;
        }

        Ok(file_path)
    }

    /// Extract a downloaded tar.gz archive
    ///
    /// # Arguments
    /// * `archive_path` - Path to the downloaded tar.gz file
    ///
    /// # Returns
    /// Path to the extracted directory
    pub fn extract_archive(archive_path: &Path) -> Result<PathBuf, UpdateError> {
        use flate2::read::GzDecoder;
        use std::fs::File;
        use tar::Archive;

        let file = File::open(archive_path)?;
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);

        // Extract to a directory next to the archive
        let extract_dir = archive_path.with_extension("extracted");
        if extract_dir.exists() {
            std::fs::remove_dir_all(&extract_dir)?;
        }
        std::fs::create_dir_all(&extract_dir)?;

        archive.unpack(&extract_dir)?;

        Ok(extract_dir)
    }

    /// Verify the downloaded file against its SHA256 checksum
    ///
    /// # Returns
    /// `Ok(true)` if verification passed, `Ok(false)` if no checksum
    /// available, `Err` on verification failure
    pub async fn verify(&self, file_path: &Path, info: &UpdateInfo) -> Result<bool, UpdateError> {
        let checksum_url = match &info.checksum_url {
            Some(url) => url,
            None => return Ok(false), // No checksum available
        };

        // Download checksum file
        let response = self.client.get(checksum_url).send().await?;

        let checksum_text = response.text().await?;

        // Parse expected checksum (format: "hash  filename" or just "hash")
        let expected_hash = checksum_text
            .split_whitespace()
            .next()
            .ok_or_else(|| UpdateError::Json("Invalid checksum format".to_string()))?
            .to_lowercase();

        if !Self::verify_hash(file_path, &expected_hash)? {
            return Err(UpdateError::ChecksumMismatch);
        }

        Ok(true)
    }

    /// Verify a file against an expected SHA256 hash
    pub fn verify_hash(file_path: &Path, expected_hash: &str) -> Result<bool, UpdateError> {
        let file_data = std::fs::read(file_path)?;
        let mut hasher = Sha256::new();
        hasher.update(&file_data);
        let actual_hash = format!("{:x}", hasher.finalize());

        Ok(actual_hash.to_lowercase() == expected_hash.to_lowercase())
    }
}

impl UpdateSource for Updater {
    async fn check(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        self.check_for_update().await
    }

    async fn fetch_package(&self, info: &UpdateInfo) -> Result<PathBuf, UpdateError> {
        let path = self
            .download(info, |downloaded, total| {
                log::debug!("Downloaded {downloaded}/{total} bytes");
            })
            .await?;

        if self.verify(&path, info).await? {
            log::info!("Checksum verified for {}", path.display());
        } else {
            log::warn!("No checksum published for {}; skipping verification", info.version);
        }

        if path.to_string_lossy().ends_with(".tar.gz") {
            return Self::extract_archive(&path);
        }
        Ok(path)
    }
}
