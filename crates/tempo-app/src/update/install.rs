//! Installer handoff
//!
//! The final step of the update flow: hand the downloaded package to the
//! external installer and restart. Applying the package is the
//! installer's job and is atomic from the application's point of view;
//! this module only locates the entry point and launches it detached.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use thiserror::Error;

/// Errors that can occur during the installer handoff
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No installer entry point found in {0}")]
    NoEntryPoint(PathBuf),

    #[error("Process spawn error: {0}")]
    Spawn(String),

    #[error("Exit request failed: {0}")]
    ExitRequest(String),
}

/// Requests the external installer to apply a downloaded package and
/// restart the application.
pub trait Installer {
    /// Fire-and-forget: on success the process is expected to terminate
    /// shortly after, and the caller makes no further transitions.
    fn apply_and_restart(&self, package: &Path) -> Result<(), InstallError>;
}

/// Locate the executable entry point of a downloaded package: the package
/// itself when it is a single file, otherwise an executable at the top of
/// the extracted directory.
pub fn find_entry_point(package: &Path) -> Result<PathBuf, InstallError> {
    if package.is_file() {
        return Ok(package.to_path_buf());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(package)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_executable(path))
        .collect();
    entries.sort();

    entries
        .into_iter()
        .next()
        .ok_or_else(|| InstallError::NoEntryPoint(package.to_path_buf()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "exe")
}

/// Spawn the installer detached from this process so it survives our
/// exit and can restart the application.
pub fn launch_installer(package: &Path) -> Result<Child, InstallError> {
    let entry = find_entry_point(package)?;
    log::info!("Launching installer {}", entry.display());

    Command::new(&entry)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| InstallError::Spawn(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_package_is_its_own_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("tempo-update-2.0.0");
        std::fs::write(&package, b"binary").unwrap();

        assert_eq!(find_entry_point(&package).unwrap(), package);
    }

    #[test]
    fn test_empty_package_directory_has_no_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let result = find_entry_point(dir.path());
        assert!(matches!(result, Err(InstallError::NoEntryPoint(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_found_in_extracted_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"docs").unwrap();

        let binary = dir.path().join("tempo");
        std::fs::write(&binary, b"#!/bin/sh\n").unwrap();
        let mut perms = std::fs::metadata(&binary).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&binary, perms).unwrap();

        assert_eq!(find_entry_point(dir.path()).unwrap(), binary);
    }
}
