//! Asset root resolution
//!
//! A packaged install carries its static assets in `resources/assets`
//! next to the executable; a development run falls back to the `assets/`
//! directory in the source tree. Resolved once at startup.

use std::path::{Path, PathBuf};

/// Root directory the application's static assets are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    root: PathBuf,
    packaged: bool,
}

impl AssetRoot {
    /// Resolve the asset root for the running executable.
    pub fn resolve() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));
        match exe_dir {
            Some(dir) => Self::resolve_from(&dir),
            None => Self::development(),
        }
    }

    /// Resolve relative to a specific executable directory.
    pub fn resolve_from(exe_dir: &Path) -> Self {
        let packaged = exe_dir.join("resources").join("assets");
        if packaged.is_dir() {
            Self {
                root: packaged,
                packaged: true,
            }
        } else {
            Self::development()
        }
    }

    fn development() -> Self {
        Self {
            root: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets"),
            packaged: false,
        }
    }

    /// Whether the packaged layout was found.
    pub fn is_packaged(&self) -> bool {
        self.packaged
    }

    /// The resolved root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an asset below the root.
    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// The application icon.
    pub fn icon_path(&self) -> PathBuf {
        self.asset_path("icon.png")
    }
}
