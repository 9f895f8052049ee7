//! tempo-app: Application logic for tempo
//!
//! This crate contains the application logic that is independent of the
//! windowing backend: configuration, asset resolution, the window
//! registry, lifecycle control, and the self-update session.

pub mod assets;
pub mod config;
pub mod devtools;
pub mod lifecycle;
pub mod registry;
pub mod update;

pub use assets::AssetRoot;
pub use config::{load_config, save_config, Config};
pub use lifecycle::{Lifecycle, Platform, WindowHost, WindowSpec};
pub use registry::{Broadcast, SharedRegistry, WindowRegistry};
pub use update::{Installer, UpdateError, UpdateInfo, UpdateSession, UpdateSource, Updater};
