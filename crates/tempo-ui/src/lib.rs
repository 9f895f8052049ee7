//! tempo-ui: UI abstraction layer
//!
//! This crate defines the traits and types the application logic programs
//! against, allowing different windowing backends to host tempo.

pub mod dialogs;
pub mod menu;
pub mod messages;
pub mod window;

pub use dialogs::*;
pub use menu::*;
pub use messages::*;
pub use window::*;
