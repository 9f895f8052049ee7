//! Window abstraction
//!
//! Windows are opaque handles owned by the lifecycle controller; backends
//! implement this trait over their native window type.

use crate::menu::MenuModel;
use crate::messages::MessageSender;

/// Stable identifier for a live window.
pub type WindowId = u64;

/// An open UI window.
pub trait Window {
    /// Backend identifier for this window.
    fn id(&self) -> WindowId;

    /// Current display title.
    fn title(&self) -> &str;

    /// Make the window visible. Windows are created hidden and shown once
    /// the backend reports them ready.
    fn show(&mut self);

    /// Minimize the window.
    fn minimize(&mut self);

    /// Bring the window to the front.
    fn present(&mut self);

    /// Install the application menu on this window.
    fn set_menu(&mut self, menu: &MenuModel);

    /// A sender for the window's content channel.
    fn message_sender(&self) -> MessageSender;
}
