//! winit-backed window
//!
//! Wraps a winit window behind the [`Window`] trait and owns the content
//! channel the registry broadcasts into.

use std::path::Path;

use tempo_ui::menu::MenuModel;
use tempo_ui::messages::MessageSender;
use tempo_ui::window::{Window, WindowId};
use tokio::sync::mpsc::unbounded_channel;

pub struct ShellWindow {
    window: winit::window::Window,
    title: String,
    content_tx: MessageSender,
}

impl ShellWindow {
    pub(crate) fn new(
        window: winit::window::Window,
        title: String,
        runtime: &tokio::runtime::Handle,
    ) -> Self {
        let (content_tx, mut content_rx) = unbounded_channel::<tempo_ui::messages::WindowMessage>();
        let id = u64::from(window.id());

        // Stand-in for the content host: messages addressed to the page
        // are drained here until it picks up the receiving half. The task
        // ends once every sender is gone, i.e. after unregistration.
        runtime.spawn(async move {
            while let Some(message) = content_rx.recv().await {
                log::debug!("Window {id} content received {:?}", message.kind());
            }
        });

        Self {
            window,
            title,
            content_tx,
        }
    }
}

impl Window for ShellWindow {
    fn id(&self) -> WindowId {
        u64::from(self.window.id())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn show(&mut self) {
        self.window.set_visible(true);
    }

    fn minimize(&mut self) {
        self.window.set_minimized(true);
    }

    fn present(&mut self) {
        self.window.set_visible(true);
        self.window.focus_window();
    }

    fn set_menu(&mut self, menu: &MenuModel) {
        // Menu rendering is owned by the content layer; the shell only
        // records the installed model.
        log::debug!(
            "Menu with {} top-level entries installed on window {}",
            menu.menus.len(),
            self.id()
        );
    }

    fn message_sender(&self) -> MessageSender {
        self.content_tx.clone()
    }
}

/// Decode the window icon, or `None` with a warning when the asset is
/// missing or unreadable.
pub(crate) fn load_window_icon(path: &Path) -> Option<winit::window::Icon> {
    let image = match image::open(path) {
        Ok(image) => image.into_rgba8(),
        Err(e) => {
            log::warn!("Failed to load window icon {}: {e}", path.display());
            return None;
        }
    };
    let (width, height) = image.dimensions();
    match winit::window::Icon::from_rgba(image.into_raw(), width, height) {
        Ok(icon) => Some(icon),
        Err(e) => {
            log::warn!("Invalid window icon {}: {e}", path.display());
            None
        }
    }
}
