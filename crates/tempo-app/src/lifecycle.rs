//! Process lifecycle control
//!
//! Owns primary-window creation and teardown, the activation handler, and
//! the process exit policy. What used to be ambient globals in
//! callback-heavy shells (a nullable main-window reference, a
//! module-level updater singleton) are explicit fields here, with exactly
//! one controller instance per process.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use tempo_ui::menu::MenuModel;
use tempo_ui::window::{Window, WindowId};

use crate::assets::AssetRoot;
use crate::config::Config;
use crate::registry::SharedRegistry;

/// Title of the primary window. The `index_` prefix marks it as an
/// update-broadcast target (see [`crate::registry`]).
pub const PRIMARY_WINDOW_TITLE: &str = "index_main";

/// Lifecycle errors
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Window creation failed: {0}")]
    CreateWindow(String),
}

/// Platforms with distinct window-close conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Whether the application stays resident after its last window
    /// closes, waiting to be re-activated.
    pub const fn stays_resident(self) -> bool {
        matches!(self, Platform::MacOs)
    }
}

/// Parameters for creating the primary window.
#[derive(Debug, Clone)]
pub struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub start_minimized: bool,
    pub icon: Option<PathBuf>,
}

/// Backend surface the controller drives windows through.
pub trait WindowHost {
    type Window: Window;

    /// Create a hidden window from `spec`; the controller shows it once
    /// the backend reports it ready.
    fn create_window(&mut self, spec: &WindowSpec) -> Result<Self::Window, LifecycleError>;

    /// Ask the process to exit normally.
    fn request_exit(&mut self);
}

/// Opens URLs with the platform's default external handler.
pub trait ExternalOpener {
    fn open_external(&self, url: &str) -> std::io::Result<()>;
}

/// What a backend should do with a navigation request from window
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    /// Never navigate inside the window.
    Deny,
}

/// The lifecycle controller. One instance per process.
pub struct Lifecycle<W: Window> {
    config: Config,
    assets: AssetRoot,
    menu: MenuModel,
    registry: SharedRegistry,
    platform: Platform,
    primary: Option<W>,
    started: bool,
    update_session_started: bool,
}

impl<W: Window> Lifecycle<W> {
    pub fn new(config: Config, assets: AssetRoot, menu: MenuModel, registry: SharedRegistry) -> Self {
        Self::for_platform(config, assets, menu, registry, Platform::current())
    }

    /// Constructor with an explicit platform convention.
    pub fn for_platform(
        config: Config,
        assets: AssetRoot,
        menu: MenuModel,
        registry: SharedRegistry,
        platform: Platform,
    ) -> Self {
        Self {
            config,
            assets,
            menu,
            registry,
            platform,
            primary: None,
            started: false,
            update_session_started: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn assets(&self) -> &AssetRoot {
        &self.assets
    }

    /// Registry handle shared with the broadcast path.
    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Whether one-time startup already ran.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_primary_window(&self) -> bool {
        self.primary.is_some()
    }

    pub fn primary_window(&self) -> Option<&W> {
        self.primary.as_ref()
    }

    /// One-time startup: create and register the primary window. The
    /// update session is started by the shell once the window is visible;
    /// see [`Lifecycle::take_update_session_start`].
    pub fn on_ready(&mut self, host: &mut impl WindowHost<Window = W>) -> Result<(), LifecycleError> {
        debug_assert!(!self.started, "on_ready called twice");
        self.started = true;
        self.create_primary(host)
    }

    /// A window signalled closure: drop it from the registry, clear the
    /// primary reference, and exit unless the platform convention is to
    /// stay resident.
    pub fn on_window_closed(&mut self, host: &mut impl WindowHost<Window = W>, id: WindowId) {
        self.registry.lock().unregister(id);

        if self.primary.as_ref().is_some_and(|w| w.id() == id) {
            self.primary = None;
        } else {
            log::error!("Close signal for a window the controller does not own: {id}");
            debug_assert!(false, "close signal for unknown window {id}");
        }

        if self.registry.lock().is_empty() && !self.platform.stays_resident() {
            log::info!("Last window closed, exiting");
            host.request_exit();
        }
    }

    /// Recreate the primary window if none exists; a no-op otherwise.
    pub fn on_activate(
        &mut self,
        host: &mut impl WindowHost<Window = W>,
    ) -> Result<(), LifecycleError> {
        if self.primary.is_some() {
            return Ok(());
        }
        self.create_primary(host)
    }

    /// The backend reported the primary window ready to show: present it,
    /// honouring the minimized-start switch.
    pub fn on_primary_ready(&mut self) {
        match &mut self.primary {
            Some(window) => {
                if self.config.window.start_minimized {
                    window.minimize();
                } else {
                    window.show();
                }
            }
            None => {
                log::error!("Ready signal with no primary window");
                debug_assert!(false, "ready signal with no primary window");
            }
        }
    }

    /// One-shot guard around update-session creation: true exactly once
    /// per process run.
    pub fn take_update_session_start(&mut self) -> bool {
        if self.update_session_started {
            return false;
        }
        self.update_session_started = true;
        true
    }

    /// Window content asked to navigate somewhere: hand the URL to the
    /// platform's default handler and keep the window where it is.
    pub fn handle_navigation_request(
        &self,
        url: &str,
        opener: &impl ExternalOpener,
    ) -> NavigationAction {
        if let Err(e) = opener.open_external(url) {
            log::warn!("Failed to open {url} externally: {e}");
        }
        NavigationAction::Deny
    }

    /// Spec for the primary window, from configuration and the asset
    /// root.
    pub fn primary_window_spec(&self) -> WindowSpec {
        WindowSpec {
            title: PRIMARY_WINDOW_TITLE.to_string(),
            width: self.config.window.width,
            height: self.config.window.height,
            start_minimized: self.config.window.start_minimized,
            icon: Some(self.assets.icon_path()),
        }
    }

    fn create_primary(
        &mut self,
        host: &mut impl WindowHost<Window = W>,
    ) -> Result<(), LifecycleError> {
        debug_assert!(self.primary.is_none(), "primary window already exists");

        let spec = self.primary_window_spec();
        let mut window = host.create_window(&spec)?;
        window.set_menu(&self.menu);
        self.registry
            .lock()
            .register(window.id(), window.title(), true, window.message_sender());
        self.primary = Some(window);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::shared_registry;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempo_ui::messages::MessageSender;
    use tokio::sync::mpsc::unbounded_channel;

    struct MockWindow {
        id: WindowId,
        title: String,
        sender: MessageSender,
        shown: Rc<RefCell<Vec<&'static str>>>,
        menu_installed: Rc<RefCell<bool>>,
    }

    impl Window for MockWindow {
        fn id(&self) -> WindowId {
            self.id
        }

        fn title(&self) -> &str {
            &self.title
        }

        fn show(&mut self) {
            self.shown.borrow_mut().push("show");
        }

        fn minimize(&mut self) {
            self.shown.borrow_mut().push("minimize");
        }

        fn present(&mut self) {
            self.shown.borrow_mut().push("present");
        }

        fn set_menu(&mut self, _menu: &MenuModel) {
            *self.menu_installed.borrow_mut() = true;
        }

        fn message_sender(&self) -> MessageSender {
            self.sender.clone()
        }
    }

    #[derive(Default)]
    struct MockHost {
        next_id: WindowId,
        created: usize,
        exit_requested: bool,
        fail_creation: bool,
        shown: Rc<RefCell<Vec<&'static str>>>,
        menu_installed: Rc<RefCell<bool>>,
        receivers: Vec<tempo_ui::messages::MessageReceiver>,
    }

    impl WindowHost for MockHost {
        type Window = MockWindow;

        fn create_window(&mut self, spec: &WindowSpec) -> Result<MockWindow, LifecycleError> {
            if self.fail_creation {
                return Err(LifecycleError::CreateWindow("no display".to_string()));
            }
            self.next_id += 1;
            self.created += 1;
            let (sender, receiver) = unbounded_channel();
            // Keep the content half open for the window's lifetime.
            self.receivers.push(receiver);
            Ok(MockWindow {
                id: self.next_id,
                title: spec.title.clone(),
                sender,
                shown: Rc::clone(&self.shown),
                menu_installed: Rc::clone(&self.menu_installed),
            })
        }

        fn request_exit(&mut self) {
            self.exit_requested = true;
        }
    }

    fn lifecycle_on(platform: Platform) -> (Lifecycle<MockWindow>, MockHost) {
        let lifecycle = Lifecycle::for_platform(
            Config::default(),
            AssetRoot::resolve_from(std::path::Path::new("/nonexistent")),
            MenuModel::default(),
            shared_registry(),
            platform,
        );
        (lifecycle, MockHost::default())
    }

    #[test]
    fn test_on_ready_creates_and_registers_primary() {
        let (mut lifecycle, mut host) = lifecycle_on(Platform::Linux);
        lifecycle.on_ready(&mut host).unwrap();

        assert!(lifecycle.is_started());
        assert!(lifecycle.has_primary_window());
        assert_eq!(host.created, 1);
        assert!(*host.menu_installed.borrow());

        let registry = lifecycle.registry();
        let id = lifecycle.primary_window().unwrap().id();
        assert_eq!(registry.lock().len(), 1);
        assert!(registry.lock().is_eligible(id));
        assert_eq!(registry.lock().title(id), Some(PRIMARY_WINDOW_TITLE));
    }

    #[test]
    fn test_primary_shown_or_minimized_on_ready_signal() {
        let (mut lifecycle, mut host) = lifecycle_on(Platform::Linux);
        lifecycle.on_ready(&mut host).unwrap();
        lifecycle.on_primary_ready();
        assert_eq!(host.shown.borrow().as_slice(), ["show"]);

        let mut config = Config::default();
        config.window.start_minimized = true;
        let mut lifecycle = Lifecycle::for_platform(
            config,
            AssetRoot::resolve_from(std::path::Path::new("/nonexistent")),
            MenuModel::default(),
            shared_registry(),
            Platform::Linux,
        );
        let mut host = MockHost::default();
        lifecycle.on_ready(&mut host).unwrap();
        lifecycle.on_primary_ready();
        assert_eq!(host.shown.borrow().as_slice(), ["minimize"]);
    }

    #[test]
    fn test_window_creation_failure_propagates() {
        let (mut lifecycle, mut host) = lifecycle_on(Platform::Linux);
        host.fail_creation = true;
        assert!(lifecycle.on_ready(&mut host).is_err());
        assert!(!lifecycle.has_primary_window());
    }

    #[test]
    fn test_close_exits_on_platforms_without_residency() {
        for platform in [Platform::Linux, Platform::Windows] {
            let (mut lifecycle, mut host) = lifecycle_on(platform);
            lifecycle.on_ready(&mut host).unwrap();
            let id = lifecycle.primary_window().unwrap().id();

            lifecycle.on_window_closed(&mut host, id);
            assert!(!lifecycle.has_primary_window());
            assert!(lifecycle.registry().lock().is_empty());
            assert!(host.exit_requested, "expected exit on {platform:?}");
        }
    }

    #[test]
    fn test_close_stays_resident_on_macos() {
        let (mut lifecycle, mut host) = lifecycle_on(Platform::MacOs);
        lifecycle.on_ready(&mut host).unwrap();
        let id = lifecycle.primary_window().unwrap().id();

        lifecycle.on_window_closed(&mut host, id);
        assert!(!lifecycle.has_primary_window());
        assert!(!host.exit_requested);
    }

    #[test]
    fn test_activate_recreates_exactly_one_window() {
        let (mut lifecycle, mut host) = lifecycle_on(Platform::MacOs);
        lifecycle.on_ready(&mut host).unwrap();
        let id = lifecycle.primary_window().unwrap().id();
        lifecycle.on_window_closed(&mut host, id);

        lifecycle.on_activate(&mut host).unwrap();
        assert!(lifecycle.has_primary_window());
        assert_eq!(host.created, 2);
        assert_eq!(lifecycle.registry().lock().len(), 1);
    }

    #[test]
    fn test_activate_with_live_window_is_a_noop() {
        let (mut lifecycle, mut host) = lifecycle_on(Platform::MacOs);
        lifecycle.on_ready(&mut host).unwrap();

        lifecycle.on_activate(&mut host).unwrap();
        lifecycle.on_activate(&mut host).unwrap();
        assert_eq!(host.created, 1);
        assert_eq!(lifecycle.registry().lock().len(), 1);
    }

    #[test]
    fn test_update_session_starts_once_per_run() {
        let (mut lifecycle, _host) = lifecycle_on(Platform::Linux);
        assert!(lifecycle.take_update_session_start());
        assert!(!lifecycle.take_update_session_start());
        assert!(!lifecycle.take_update_session_start());
    }

    #[test]
    fn test_navigation_is_denied_and_opened_externally() {
        struct RecordingOpener(RefCell<Vec<String>>);

        impl ExternalOpener for RecordingOpener {
            fn open_external(&self, url: &str) -> std::io::Result<()> {
                self.0.borrow_mut().push(url.to_string());
                Ok(())
            }
        }

        let (lifecycle, _host) = lifecycle_on(Platform::Linux);
        let opener = RecordingOpener(RefCell::new(Vec::new()));
        let action = lifecycle.handle_navigation_request("https://example.com", &opener);

        assert_eq!(action, NavigationAction::Deny);
        assert_eq!(opener.0.borrow().as_slice(), ["https://example.com"]);
    }

    #[test]
    fn test_navigation_denied_even_when_opener_fails() {
        struct FailingOpener;

        impl ExternalOpener for FailingOpener {
            fn open_external(&self, _url: &str) -> std::io::Result<()> {
                Err(std::io::Error::other("no handler"))
            }
        }

        let (lifecycle, _host) = lifecycle_on(Platform::Linux);
        let action = lifecycle.handle_navigation_request("https://example.com", &FailingOpener);
        assert_eq!(action, NavigationAction::Deny);
    }

    #[test]
    fn test_platform_conventions() {
        assert!(Platform::MacOs.stays_resident());
        assert!(!Platform::Linux.stays_resident());
        assert!(!Platform::Windows.stays_resident());
    }
}
