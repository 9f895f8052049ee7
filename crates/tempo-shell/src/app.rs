//! winit application handler
//!
//! Owns the lifecycle controller and wires winit's callbacks onto it:
//! `resumed` creates (or recreates) the primary window, `CloseRequested`
//! is the closure signal, and a user event carries the exit request that
//! ends the process once the installer has been launched.

use std::path::Path;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::window::WindowId;

use tempo_app::config::Config;
use tempo_app::lifecycle::{Lifecycle, LifecycleError, WindowHost, WindowSpec};
use tempo_app::registry::shared_registry;
use tempo_app::update::{launch_installer, InstallError, Installer, UpdateSession, Updater};
use tempo_app::AssetRoot;

use crate::dialogs::ShellDialogs;
use crate::menu::build_app_menu;
use crate::window::{load_window_icon, ShellWindow};

/// Current application version
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Events injected into the winit loop from async tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellEvent {
    /// The installer is running; exit so it can replace us.
    ExitForUpdate,
}

/// Installer seam backed by the real process: launch the package's
/// installer detached, then ask the event loop to exit.
///
/// The proxy sits behind a mutex so the installer can be shared with the
/// session task on any platform.
struct ProcessInstaller {
    proxy: parking_lot::Mutex<EventLoopProxy<ShellEvent>>,
}

impl Installer for ProcessInstaller {
    fn apply_and_restart(&self, package: &Path) -> Result<(), InstallError> {
        let child = launch_installer(package)?;
        log::info!("Installer running with PID {}", child.id());
        self.proxy
            .lock()
            .send_event(ShellEvent::ExitForUpdate)
            .map_err(|_| InstallError::ExitRequest("event loop already closed".to_string()))?;
        Ok(())
    }
}

/// Opens URLs with the platform's default handler. Paired with
/// [`tempo_app::lifecycle::Lifecycle::handle_navigation_request`] by the
/// content host, so link navigation never hijacks the window.
pub struct ShellOpener;

impl tempo_app::lifecycle::ExternalOpener for ShellOpener {
    fn open_external(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}

pub(crate) struct ShellApp {
    lifecycle: Lifecycle<ShellWindow>,
    runtime: tokio::runtime::Handle,
    proxy: EventLoopProxy<ShellEvent>,
}

impl ShellApp {
    pub(crate) fn new(
        config: Config,
        runtime: tokio::runtime::Handle,
        proxy: EventLoopProxy<ShellEvent>,
    ) -> Self {
        let assets = AssetRoot::resolve();
        log::info!(
            "Asset root: {} (packaged: {})",
            assets.root().display(),
            assets.is_packaged()
        );

        let lifecycle = Lifecycle::new(config, assets, build_app_menu(), shared_registry());
        Self {
            lifecycle,
            runtime,
            proxy,
        }
    }

    /// Instantiate and start the one update session of this run.
    fn start_update_session(&mut self) {
        if !self.lifecycle.take_update_session_start() {
            return;
        }

        let update = &self.lifecycle.config().update;
        let updater = match Updater::new(
            &update.repo,
            CURRENT_VERSION,
            Duration::from_secs(update.timeout_secs),
        ) {
            Ok(updater) => updater,
            Err(e) => {
                log::error!("Update source unavailable: {e}");
                return;
            }
        };

        let installer = ProcessInstaller {
            proxy: parking_lot::Mutex::new(self.proxy.clone()),
        };
        let mut session =
            UpdateSession::new(updater, ShellDialogs, self.lifecycle.registry(), installer)
                .with_icon(self.lifecycle.assets().icon_path());

        self.runtime.spawn(async move {
            let state = session.run().await;
            log::info!("Update session finished in state {state}");
        });
    }

    /// Debug builds fetch the devtools bundle in the background.
    fn spawn_devtools_fetch(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        let devtools = self.lifecycle.config().devtools.clone();
        self.runtime.spawn(async move {
            match tempo_app::devtools::ensure_devtools(&devtools).await {
                Ok(Some(path)) => log::info!("Devtools bundle ready at {}", path.display()),
                Ok(None) => log::debug!("No devtools bundle configured"),
                Err(e) => log::warn!("Devtools acquisition failed: {e}"),
            }
        });
    }
}

/// Borrow of the active event loop for the duration of one callback.
struct WinitHost<'a> {
    event_loop: &'a ActiveEventLoop,
    runtime: tokio::runtime::Handle,
}

impl WindowHost for WinitHost<'_> {
    type Window = ShellWindow;

    fn create_window(&mut self, spec: &WindowSpec) -> Result<ShellWindow, LifecycleError> {
        let icon = spec.icon.as_deref().and_then(load_window_icon);

        let attributes = winit::window::Window::default_attributes()
            .with_title(spec.title.clone())
            .with_inner_size(LogicalSize::new(f64::from(spec.width), f64::from(spec.height)))
            .with_visible(false)
            .with_window_icon(icon);

        let window = self
            .event_loop
            .create_window(attributes)
            .map_err(|e| LifecycleError::CreateWindow(e.to_string()))?;

        Ok(ShellWindow::new(window, spec.title.clone(), &self.runtime))
    }

    fn request_exit(&mut self) {
        self.event_loop.exit();
    }
}

impl ApplicationHandler<ShellEvent> for ShellApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let first = !self.lifecycle.is_started();
        let had_window = self.lifecycle.has_primary_window();

        let mut host = WinitHost {
            event_loop,
            runtime: self.runtime.clone(),
        };

        let result = if first {
            self.spawn_devtools_fetch();
            self.lifecycle.on_ready(&mut host)
        } else {
            self.lifecycle.on_activate(&mut host)
        };

        if let Err(e) = result {
            log::error!("Window creation failed: {e}");
            if first {
                event_loop.exit();
            }
            return;
        }

        if !had_window && self.lifecycle.has_primary_window() {
            self.lifecycle.on_primary_ready();
        }

        if first {
            self.start_update_session();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window {window_id:?} close requested");
                let mut host = WinitHost {
                    event_loop,
                    runtime: self.runtime.clone(),
                };
                self.lifecycle.on_window_closed(&mut host, u64::from(window_id));
            }
            WindowEvent::RedrawRequested => {
                // Rendering belongs to the content layer.
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ShellEvent) {
        match event {
            ShellEvent::ExitForUpdate => {
                log::info!("Exiting so the installer can apply the update");
                event_loop.exit();
            }
        }
    }
}
