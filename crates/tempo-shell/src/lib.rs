//! tempo-shell: cross-platform windowing shell for tempo
//!
//! Hosts the lifecycle controller on a winit event loop, presents dialogs
//! through the platform dialog service, and performs the installer
//! handoff at the end of a successful update.

mod app;
mod dialogs;
mod menu;
mod window;

pub use app::ShellOpener;
pub use dialogs::ShellDialogs;
pub use window::ShellWindow;

use thiserror::Error;
use winit::event_loop::{ControlFlow, EventLoop};

use tempo_app::config::Config;

use crate::app::{ShellApp, ShellEvent};

/// Shell errors
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Run the application shell until the last window closes or an update
/// restart is requested.
///
/// The caller keeps ownership of the async runtime; the event loop owns
/// the calling thread until it exits.
pub fn run(config: Config, runtime: tokio::runtime::Handle) -> Result<(), ShellError> {
    let event_loop = EventLoop::<ShellEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let proxy = event_loop.create_proxy();
    let mut shell = ShellApp::new(config, runtime, proxy);
    event_loop.run_app(&mut shell)?;

    Ok(())
}
