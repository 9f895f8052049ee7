//! Dialog surface abstraction
//!
//! Modal dialogs block the user, never the process: every operation
//! returns a future the caller awaits while other events keep flowing.

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the dialog subsystem itself.
#[derive(Error, Debug)]
pub enum DialogError {
    #[error("Dialog backend unavailable: {0}")]
    Unavailable(String),

    #[error("Dialog presentation failed: {0}")]
    Presentation(String),
}

/// Severity of an informational notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// A modal informational notice.
#[derive(Debug, Clone, Default)]
pub struct Notice {
    pub title: String,
    pub message: String,
    /// Optional icon; backends without per-dialog icons ignore it.
    pub icon: Option<PathBuf>,
    pub level: MessageLevel,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            icon: None,
            level: MessageLevel::Info,
        }
    }

    pub fn with_icon(mut self, icon: Option<PathBuf>) -> Self {
        self.icon = icon;
        self
    }
}

/// A modal confirmation with exactly two labeled buttons.
///
/// `buttons[0]` declines, `buttons[1]` accepts; the resolved value is the
/// index of the button the user chose.
#[derive(Debug, Clone)]
pub struct Confirm {
    pub title: String,
    pub message: String,
    pub icon: Option<PathBuf>,
    pub buttons: [String; 2],
}

/// Modal dialog presentation.
pub trait Dialogs {
    /// Show an informational notice and resolve once it is dismissed.
    fn notice(&self, notice: Notice) -> impl Future<Output = Result<(), DialogError>> + Send;

    /// Show a two-button confirmation and resolve to the chosen index.
    fn confirm(&self, confirm: Confirm) -> impl Future<Output = Result<usize, DialogError>> + Send;

    /// Show an error box carrying a raw failure detail.
    fn error(
        &self,
        title: &str,
        detail: &str,
    ) -> impl Future<Output = Result<(), DialogError>> + Send;
}
