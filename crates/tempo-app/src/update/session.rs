//! Update coordination state machine
//!
//! One session per application run drives the whole flow: version check,
//! user consent, download, and the installer handoff. Every asynchronous
//! step can fail, and every failure is converted to a user-visible dialog
//! at the boundary where it occurs; nothing is retried within a run.

use std::fmt;
use std::path::PathBuf;

use semver::Version;

use tempo_ui::dialogs::{Confirm, DialogError, Dialogs, MessageLevel, Notice};
use tempo_ui::messages::WindowMessage;

use crate::registry::Broadcast;

use super::install::Installer;
use super::updater::UpdateSource;

/// Dialog strings, kept exactly as the application has always shown them.
const CHECK_TITLE: &str = "업데이트 확인";
const CHECK_MESSAGE: &str = "새로운 업데이트가 있습니다. 지금 다운로드 받으시겠습니까?";
const DECLINE_LABEL: &str = "아니요";
const ACCEPT_LABEL: &str = "예";
const DOWNLOAD_TITLE: &str = "업데이트 다운로드";
const DOWNLOAD_STARTING: &str = "업데이트 다운로드를 시작합니다. 잠시만 기다려주세요.";
const DOWNLOAD_CANCELLED: &str = "업데이트 다운로드를 취소하였습니다.";
const INSTALL_TITLE: &str = "업데이트 설치";
const INSTALL_NOTICE: &str = "업데이트를 위해 어플리케이션이 종료됩니다.";
const ERROR_TITLE: &str = "Error: ";
const FALLBACK_ERROR_TITLE: &str = "Error";

/// States of the update session.
///
/// `Idle` doubles as the quiet terminal state of a run that found no
/// newer version: the session ends there without any user-visible
/// notice. `Declined` and `Failed` are terminal; `Installing` is the last
/// observable state before the process hands itself over to the
/// installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Checking,
    Available,
    AwaitingConsent,
    Declined,
    Downloading,
    Downloaded,
    Installing,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The per-run update session.
///
/// Created once per process start and driven to a terminal state by
/// [`UpdateSession::run`]; there is no retry and no cancellation within
/// a run.
pub struct UpdateSession<S, D, B, I> {
    state: SessionState,
    remote_version: Option<Version>,
    user_choice: Option<bool>,
    icon: Option<PathBuf>,
    source: S,
    dialogs: D,
    broadcaster: B,
    installer: I,
}

impl<S, D, B, I> UpdateSession<S, D, B, I>
where
    S: UpdateSource,
    D: Dialogs,
    B: Broadcast,
    I: Installer,
{
    pub fn new(source: S, dialogs: D, broadcaster: B, installer: I) -> Self {
        Self {
            state: SessionState::Idle,
            remote_version: None,
            user_choice: None,
            icon: None,
            source,
            dialogs,
            broadcaster,
            installer,
        }
    }

    /// Icon attached to the session's dialogs.
    pub fn with_icon(mut self, icon: PathBuf) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Remote version, once the check has reported one.
    pub fn remote_version(&self) -> Option<&Version> {
        self.remote_version.as_ref()
    }

    /// The consent decision, once the dialog has resolved.
    pub fn user_choice(&self) -> Option<bool> {
        self.user_choice
    }

    /// Drive the session to its terminal state for this run.
    pub async fn run(&mut self) -> SessionState {
        self.transition(SessionState::Checking);

        let info = match self.source.check().await {
            Ok(Some(info)) => info,
            Ok(None) => {
                // Already current: end quietly, interrupting nothing.
                log::info!("No update available");
                self.transition(SessionState::Idle);
                return self.state;
            }
            Err(e) => return self.fail(e).await,
        };

        log::info!("Update {} available", info.version);
        self.remote_version = Some(info.semver.clone());
        self.transition(SessionState::Available);
        self.transition(SessionState::AwaitingConsent);

        let accepted = match self.ask_consent().await {
            Ok(choice) => choice,
            Err(e) => {
                self.transition(SessionState::Failed);
                self.fallback_notice(&e).await;
                return self.state;
            }
        };
        self.user_choice = Some(accepted);

        if !accepted {
            self.transition(SessionState::Declined);
            self.notify(Notice::new(DOWNLOAD_TITLE, DOWNLOAD_CANCELLED).with_icon(self.icon.clone()))
                .await;
            return self.state;
        }

        // Announce before the bytes start flowing: the notice for the
        // user, the broadcast for every update-eligible window.
        self.notify(Notice::new(DOWNLOAD_TITLE, DOWNLOAD_STARTING).with_icon(self.icon.clone()))
            .await;
        self.broadcaster.broadcast(&WindowMessage::UpdateBeginning);

        self.transition(SessionState::Downloading);
        let package = match self.source.fetch_package(&info).await {
            Ok(path) => path,
            Err(e) => return self.fail(e).await,
        };
        self.transition(SessionState::Downloaded);

        // The package is ready; announce the imminent restart, then hand
        // the process over to the installer.
        self.notify(Notice::new(INSTALL_TITLE, INSTALL_NOTICE).with_icon(self.icon.clone()))
            .await;
        self.transition(SessionState::Installing);
        if let Err(e) = self.installer.apply_and_restart(&package) {
            return self.fail(e).await;
        }

        // Fire-and-forget: the process is expected to terminate now.
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("Update session: {} -> {next}", self.state);
        self.state = next;
    }

    async fn ask_consent(&self) -> Result<bool, DialogError> {
        let confirm = Confirm {
            title: CHECK_TITLE.to_string(),
            message: CHECK_MESSAGE.to_string(),
            icon: self.icon.clone(),
            buttons: [DECLINE_LABEL.to_string(), ACCEPT_LABEL.to_string()],
        };
        let index = self.dialogs.confirm(confirm).await?;
        Ok(index == 1)
    }

    /// Convert a failure into the terminal `Failed` state and an error
    /// dialog carrying the raw detail.
    async fn fail(&mut self, error: impl fmt::Display) -> SessionState {
        let detail = error.to_string();
        log::error!("Update failed: {detail}");
        self.transition(SessionState::Failed);
        if let Err(e) = self.dialogs.error(ERROR_TITLE, &detail).await {
            self.fallback_notice(&e).await;
        }
        self.state
    }

    /// Informational notice; a failing dialog subsystem is reported
    /// through the fallback notice and the session carries on.
    async fn notify(&self, notice: Notice) {
        if let Err(e) = self.dialogs.notice(notice).await {
            self.fallback_notice(&e).await;
        }
    }

    /// Last-resort reporting path when the dialog subsystem itself
    /// failed: a plain notice without icon.
    async fn fallback_notice(&self, error: &DialogError) {
        log::error!("Dialog presentation failed: {error}");
        let mut fallback = Notice::new(FALLBACK_ERROR_TITLE, format!("에러입니다: {error}"));
        fallback.level = MessageLevel::Error;
        // When both dialog paths are down, the log line above is all
        // that remains.
        let _ = self.dialogs.notice(fallback).await;
    }
}
