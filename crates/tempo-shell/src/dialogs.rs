//! Platform dialogs
//!
//! Implements the [`Dialogs`] trait over the system message-dialog
//! service. Dialogs are modal to the user but awaited asynchronously, so
//! the event loop keeps running underneath them.

use rfd::{AsyncMessageDialog, MessageButtons, MessageDialogResult};

use tempo_ui::dialogs::{Confirm, DialogError, Dialogs, MessageLevel, Notice};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShellDialogs;

fn level_of(level: MessageLevel) -> rfd::MessageLevel {
    match level {
        MessageLevel::Info => rfd::MessageLevel::Info,
        MessageLevel::Warning => rfd::MessageLevel::Warning,
        MessageLevel::Error => rfd::MessageLevel::Error,
    }
}

impl Dialogs for ShellDialogs {
    async fn notice(&self, notice: Notice) -> Result<(), DialogError> {
        // System dialogs show the application icon; the per-notice icon
        // is not separately settable here.
        AsyncMessageDialog::new()
            .set_level(level_of(notice.level))
            .set_title(notice.title.as_str())
            .set_description(notice.message.as_str())
            .set_buttons(MessageButtons::Ok)
            .show()
            .await;
        Ok(())
    }

    async fn confirm(&self, confirm: Confirm) -> Result<usize, DialogError> {
        let [decline, accept] = confirm.buttons;

        let result = AsyncMessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(confirm.title.as_str())
            .set_description(confirm.message.as_str())
            .set_buttons(MessageButtons::OkCancelCustom(accept.clone(), decline))
            .show()
            .await;

        let index = match result {
            MessageDialogResult::Ok | MessageDialogResult::Yes => 1,
            MessageDialogResult::Custom(label) if label == accept => 1,
            _ => 0,
        };
        Ok(index)
    }

    async fn error(&self, title: &str, detail: &str) -> Result<(), DialogError> {
        AsyncMessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(title)
            .set_description(detail)
            .set_buttons(MessageButtons::Ok)
            .show()
            .await;
        Ok(())
    }
}
