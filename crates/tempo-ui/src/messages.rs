//! Messages delivered to window content
//!
//! The shell talks to the page hosted inside a window over a one-way,
//! fire-and-forget channel. A send to a window that has already closed is
//! silently dropped.

use serde::{Deserialize, Serialize};

/// A message addressed to the content of a UI window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WindowMessage {
    /// An update download is about to begin.
    UpdateBeginning,
}

impl WindowMessage {
    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WindowMessage::UpdateBeginning => "update-beginning",
        }
    }
}

/// Sending half of a window's content channel.
pub type MessageSender = tokio::sync::mpsc::UnboundedSender<WindowMessage>;

/// Receiving half, owned by the window's content host.
pub type MessageReceiver = tokio::sync::mpsc::UnboundedReceiver<WindowMessage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_wire_form() {
        let message = WindowMessage::UpdateBeginning;
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["kind"], message.kind());
    }
}
