//! Window registry
//!
//! Tracks live UI windows and delivers update broadcasts to the windows
//! whose title marks them as broadcast targets. Mutated only from the UI
//! thread; the broadcast path snapshots the eligible senders before
//! dispatch so a window closing mid-broadcast is simply skipped.

use std::sync::Arc;

use parking_lot::Mutex;

use tempo_ui::messages::{MessageSender, WindowMessage};
use tempo_ui::window::WindowId;

/// Title prefix marking a window as a valid update-broadcast target.
pub const ELIGIBLE_TITLE_PREFIX: &str = "index_";

/// Whether a window title marks the window update-eligible.
pub fn is_eligible_title(title: &str) -> bool {
    title.starts_with(ELIGIBLE_TITLE_PREFIX)
}

#[derive(Debug)]
struct Entry {
    id: WindowId,
    title: String,
    /// Classified once at registration and cached.
    eligible: bool,
    /// At most one window is primary at a time.
    primary: bool,
    sender: MessageSender,
}

/// Registry of live windows.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    entries: Vec<Entry>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window. Eligibility is computed from the title prefix here
    /// and never recomputed.
    pub fn register(&mut self, id: WindowId, title: &str, primary: bool, sender: MessageSender) {
        debug_assert!(
            !self.entries.iter().any(|e| e.id == id),
            "window {id} registered twice"
        );
        debug_assert!(
            !(primary && self.entries.iter().any(|e| e.primary)),
            "a primary window is already registered"
        );
        let eligible = is_eligible_title(title);
        log::debug!("Registering window {id} ({title:?}, update-eligible: {eligible})");
        self.entries.push(Entry {
            id,
            title: title.to_string(),
            eligible,
            primary,
            sender,
        });
    }

    /// Remove a window. Called synchronously from the window's closure
    /// signal, so no entry outlives its window.
    pub fn unregister(&mut self, id: WindowId) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a registered window is classified update-eligible.
    pub fn is_eligible(&self, id: WindowId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.eligible)
    }

    /// Whether a registered window is the primary window.
    pub fn is_primary(&self, id: WindowId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.primary)
    }

    /// Title of a registered window.
    pub fn title(&self, id: WindowId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.title.as_str())
    }

    /// Snapshot the senders of every currently eligible window.
    fn eligible_senders(&self) -> Vec<MessageSender> {
        self.entries
            .iter()
            .filter(|e| e.eligible)
            .map(|e| e.sender.clone())
            .collect()
    }
}

/// Shared handle to the registry: owned by the UI thread, read by the
/// update session's broadcast path.
pub type SharedRegistry = Arc<Mutex<WindowRegistry>>;

/// Create an empty shared registry.
pub fn shared_registry() -> SharedRegistry {
    Arc::new(Mutex::new(WindowRegistry::new()))
}

/// Outbound broadcast to update-eligible windows.
pub trait Broadcast {
    /// Send `message` to every eligible window, fire-and-forget: no
    /// acknowledgment, no retry, no cross-window ordering. Returns the
    /// number of windows the message was handed to.
    fn broadcast(&self, message: &WindowMessage) -> usize;
}

impl Broadcast for SharedRegistry {
    fn broadcast(&self, message: &WindowMessage) -> usize {
        // Snapshot under the lock, deliver outside it.
        let senders = self.lock().eligible_senders();
        let mut delivered = 0;
        for sender in senders {
            // A window that closed between snapshot and delivery just
            // misses the message.
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        log::debug!("Broadcast {:?} reached {delivered} window(s)", message.kind());
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ui::messages::MessageReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    fn channel() -> (MessageSender, MessageReceiver) {
        unbounded_channel()
    }

    #[test]
    fn test_title_prefix_classification() {
        assert!(is_eligible_title("index_main"));
        assert!(is_eligible_title("index_"));
        assert!(!is_eligible_title("settings"));
        assert!(!is_eligible_title("Index_main"));
        assert!(!is_eligible_title("index"));
    }

    #[test]
    fn test_classification_cached_at_registration() {
        let mut registry = WindowRegistry::new();
        let (tx, _rx) = channel();
        registry.register(1, "index_main", true, tx);
        let (tx, _rx) = channel();
        registry.register(2, "settings", false, tx);

        assert!(registry.is_eligible(1));
        assert!(!registry.is_eligible(2));
        assert!(registry.is_primary(1));
        assert!(!registry.is_primary(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister_removes_entry() {
        let mut registry = WindowRegistry::new();
        let (tx, _rx) = channel();
        registry.register(1, "index_main", true, tx);
        registry.unregister(1);

        assert!(registry.is_empty());
        assert!(!registry.is_eligible(1));
        assert!(registry.title(1).is_none());
    }

    #[test]
    fn test_broadcast_reaches_only_eligible_windows() {
        let registry = shared_registry();
        let (tx, mut eligible_rx) = channel();
        registry.lock().register(1, "index_main", true, tx);
        let (tx, mut other_rx) = channel();
        registry.lock().register(2, "settings", false, tx);

        let delivered = registry.broadcast(&WindowMessage::UpdateBeginning);
        assert_eq!(delivered, 1);
        assert_eq!(eligible_rx.try_recv().ok(), Some(WindowMessage::UpdateBeginning));
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_with_no_windows_is_a_noop() {
        let registry = shared_registry();
        assert_eq!(registry.broadcast(&WindowMessage::UpdateBeginning), 0);
    }

    #[test]
    fn test_closed_window_is_not_delivered_to() {
        let registry = shared_registry();
        let (tx, rx) = channel();
        registry.lock().register(1, "index_main", true, tx);

        // The window's content half went away without unregistering yet.
        drop(rx);
        assert_eq!(registry.broadcast(&WindowMessage::UpdateBeginning), 0);
    }

    #[test]
    fn test_unregistered_window_misses_broadcast() {
        let registry = shared_registry();
        let (tx, mut rx) = channel();
        registry.lock().register(1, "index_main", true, tx);
        registry.lock().unregister(1);

        assert_eq!(registry.broadcast(&WindowMessage::UpdateBeginning), 0);
        assert!(rx.try_recv().is_err());
    }
}
