//! User-facing notifications emitted by cart operations.

use crate::error::CartError;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tracing::warn;

/// Shown when a quantity would go above the stock ceiling.
pub const MSG_OUT_OF_STOCK: &str = "Requested quantity is out of stock";
/// Shown when adding a product fails for any other reason.
pub const MSG_ADD_FAILED: &str = "Failed to add product";
/// Shown when removing a product fails.
pub const MSG_REMOVE_FAILED: &str = "Failed to remove product";
/// Shown when updating a quantity fails for any other reason.
pub const MSG_UPDATE_FAILED: &str = "Failed to update product quantity";
/// Shown when the stored cart cannot be read.
pub const MSG_LOAD_FAILED: &str = "Failed to load cart";

/// An error message for the user, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    /// A notification carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&CartError> for Notification {
    fn from(err: &CartError) -> Self {
        let message = match err {
            CartError::StockExceeded { .. } => MSG_OUT_OF_STOCK,
            CartError::AddFailed { .. } => MSG_ADD_FAILED,
            CartError::UpdateFailed { .. } => MSG_UPDATE_FAILED,
            CartError::NotInCart(_) | CartError::RemoveFailed { .. } => MSG_REMOVE_FAILED,
            CartError::Load(_) => MSG_LOAD_FAILED,
        };
        Notification::new(message)
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        warn!(text = %notification.message, "notification");
    }
}

/// Forwards notifications to a channel, for a UI loop or tests to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Nobody listening is fine; the notification is dropped.
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    #[test]
    fn test_messages_per_failure_kind() {
        let id = ProductId::new(1);
        let cases = [
            (
                CartError::StockExceeded {
                    product_id: id,
                    requested: 2,
                    available: 1,
                },
                MSG_OUT_OF_STOCK,
            ),
            (CartError::NotInCart(id), MSG_REMOVE_FAILED),
            (
                CartError::add_failed(id, crate::error::CatalogError::NotFound(id)),
                MSG_ADD_FAILED,
            ),
            (
                CartError::update_failed(id, crate::error::CatalogError::NotFound(id)),
                MSG_UPDATE_FAILED,
            ),
        ];

        for (err, expected) in cases {
            let n = Notification::from(&err);
            assert_eq!(n.message, expected);
        }
    }

    #[test]
    fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::new(MSG_ADD_FAILED));
        assert_eq!(rx.try_recv().unwrap().message, MSG_ADD_FAILED);
    }

    #[test]
    fn test_channel_notifier_without_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::new("ignored"));
    }
}
