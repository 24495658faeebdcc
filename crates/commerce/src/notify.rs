//! Notification seam.
//!
//! Order creation and status changes notify the customer through this
//! trait. Delivery is best-effort from the core's perspective: the caller
//! logs failures and never lets them fail the surrounding operation. The
//! real transport (SMTP, push, SMS) lives outside this crate.

use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The underlying transport failed to deliver.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// A fire-and-continue notification sender.
#[allow(async_fn_in_trait)]
pub trait NotificationSender: Send + Sync {
    /// Deliver a message to a recipient.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if delivery fails; callers log and continue.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

impl<T: NotificationSender> NotificationSender for std::sync::Arc<T> {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        (**self).send(recipient, subject, body).await
    }
}

/// A delivered (or attempted) notification, as captured by [`LogSender`].
#[derive(Debug, Clone)]
pub struct SentNotification {
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Sender that logs deliveries through `tracing` and keeps them in memory.
///
/// Stands in for a real transport in tests and local runs; assertions can
/// inspect what was sent via [`LogSender::sent`].
#[derive(Debug, Default)]
pub struct LogSender {
    deliveries: Mutex<Vec<SentNotification>>,
}

impl LogSender {
    /// Create a sender with no deliveries yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSender for LogSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(recipient, subject, "notification sent");
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentNotification {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_captures_deliveries() {
        let sender = LogSender::new();
        sender
            .send("shopper@example.com", "Order Confirmation", "Thanks!")
            .await
            .unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "shopper@example.com");
        assert_eq!(sent[0].subject, "Order Confirmation");
    }
}
