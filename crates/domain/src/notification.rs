//! Outbound client notifications.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Notification failed: {0}")]
pub struct NotifierError(pub String);

/// Email-like side channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}

/// What happened to the notification that follows a transition.
///
/// Advisory only: the transition it accompanies has already been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    /// The client could not be loaded, so nothing was sent.
    ClientUnavailable { reason: String },
    /// The notifier rejected the message.
    Failed { reason: String },
}

/// Writes notifications to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        tracing::info!(%to, %subject, %body, "email sent");
        Ok(())
    }
}

/// A message captured by [`InMemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<SentEmail>,
    fail_on_send: bool,
}

/// Records messages in memory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following send fail.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_send = fail;
    }

    /// Returns all messages sent so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.fail_on_send {
            return Err(NotifierError("simulated send failure".to_string()));
        }
        state.sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
