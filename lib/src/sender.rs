use crate::notification_request::NotificationRequest;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// Timeouts, rate limits, provider-side outages. Worth another attempt.
    Transient,
    /// Invalid recipient, malformed payload, rejected credentials.
    Permanent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendError {
    pub kind: SendErrorKind,
    pub message: String,
}

impl SendError {
    pub fn transient(message: &str) -> Self {
        Self {
            kind: SendErrorKind::Transient,
            message: message.to_string(),
        }
    }

    pub fn permanent(message: &str) -> Self {
        Self {
            kind: SendErrorKind::Permanent,
            message: message.to_string(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == SendErrorKind::Transient
    }
}

impl std::error::Error for SendError {}

impl fmt::Display for SendError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// One remote delivery attempt. Returns the provider's message id on success.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(
        &self,
        request: &NotificationRequest,
    ) -> Result<String, SendError>;
}
