use crate::notification_request::Recipient;
use crate::sender::{SendError, SendErrorKind};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Sent,
    Failed,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    /// The batch was cancelled or timed out before this request was started.
    Cancelled,
}

impl From<SendErrorKind> for ErrorKind {
    fn from(kind: SendErrorKind) -> Self {
        match kind {
            SendErrorKind::Transient => ErrorKind::Transient,
            SendErrorKind::Permanent => ErrorKind::Permanent,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub recipient: Recipient,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub attempts: u32,
}

impl DispatchOutcome {
    pub fn sent(
        recipient: Recipient,
        provider_message_id: String,
        attempts: u32,
    ) -> Self {
        Self {
            recipient,
            status: DispatchStatus::Sent,
            provider_message_id: Some(provider_message_id),
            error_kind: None,
            error_message: None,
            attempts,
        }
    }

    pub fn failed(
        recipient: Recipient,
        error: &SendError,
        attempts: u32,
    ) -> Self {
        Self {
            recipient,
            status: DispatchStatus::Failed,
            provider_message_id: None,
            error_kind: Some(error.kind.into()),
            error_message: Some(error.message.clone()),
            attempts,
        }
    }

    pub fn cancelled(recipient: Recipient) -> Self {
        Self {
            recipient,
            status: DispatchStatus::Failed,
            provider_message_id: None,
            error_kind: Some(ErrorKind::Cancelled),
            error_message: Some("Dispatch cancelled before the request was started".to_string()),
            attempts: 0,
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DispatchStatus::Sent
    }
}
