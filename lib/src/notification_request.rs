use crate::error::PushDispatcherError;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// Where a notification is delivered: a single device or every device subscribed to a topic.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    Token(String),
    Topic(String),
}

impl Recipient {
    pub fn as_str(&self) -> &str {
        match self {
            Recipient::Token(token) => token,
            Recipient::Topic(topic) => topic,
        }
    }

    pub fn is_topic(&self) -> bool {
        matches!(self, Recipient::Topic(_))
    }
}

impl fmt::Display for Recipient {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Recipient::Token(token) => write!(f, "token:{token}"),
            Recipient::Topic(topic) => write!(f, "topic:{topic}"),
        }
    }
}

/// A validated notification. Fields are private so a request cannot change once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    recipient: Recipient,
    title: String,
    body: String,
    attributes: HashMap<String, String>,
}

impl NotificationRequest {
    pub fn new(
        recipient: Recipient,
        title: &str,
        body: &str,
        attributes: Option<HashMap<String, String>>,
    ) -> Result<Self, PushDispatcherError> {
        if recipient.as_str().trim().is_empty() {
            return Err(PushDispatcherError::validation("Empty recipient", "Missing FCM token or topic"));
        }

        if title.trim().is_empty() {
            return Err(PushDispatcherError::validation(
                "Empty title",
                &format!("Missing notification title for recipient {recipient}"),
            ));
        }

        if body.trim().is_empty() {
            return Err(PushDispatcherError::validation(
                "Empty body",
                &format!("Missing notification body for recipient {recipient}"),
            ));
        }

        Ok(Self {
            recipient,
            title: title.to_string(),
            body: body.to_string(),
            attributes: attributes.unwrap_or_default(),
        })
    }

    pub fn token(
        token: &str,
        title: &str,
        body: &str,
        attributes: Option<HashMap<String, String>>,
    ) -> Result<Self, PushDispatcherError> {
        Self::new(Recipient::Token(token.to_string()), title, body, attributes)
    }

    pub fn topic(
        topic: &str,
        title: &str,
        body: &str,
        attributes: Option<HashMap<String, String>>,
    ) -> Result<Self, PushDispatcherError> {
        Self::new(Recipient::Topic(topic.to_string()), title, body, attributes)
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Copy marked as sent at `sent_at`: the body gets a `(sent at HH:MM:SS)` suffix and the
    /// `id` and `issuedDate` attributes, when present, are refreshed to that instant.
    pub fn stamped_at(
        &self,
        sent_at: DateTime<Utc>,
    ) -> Self {
        let mut attributes = self.attributes.clone();
        if attributes.contains_key("id") {
            attributes.insert("id".to_string(), sent_at.timestamp_millis().to_string());
        }
        if attributes.contains_key("issuedDate") {
            attributes.insert("issuedDate".to_string(), sent_at.to_rfc3339());
        }

        Self {
            recipient: self.recipient.clone(),
            title: self.title.clone(),
            body: format!("{} (sent at {})", self.body, sent_at.format("%H:%M:%S")),
            attributes,
        }
    }
}
