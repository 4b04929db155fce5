use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_BULK_TITLE: &str = "Bulk Test";
pub const DEFAULT_BULK_DESCRIPTION: &str = "Bulk notification test";
pub const DEFAULT_SCHEDULED_TITLE: &str = "Scheduled Test";
pub const DEFAULT_SCHEDULED_DESCRIPTION: &str = "This notification was delayed";
pub const DEFAULT_SCHEDULED_DELAY_IN_SECONDS: u64 = 5;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub token: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub data: Option<HashMap<String, String>>,
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub notification_type: Option<u8>,
    pub read: Option<bool>,
    pub issued_date: Option<String>,
}

impl SendRequest {
    /// Caller supplied envelope entries, overriding the generated ones.
    pub fn envelope_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();

        if let Some(id) = self.id {
            overrides.insert("id".to_string(), id.to_string());
        }
        if let Some(notification_type) = self.notification_type {
            overrides.insert("type".to_string(), notification_type.to_string());
        }
        if let Some(read) = self.read {
            overrides.insert("read".to_string(), read.to_string());
        }
        if let Some(issued_date) = &self.issued_date {
            overrides.insert("issuedDate".to_string(), issued_date.clone());
        }

        overrides
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TopicRequest {
    pub topic: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub data: Option<HashMap<String, String>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct BulkSendRequest {
    pub tokens: Option<Vec<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotificationRequest {
    pub token: Option<String>,
    pub delay_seconds: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NotificationTypeRequest {
    pub token: Option<String>,
    #[serde(rename = "type")]
    pub preset: Option<String>,
}
