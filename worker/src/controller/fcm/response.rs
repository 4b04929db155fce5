use chrono::{DateTime, Utc};
use push_dispatcher::dispatch_outcome::DispatchOutcome;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Serialize, Debug)]
pub struct SendResponse {
    pub message: String,
    pub outcome: DispatchOutcome,
}

#[derive(Serialize, Debug)]
pub struct BulkSendResponse {
    pub message: String,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<DispatchOutcome>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotificationResponse {
    pub id: Uuid,
    pub message: String,
    pub scheduled_for: DateTime<Utc>,
    pub token: String,
}

#[derive(Serialize, Debug)]
pub struct CancelScheduledResponse {
    pub id: Uuid,
    pub cancelled: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTypeResponse {
    pub message: String,
    #[serde(rename = "type")]
    pub preset: String,
    pub additional_data: HashMap<String, String>,
    pub outcome: DispatchOutcome,
}
