use crate::error::PushDispatcherError;
use crate::notification_request::NotificationRequest;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Numeric `type` carried in the data payload of ad-hoc notifications.
pub const DIRECT_NOTIFICATION_TYPE: u8 = 1;
pub const BULK_NOTIFICATION_TYPE: u8 = 2;
pub const SCHEDULED_NOTIFICATION_TYPE: u8 = 3;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPreset {
    Info,
    Warning,
    Error,
    Success,
    Urgent,
}

impl NotificationPreset {
    pub const ALL: [NotificationPreset; 5] = [
        NotificationPreset::Info,
        NotificationPreset::Warning,
        NotificationPreset::Error,
        NotificationPreset::Success,
        NotificationPreset::Urgent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NotificationPreset::Info => "info",
            NotificationPreset::Warning => "warning",
            NotificationPreset::Error => "error",
            NotificationPreset::Success => "success",
            NotificationPreset::Urgent => "urgent",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationPreset::Info => "ℹ️ Information",
            NotificationPreset::Warning => "⚠️ Warning",
            NotificationPreset::Error => "❌ Error",
            NotificationPreset::Success => "✅ Success",
            NotificationPreset::Urgent => "🚨 Urgent",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NotificationPreset::Info => "This is an informational notification",
            NotificationPreset::Warning => "This is a warning notification",
            NotificationPreset::Error => "This is an error notification",
            NotificationPreset::Success => "Operation completed successfully!",
            NotificationPreset::Urgent => "This requires immediate attention!",
        }
    }

    pub fn type_code(&self) -> u8 {
        match self {
            NotificationPreset::Info => 1,
            NotificationPreset::Warning => 2,
            NotificationPreset::Error => 3,
            NotificationPreset::Success => 4,
            NotificationPreset::Urgent => 5,
        }
    }

    pub fn data(&self) -> HashMap<String, String> {
        let entries: &[(&str, &str)] = match self {
            NotificationPreset::Info => &[("priority", "normal"), ("category", "info")],
            NotificationPreset::Warning => &[("priority", "high"), ("category", "warning"), ("action_required", "false")],
            NotificationPreset::Error => &[("priority", "high"), ("category", "error"), ("action_required", "true")],
            NotificationPreset::Success => &[("priority", "normal"), ("category", "success")],
            NotificationPreset::Urgent => &[("priority", "high"), ("category", "urgent"), ("action_required", "true")],
        };

        entries.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
    }

    pub fn request(
        &self,
        token: &str,
    ) -> Result<NotificationRequest, PushDispatcherError> {
        let mut attributes = envelope_attributes(self.type_code());
        attributes.extend(self.data());

        NotificationRequest::token(token, self.title(), self.description(), Some(attributes))
    }
}

impl FromStr for NotificationPreset {
    type Err = PushDispatcherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|preset| preset.name() == value).ok_or_else(|| {
            PushDispatcherError::validation(
                "Invalid notification type",
                &format!(
                    "Unknown notification type '{}', available types: {}",
                    value,
                    Self::ALL.iter().map(|it| it.name()).collect::<Vec<_>>().join(", ")
                ),
            )
        })
    }
}

/// Data entries every notification carries: a millisecond id, its `type`, an unread flag and the issue date.
pub fn envelope_attributes(type_code: u8) -> HashMap<String, String> {
    let issued_at = Utc::now();

    HashMap::from([
        ("id".to_string(), issued_at.timestamp_millis().to_string()),
        ("type".to_string(), type_code.to_string()),
        ("read".to_string(), "false".to_string()),
        ("issuedDate".to_string(), issued_at.to_rfc3339()),
    ])
}
