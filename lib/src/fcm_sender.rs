use crate::environment::Environment;
use crate::error::PushDispatcherError;
use crate::http_gateway::HttpGateway;
use crate::notification_request::{NotificationRequest, Recipient};
use crate::sender::{SendError, Sender};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, instrument};

pub const DEFAULT_FCM_BASE_URL: &str = "https://fcm.googleapis.com";

#[derive(Deserialize)]
struct FcmSendResponse {
    name: String,
}

#[derive(Deserialize)]
struct FcmErrorResponse {
    error: FcmErrorBody,
}

#[derive(Deserialize)]
struct FcmErrorBody {
    status: Option<String>,
    message: Option<String>,
}

/// [`Sender`] backed by the FCM HTTP v1 `messages:send` endpoint.
///
/// The access token is taken as configured; obtaining and refreshing it is left to the deployment.
#[derive(Clone)]
pub struct FcmSender {
    http_gateway: HttpGateway,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl FcmSender {
    pub fn new(
        http_gateway: HttpGateway,
        base_url: &str,
        project_id: &str,
        access_token: &str,
    ) -> Self {
        Self {
            http_gateway,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, PushDispatcherError> {
        let project_id = Environment::optional_string("FCM_PROJECT_ID")
            .ok_or_else(|| PushDispatcherError::new("Missing FCM_PROJECT_ID", "Failed to configure fcm sender"))?;
        let access_token = Environment::optional_string("FCM_ACCESS_TOKEN")
            .ok_or_else(|| PushDispatcherError::new("Missing FCM_ACCESS_TOKEN", "Failed to configure fcm sender"))?;
        let base_url = Environment::string("FCM_BASE_URL", DEFAULT_FCM_BASE_URL);
        let http_gateway = HttpGateway::new(Environment::u64("HTTP_TIMEOUT_IN_MILLIS", 3000))?;

        Ok(Self::new(http_gateway, &base_url, &project_id, &access_token))
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/projects/{}/messages:send", self.base_url, self.project_id)
    }

    pub fn message(request: &NotificationRequest) -> Value {
        let mut message = json!({
            "notification": {
                "title": request.title(),
                "body": request.body(),
            },
        });

        if !request.attributes().is_empty() {
            message["data"] = json!(request.attributes());
        }

        match request.recipient() {
            Recipient::Token(token) => message["token"] = json!(token),
            Recipient::Topic(topic) => message["topic"] = json!(topic),
        }

        json!({ "message": message })
    }
}

#[async_trait]
impl Sender for FcmSender {
    #[instrument(skip_all, name = "send_to_fcm")]
    async fn send(
        &self,
        request: &NotificationRequest,
    ) -> Result<String, SendError> {
        let result = self
            .http_gateway
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .body(Self::message(request).to_string())
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                error!("Failed to reach fcm for {} cause {}", request.recipient(), error);
                return Err(SendError::transient(&error.to_string()));
            },
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                error!("Failed to read fcm response for {} cause {}", request.recipient(), error);
                return Err(SendError::transient(&format!("{} response body could not be read: {}", status.as_u16(), error)));
            },
        };

        if status.is_success() {
            return serde_json::from_str::<FcmSendResponse>(&body)
                .map(|it| it.name)
                .map_err(|error| SendError::permanent(&format!("Unexpected fcm response body: {error}")));
        }

        let message = error_message(status, &body);

        if is_transient(status) {
            Err(SendError::transient(&message))
        } else {
            Err(SendError::permanent(&message))
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn error_message(
    status: StatusCode,
    body: &str,
) -> String {
    match serde_json::from_str::<FcmErrorResponse>(body) {
        Ok(response) => format!(
            "{} {}: {}",
            status.as_u16(),
            response.error.status.unwrap_or("UNKNOWN".to_string()),
            response.error.message.unwrap_or("unknown".to_string())
        ),
        Err(_) if body.is_empty() => format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("unknown")),
        Err(_) => format!("{} {}", status.as_u16(), body),
    }
}
