use crate::controller::fcm::request::{
    BulkSendRequest, NotificationTypeRequest, ScheduledNotificationRequest, SendRequest, TopicRequest, DEFAULT_BULK_DESCRIPTION, DEFAULT_BULK_TITLE,
    DEFAULT_SCHEDULED_DELAY_IN_SECONDS, DEFAULT_SCHEDULED_DESCRIPTION, DEFAULT_SCHEDULED_TITLE,
};
use crate::controller::fcm::response::{BulkSendResponse, CancelScheduledResponse, NotificationTypeResponse, ScheduledNotificationResponse, SendResponse};
use crate::infra::axum::{AppJson, AppPath};
use crate::infra::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::Router;
use push_dispatcher::dispatch_outcome::DispatchOutcome;
use push_dispatcher::notification_preset::{
    envelope_attributes, NotificationPreset, BULK_NOTIFICATION_TYPE, DIRECT_NOTIFICATION_TYPE, SCHEDULED_NOTIFICATION_TYPE,
};
use push_dispatcher::notification_request::NotificationRequest;
use push_dispatcher::notification_scheduler::{CancelOutcome, DelayedDispatch};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

pub struct FcmRoutes;

impl FcmRoutes {
    pub fn routes(app_state: AppState) -> Router {
        Router::new()
            .route("/send", post(send_handler))
            .route("/topic", post(topic_handler))
            .route("/bulk-send", post(bulk_send_handler))
            .route("/scheduled-notification", post(schedule_handler))
            .route("/scheduled-notification/:id", delete(cancel_scheduled_handler))
            .route("/notification-types", post(notification_type_handler))
            .with_state(app_state)
    }
}

async fn send_handler(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<SendRequest>,
) -> Result<AppJson<SendResponse>, AppError> {
    info!("POST /api/fcm/send");

    let mut attributes = envelope_attributes(DIRECT_NOTIFICATION_TYPE);
    attributes.extend(request.envelope_overrides());
    attributes.extend(request.data.unwrap_or_default());

    let token = required(request.token, "Missing FCM token")?;

    let notification = NotificationRequest::token(
        &token,
        &request.title.unwrap_or_default(),
        &request.description.unwrap_or_default(),
        Some(attributes),
    )?;

    let outcome = dispatch_one(&app_state, notification).await?;
    let message = if outcome.is_sent() {
        "Notification sent successfully".to_string()
    } else {
        "Notification could not be sent".to_string()
    };

    Ok(AppJson(SendResponse { message, outcome }))
}

async fn topic_handler(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<TopicRequest>,
) -> Result<AppJson<SendResponse>, AppError> {
    info!("POST /api/fcm/topic");

    let topic = required(request.topic, "Missing required fields")?;
    let title = required(request.title, "Missing required fields")?;
    let description = required(request.description, "Missing required fields")?;

    let notification = NotificationRequest::topic(&topic, &title, &description, request.data)?;

    let outcome = dispatch_one(&app_state, notification).await?;
    let message = if outcome.is_sent() {
        format!("Notification sent to topic '{topic}'")
    } else {
        format!("Notification to topic '{topic}' could not be sent")
    };

    Ok(AppJson(SendResponse { message, outcome }))
}

async fn bulk_send_handler(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<BulkSendRequest>,
) -> Result<AppJson<BulkSendResponse>, AppError> {
    info!("POST /api/fcm/bulk-send");

    let tokens = request.tokens.filter(|it| !it.is_empty()).ok_or_else(|| {
        AppError::bad_request(
            "Missing tokens array",
            r#"Expected a body like {"tokens": ["token1", "token2", "token3"], "title": "Optional title", "description": "Optional description"}"#,
        )
    })?;

    let title = request.title.unwrap_or(DEFAULT_BULK_TITLE.to_string());
    let description = request.description.unwrap_or(DEFAULT_BULK_DESCRIPTION.to_string());
    let total = tokens.len();

    let notifications = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            NotificationRequest::token(
                token,
                &format!("{} ({}/{})", title, index + 1, total),
                &format!("{} - Message {}", description, index + 1),
                Some(envelope_attributes(BULK_NOTIFICATION_TYPE)),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let concurrency = request.concurrency.unwrap_or(app_state.default_concurrency);

    let result = app_state
        .dispatcher
        .try_dispatch(notifications, concurrency, app_state.retry_policy, Some(app_state.dispatch_timeout))
        .await?;

    info!("Bulk send completed with {} sent and {} failed of {}", result.sent_count(), result.failed_count(), result.total());

    Ok(AppJson(BulkSendResponse {
        message: "Bulk send completed".to_string(),
        total: result.total(),
        successful: result.sent_count(),
        failed: result.failed_count(),
        results: result.into_outcomes(),
    }))
}

async fn schedule_handler(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<ScheduledNotificationRequest>,
) -> Result<AppJson<ScheduledNotificationResponse>, AppError> {
    info!("POST /api/fcm/scheduled-notification");

    let token = required(request.token, "Missing FCM token")?;

    let notification = NotificationRequest::token(
        &token,
        &request.title.unwrap_or(DEFAULT_SCHEDULED_TITLE.to_string()),
        &request.description.unwrap_or(DEFAULT_SCHEDULED_DESCRIPTION.to_string()),
        Some(envelope_attributes(SCHEDULED_NOTIFICATION_TYPE)),
    )?;

    let delay_in_seconds = request.delay_seconds.map(|it| it.max(0) as u64).unwrap_or(DEFAULT_SCHEDULED_DELAY_IN_SECONDS);

    let (ack, _) = app_state
        .scheduler
        .schedule(DelayedDispatch::new(notification, Duration::from_secs(delay_in_seconds)).stamped_on_send());

    Ok(AppJson(ScheduledNotificationResponse {
        id: ack.id,
        message: format!("Notification scheduled to be sent in {} seconds", ack.delay.as_secs()),
        scheduled_for: ack.scheduled_for,
        token,
    }))
}

async fn cancel_scheduled_handler(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<AppJson<CancelScheduledResponse>, AppError> {
    info!("DELETE /api/fcm/scheduled-notification/{}", id);

    match app_state.scheduler.cancel(&id) {
        CancelOutcome::Cancelled => Ok(AppJson(CancelScheduledResponse { id, cancelled: true })),
        CancelOutcome::AlreadyStarted => Err(AppError::with_status(
            StatusCode::CONFLICT,
            "Scheduled notification already started",
            &format!("Scheduled notification {id} is already being sent"),
        )),
        CancelOutcome::NotFound => Err(AppError::with_status(
            StatusCode::NOT_FOUND,
            "Scheduled notification not found",
            &format!("No pending scheduled notification with id {id}"),
        )),
    }
}

async fn notification_type_handler(
    State(app_state): State<AppState>,
    AppJson(request): AppJson<NotificationTypeRequest>,
) -> Result<AppJson<NotificationTypeResponse>, AppError> {
    info!("POST /api/fcm/notification-types");

    let token = required(request.token, "Missing FCM token")?;
    let preset = request.preset.unwrap_or(NotificationPreset::Info.name().to_string()).parse::<NotificationPreset>()?;

    let outcome = dispatch_one(&app_state, preset.request(&token)?).await?;
    let message = if outcome.is_sent() {
        format!("{} notification sent successfully", preset.name())
    } else {
        format!("{} notification could not be sent", preset.name())
    };

    Ok(AppJson(NotificationTypeResponse {
        message,
        preset: preset.name().to_string(),
        additional_data: preset.data(),
        outcome,
    }))
}

async fn dispatch_one(
    app_state: &AppState,
    notification: NotificationRequest,
) -> Result<DispatchOutcome, AppError> {
    app_state
        .dispatcher
        .dispatch_with_timeout(vec![notification], 1, app_state.retry_policy, app_state.dispatch_timeout)
        .await
        .into_outcomes()
        .into_iter()
        .next()
        .ok_or_else(|| AppError::new("Missing dispatch outcome", "Dispatcher returned no outcome for the notification"))
}

fn required(
    value: Option<String>,
    message: &str,
) -> Result<String, AppError> {
    value.filter(|it| !it.trim().is_empty()).ok_or_else(|| AppError::bad_request(message, message))
}
