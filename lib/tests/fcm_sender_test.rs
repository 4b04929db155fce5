
#[cfg(test)]
mod test {
    use crate::commons::{DefaultData, FcmMock, TestContext, TruncatedFcm, PROJECT_ID};
    use push_dispatcher::dispatch_outcome::ErrorKind;
    use push_dispatcher::dispatcher::Dispatcher;
    use push_dispatcher::fcm_sender::FcmSender;
    use push_dispatcher::notification_preset::NotificationPreset;
    use push_dispatcher::notification_request::NotificationRequest;
    use push_dispatcher::sender::{SendErrorKind, Sender};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use test_context::test_context;

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_return_provider_message_id(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::success(ctx).await;

        let sender = ctx.fcm_sender(3000);
        let message_id = sender.send(&DefaultData::request("device-token")).await?;

        assert_eq!(format!("projects/{PROJECT_ID}/messages/0:1500415314455276%31bd1c9631bd1c96"), message_id);

        let bodies = FcmMock::received_bodies(ctx).await;
        assert_eq!(1, bodies.len());
        assert_eq!(
            json!({
                "message": {
                    "notification": { "title": "Title", "body": "Body" },
                    "token": "device-token",
                }
            }),
            bodies[0]
        );

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_address_topic_with_data(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::success(ctx).await;

        let attributes = HashMap::from([("category".to_string(), "supervisors".to_string())]);
        let request = NotificationRequest::topic("supervisors", "Shift change", "Report to the front desk", Some(attributes))?;

        ctx.fcm_sender(3000).send(&request).await?;

        let bodies = FcmMock::received_bodies(ctx).await;
        let message = &bodies[0]["message"];
        assert_eq!(json!("supervisors"), message["topic"]);
        assert!(message.get("token").is_none());
        assert_eq!(json!({ "category": "supervisors" }), message["data"]);

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_classify_rate_limit_as_transient(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::failure(ctx, 429, "RESOURCE_EXHAUSTED").await;

        let error = ctx.fcm_sender(3000).send(&DefaultData::request("device-token")).await.unwrap_err();

        assert_eq!(SendErrorKind::Transient, error.kind);
        assert_eq!("429 RESOURCE_EXHAUSTED: Request failed with RESOURCE_EXHAUSTED", error.message);

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_classify_server_error_as_transient(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::failure(ctx, 503, "UNAVAILABLE").await;

        let error = ctx.fcm_sender(3000).send(&DefaultData::request("device-token")).await.unwrap_err();

        assert_eq!(SendErrorKind::Transient, error.kind);

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_classify_unregistered_token_as_permanent(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::failure(ctx, 404, "UNREGISTERED").await;

        let error = ctx.fcm_sender(3000).send(&DefaultData::request("device-token")).await.unwrap_err();

        assert_eq!(SendErrorKind::Permanent, error.kind);
        assert!(error.message.contains("UNREGISTERED"));

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_classify_auth_failure_as_permanent(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::failure(ctx, 401, "UNAUTHENTICATED").await;

        let error = ctx.fcm_sender(3000).send(&DefaultData::request("device-token")).await.unwrap_err();

        assert_eq!(SendErrorKind::Permanent, error.kind);

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_classify_timeout_as_transient(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::delayed(ctx, Duration::from_millis(500)).await;

        let error = ctx.fcm_sender(100).send(&DefaultData::request("device-token")).await.unwrap_err();

        assert_eq!(SendErrorKind::Transient, error.kind);

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_retry_provider_outage_until_sent(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::failure_times(ctx, 503, 2).await;
        FcmMock::success(ctx).await;

        let sender: Arc<FcmSender> = Arc::new(ctx.fcm_sender(3000));
        let dispatcher = Dispatcher::new(&DefaultData::resources(sender));

        let result = dispatcher.dispatch(vec![DefaultData::request("device-token")], 1, DefaultData::fast_retry_policy()).await;

        let outcome = &result.outcomes()[0];
        assert!(outcome.is_sent());
        assert_eq!(3, outcome.attempts);
        assert_eq!(3, FcmMock::received_bodies(ctx).await.len());

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_send_bulk_through_fcm_with_mixed_results(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::failure(ctx, 400, "INVALID_ARGUMENT").await;

        let sender: Arc<FcmSender> = Arc::new(ctx.fcm_sender(3000));
        let dispatcher = Dispatcher::new(&DefaultData::resources(sender));

        let result = dispatcher.dispatch(DefaultData::requests(4), 2, DefaultData::fast_retry_policy()).await;

        assert_eq!(4, result.failed_count());
        assert!(result.outcomes().iter().all(|it| it.error_kind == Some(ErrorKind::Permanent) && it.attempts == 1));
        assert_eq!(4, FcmMock::received_bodies(ctx).await.len());

        Ok(())
    }

    #[test_context(TestContext)]
    #[tokio::test]
    async fn should_send_preset_data(ctx: &mut TestContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        FcmMock::success(ctx).await;

        let request = NotificationPreset::Urgent.request("device-token")?;
        ctx.fcm_sender(3000).send(&request).await?;

        let bodies = FcmMock::received_bodies(ctx).await;
        let message = &bodies[0]["message"];
        assert_eq!(json!("🚨 Urgent"), message["notification"]["title"]);
        assert_eq!(json!("5"), message["data"]["type"]);
        assert_eq!(json!("high"), message["data"]["priority"]);
        assert_eq!(json!("true"), message["data"]["action_required"]);
        assert_eq!(json!("false"), message["data"]["read"]);
        assert!(message["data"]["issuedDate"].is_string());

        Ok(())
    }

    #[tokio::test]
    async fn should_classify_unreadable_body_as_transient() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let base_url = TruncatedFcm::start().await;
        let sender = TruncatedFcm::fcm_sender(&base_url);

        let error = sender.send(&DefaultData::request("device-token")).await.err().unwrap();

        assert_eq!(SendErrorKind::Transient, error.kind);
        assert!(error.message.starts_with("200 response body could not be read"), "{}", error.message);

        Ok(())
    }
}
