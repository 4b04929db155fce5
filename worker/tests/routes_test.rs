
#[cfg(test)]
mod test {
    use crate::commons::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn should_report_health() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.get("/health").await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("up"), body["status"]);
        assert_eq!(json!(0), body["pendingScheduled"]);

        Ok(())
    }

    #[tokio::test]
    async fn should_send_single_notification() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/fcm/send",
                json!({ "token": "device-1", "title": "Hello", "description": "World", "data": { "orderId": "42" } }),
            )
            .await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("Notification sent successfully"), body["message"]);
        assert_eq!(json!("Sent"), body["outcome"]["status"]);
        assert_eq!(json!("projects/test/messages/device-1"), body["outcome"]["providerMessageId"]);

        let sent = app.sender.sent();
        assert_eq!(1, sent.len());
        assert_eq!("World", sent[0].body());
        assert_eq!(Some(&"42".to_string()), sent[0].attributes().get("orderId"));
        assert_eq!(Some(&"1".to_string()), sent[0].attributes().get("type"));

        Ok(())
    }

    #[tokio::test]
    async fn should_forward_caller_envelope_fields() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, _) = app
            .post(
                "/api/fcm/send",
                json!({
                    "token": "device-1",
                    "title": "Hello",
                    "description": "World",
                    "id": 77,
                    "type": 4,
                    "read": true,
                    "issuedDate": "2024-05-17T13:45:09.000Z"
                }),
            )
            .await;

        assert_eq!(StatusCode::OK, status);

        let attributes = app.sender.sent()[0].attributes().clone();
        assert_eq!(Some(&"77".to_string()), attributes.get("id"));
        assert_eq!(Some(&"4".to_string()), attributes.get("type"));
        assert_eq!(Some(&"true".to_string()), attributes.get("read"));
        assert_eq!(Some(&"2024-05-17T13:45:09.000Z".to_string()), attributes.get("issuedDate"));

        Ok(())
    }

    #[tokio::test]
    async fn should_reject_missing_token() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/fcm/send", json!({ "title": "Hello", "description": "World" })).await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!("Missing FCM token"), body["message"]);
        assert!(app.sender.sent().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn should_return_ok_with_failed_outcome() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/fcm/send", json!({ "token": "bad-device", "title": "Hello", "description": "World" })).await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("Failed"), body["outcome"]["status"]);
        assert_eq!(json!("Permanent"), body["outcome"]["errorKind"]);
        assert_eq!(json!(1), body["outcome"]["attempts"]);

        Ok(())
    }

    #[tokio::test]
    async fn should_send_to_topic() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/fcm/topic", json!({ "topic": "supervisors", "title": "Shift", "description": "Starts now" })).await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("Notification sent to topic 'supervisors'"), body["message"]);
        assert_eq!(json!({ "topic": "supervisors" }), body["outcome"]["recipient"]);
        assert!(app.sender.sent()[0].recipient().is_topic());

        let (status, _) = app.post("/api/fcm/topic", json!({ "topic": "supervisors", "title": "Shift" })).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        Ok(())
    }

    #[tokio::test]
    async fn should_bulk_send_with_per_item_outcomes() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app
            .post("/api/fcm/bulk-send", json!({ "tokens": ["A", "bad-B", "C"], "concurrency": 2 }))
            .await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("Bulk send completed"), body["message"]);
        assert_eq!(json!(3), body["total"]);
        assert_eq!(json!(2), body["successful"]);
        assert_eq!(json!(1), body["failed"]);

        let recipients = body["results"].as_array().unwrap().iter().map(|it| it["recipient"]["token"].clone()).collect::<Vec<_>>();
        assert_eq!(vec![json!("A"), json!("bad-B"), json!("C")], recipients);
        assert_eq!(json!("Failed"), body["results"][1]["status"]);

        let mut titles = app.sender.sent().iter().map(|it| it.title().to_string()).collect::<Vec<_>>();
        titles.sort();
        assert_eq!(vec!["Bulk Test (1/3)", "Bulk Test (2/3)", "Bulk Test (3/3)"], titles);

        Ok(())
    }

    #[tokio::test]
    async fn should_reject_invalid_bulk_batches() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/fcm/bulk-send", json!({ "tokens": [] })).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!("Missing tokens array"), body["cause"]);

        let (status, _) = app.post("/api/fcm/bulk-send", json!({ "title": "No tokens" })).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        let (status, body) = app.post("/api/fcm/bulk-send", json!({ "tokens": ["1", "2", "3", "4", "5", "6"] })).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!("Batch too large"), body["cause"]);

        let (status, _) = app.post("/api/fcm/bulk-send", json!({ "tokens": ["A", ""] })).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        assert!(app.sender.sent().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn should_schedule_and_cancel_notification() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/fcm/scheduled-notification", json!({ "token": "device-1", "delaySeconds": 30 })).await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("Notification scheduled to be sent in 30 seconds"), body["message"]);
        assert_eq!(json!("device-1"), body["token"]);
        assert!(body["scheduledFor"].is_string());
        assert_eq!(1, app.app_state.scheduler.pending_len());

        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = app.delete(&format!("/api/fcm/scheduled-notification/{id}")).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!(true), body["cancelled"]);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let (status, _) = app.delete(&format!("/api/fcm/scheduled-notification/{id}")).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert!(app.sender.sent().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn should_send_scheduled_notification_after_delay() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, _) = app.post("/api/fcm/scheduled-notification", json!({ "token": "device-1", "delaySeconds": 0 })).await;
        assert_eq!(StatusCode::OK, status);

        tokio::time::sleep(Duration::from_millis(200)).await;

        let sent = app.sender.sent();
        assert_eq!(1, sent.len());
        assert_eq!("Scheduled Test", sent[0].title());
        assert!(sent[0].body().starts_with("This notification was delayed (sent at "), "{}", sent[0].body());
        assert_eq!(Some(&"3".to_string()), sent[0].attributes().get("type"));

        Ok(())
    }

    #[tokio::test]
    async fn should_reject_unknown_scheduled_id() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, _) = app.delete(&format!("/api/fcm/scheduled-notification/{}", Uuid::now_v7())).await;
        assert_eq!(StatusCode::NOT_FOUND, status);

        let (status, _) = app.delete("/api/fcm/scheduled-notification/not-a-uuid").await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        Ok(())
    }

    #[tokio::test]
    async fn should_send_notification_preset() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = TestApp::new().await;

        let (status, body) = app.post("/api/fcm/notification-types", json!({ "token": "device-1", "type": "warning" })).await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!("warning notification sent successfully"), body["message"]);
        assert_eq!(json!("high"), body["additionalData"]["priority"]);
        assert_eq!("⚠️ Warning", app.sender.sent()[0].title());

        let (status, body) = app.post("/api/fcm/notification-types", json!({ "token": "device-1", "type": "critical" })).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!("Invalid notification type"), body["cause"]);

        Ok(())
    }
}
