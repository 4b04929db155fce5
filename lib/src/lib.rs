pub mod batch_result;
pub mod dispatch_outcome;
pub mod dispatcher;
pub mod dispatcher_resources;
pub mod environment;
pub mod error;
pub mod fcm_sender;
pub mod http_gateway;
pub mod notification_preset;
pub mod notification_request;
pub mod notification_scheduler;
pub mod retry_policy;
pub mod sender;
pub mod shutdown;
