use crate::infra::error::AppError;
use push_dispatcher::dispatcher::Dispatcher;
use push_dispatcher::dispatcher_resources::DispatcherResources;
use push_dispatcher::fcm_sender::FcmSender;
use push_dispatcher::notification_scheduler::NotificationScheduler;
use push_dispatcher::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub scheduler: NotificationScheduler,
    pub retry_policy: RetryPolicy,
    pub default_concurrency: usize,
    pub dispatch_timeout: Duration,
}

impl AppState {
    pub async fn new() -> Result<Self, AppError> {
        let fcm_sender = FcmSender::from_env()?;

        Ok(Self::from_resources(&DispatcherResources::from_env(Arc::new(fcm_sender))))
    }

    pub fn from_resources(resources: &DispatcherResources) -> Self {
        Self {
            dispatcher: Dispatcher::new(resources),
            scheduler: NotificationScheduler::new(resources),
            retry_policy: resources.retry_policy.unwrap_or_default(),
            default_concurrency: resources.default_concurrency.unwrap_or(5),
            dispatch_timeout: Duration::from_millis(resources.dispatch_timeout_in_millis.unwrap_or(30_000)),
        }
    }
}
