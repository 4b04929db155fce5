use crate::environment::Environment;
use crate::retry_policy::{RetryPolicy, DEFAULT_BASE_DELAY_IN_MILLIS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_IN_MILLIS};
use crate::sender::Sender;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DispatcherResources {
    pub sender: Arc<dyn Sender>,
    pub max_concurrency: Option<usize>,
    pub default_concurrency: Option<usize>,
    pub max_batch_size: Option<usize>,
    pub retry_policy: Option<RetryPolicy>,
    pub dispatch_timeout_in_millis: Option<u64>,
    pub schedule_min_delay_in_millis: Option<u64>,
    pub schedule_max_delay_in_millis: Option<u64>,
}

impl DispatcherResources {
    pub fn new(sender: Arc<dyn Sender>) -> Self {
        Self {
            sender,
            max_concurrency: None,
            default_concurrency: None,
            max_batch_size: None,
            retry_policy: None,
            dispatch_timeout_in_millis: None,
            schedule_min_delay_in_millis: None,
            schedule_max_delay_in_millis: None,
        }
    }

    pub fn from_env(sender: Arc<dyn Sender>) -> Self {
        let retry_policy = RetryPolicy::new(
            Environment::u32("DISPATCH_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            Duration::from_millis(Environment::u64("DISPATCH_BASE_DELAY_IN_MILLIS", DEFAULT_BASE_DELAY_IN_MILLIS)),
            Duration::from_millis(Environment::u64("DISPATCH_MAX_DELAY_IN_MILLIS", DEFAULT_MAX_DELAY_IN_MILLIS)),
        );

        Self::new(sender)
            .with_max_concurrency(Environment::usize("DISPATCH_MAX_CONCURRENCY", 20))
            .with_default_concurrency(Environment::usize("DISPATCH_DEFAULT_CONCURRENCY", 5))
            .with_max_batch_size(Environment::usize("DISPATCH_MAX_BATCH_SIZE", 500))
            .with_retry_policy(retry_policy)
            .with_dispatch_timeout_in_millis(Environment::u64("DISPATCH_TIMEOUT_IN_SECONDS", 30).saturating_mul(1000))
            .with_schedule_delay_range_in_millis(
                Environment::u64("SCHEDULE_MIN_DELAY_IN_SECONDS", 1).saturating_mul(1000),
                Environment::u64("SCHEDULE_MAX_DELAY_IN_SECONDS", 60).saturating_mul(1000),
            )
    }

    pub fn with_max_concurrency(
        self,
        max_concurrency: usize,
    ) -> Self {
        Self {
            max_concurrency: Some(max_concurrency),
            ..self
        }
    }

    pub fn with_default_concurrency(
        self,
        default_concurrency: usize,
    ) -> Self {
        Self {
            default_concurrency: Some(default_concurrency),
            ..self
        }
    }

    pub fn with_max_batch_size(
        self,
        max_batch_size: usize,
    ) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..self
        }
    }

    pub fn with_retry_policy(
        self,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            retry_policy: Some(retry_policy),
            ..self
        }
    }

    pub fn with_dispatch_timeout_in_millis(
        self,
        dispatch_timeout_in_millis: u64,
    ) -> Self {
        Self {
            dispatch_timeout_in_millis: Some(dispatch_timeout_in_millis),
            ..self
        }
    }

    pub fn with_schedule_delay_range_in_millis(
        self,
        min_delay_in_millis: u64,
        max_delay_in_millis: u64,
    ) -> Self {
        Self {
            schedule_min_delay_in_millis: Some(min_delay_in_millis),
            schedule_max_delay_in_millis: Some(max_delay_in_millis),
            ..self
        }
    }
}
