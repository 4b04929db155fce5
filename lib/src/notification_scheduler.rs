use crate::batch_result::BatchResult;
use crate::dispatcher::Dispatcher;
use crate::dispatcher_resources::DispatcherResources;
use crate::notification_request::{NotificationRequest, Recipient};
use crate::retry_policy::RetryPolicy;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_MIN_DELAY_IN_MILLIS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_IN_MILLIS: u64 = 60_000;

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// A single notification to be dispatched once `delay` has elapsed.
#[derive(Debug, Clone)]
pub struct DelayedDispatch {
    request: NotificationRequest,
    delay: Duration,
    stamp_on_send: bool,
}

impl DelayedDispatch {
    pub fn new(
        request: NotificationRequest,
        delay: Duration,
    ) -> Self {
        Self {
            request,
            delay,
            stamp_on_send: false,
        }
    }

    /// Marks the request with the time it actually goes out, see [`NotificationRequest::stamped_at`].
    pub fn stamped_on_send(self) -> Self {
        Self {
            stamp_on_send: true,
            ..self
        }
    }

    pub fn request(&self) -> &NotificationRequest {
        &self.request
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_stamped_on_send(&self) -> bool {
        self.stamp_on_send
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleAck {
    pub id: Uuid,
    pub recipient: Recipient,
    pub delay: Duration,
    pub scheduled_for: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyStarted,
    NotFound,
}

#[derive(Clone)]
struct ScheduledTicket {
    state: Arc<AtomicU8>,
    cancellation: CancellationToken,
}

impl ScheduledTicket {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
            cancellation: CancellationToken::new(),
        }
    }

    fn cancel(&self) -> bool {
        let cancelled = self.state.compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire).is_ok();
        if cancelled {
            self.cancellation.cancel();
        }
        cancelled
    }

    fn start(&self) -> bool {
        self.state.compare_exchange(PENDING, STARTED, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }
}

pub struct ScheduledHandle {
    id: Uuid,
    ticket: ScheduledTicket,
    task: JoinHandle<Option<BatchResult>>,
}

impl ScheduledHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns `true` when the send was prevented. Once the send has started this is a no-op.
    pub fn cancel(&self) -> bool {
        self.ticket.cancel()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the scheduled send. `None` when it was cancelled.
    pub async fn outcome(self) -> Option<BatchResult> {
        match self.task.await {
            Ok(result) => result,
            Err(error) => {
                error!("Scheduled notification {} stopped unexpectedly: {}", self.id, error);
                None
            },
        }
    }
}

#[derive(Clone)]
pub struct NotificationScheduler {
    dispatcher: Dispatcher,
    retry_policy: RetryPolicy,
    min_delay: Duration,
    max_delay: Duration,
    pending: Arc<Mutex<HashMap<Uuid, ScheduledTicket>>>,
}

impl NotificationScheduler {
    pub fn new(resources: &DispatcherResources) -> Self {
        let min_delay = Duration::from_millis(resources.schedule_min_delay_in_millis.unwrap_or(DEFAULT_MIN_DELAY_IN_MILLIS));
        let max_delay = Duration::from_millis(resources.schedule_max_delay_in_millis.unwrap_or(DEFAULT_MAX_DELAY_IN_MILLIS));

        Self {
            dispatcher: Dispatcher::new(resources),
            retry_policy: resources.retry_policy.unwrap_or_default(),
            min_delay,
            max_delay: max_delay.max(min_delay),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn clamp_delay(
        &self,
        delay: Duration,
    ) -> Duration {
        delay.clamp(self.min_delay, self.max_delay)
    }

    /// Returns as soon as the send is scheduled. Must be called from within a tokio runtime.
    pub fn schedule(
        &self,
        delayed_dispatch: DelayedDispatch,
    ) -> (ScheduleAck, ScheduledHandle) {
        let id = Uuid::now_v7();
        let delay = self.clamp_delay(delayed_dispatch.delay());
        let scheduled_for = Utc::now() + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        let ack = ScheduleAck {
            id,
            recipient: delayed_dispatch.request().recipient().clone(),
            delay,
            scheduled_for,
        };

        let ticket = ScheduledTicket::new();
        self.register(id, ticket.clone());

        let scheduler = self.clone();
        let task_ticket = ticket.clone();
        let task = tokio::spawn(async move {
            let result = scheduler.run_scheduled(id, delayed_dispatch, delay, &task_ticket).await;
            scheduler.unregister(&id);
            result
        });

        info!("Notification {} to {} scheduled for {}", id, ack.recipient, scheduled_for.to_rfc3339());

        (ack, ScheduledHandle { id, ticket, task })
    }

    pub fn cancel(
        &self,
        id: &Uuid,
    ) -> CancelOutcome {
        let ticket = match self.pending.lock() {
            Ok(pending) => pending.get(id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(id).cloned(),
        };

        match ticket {
            None => CancelOutcome::NotFound,
            Some(ticket) if ticket.cancel() => CancelOutcome::Cancelled,
            Some(_) => CancelOutcome::AlreadyStarted,
        }
    }

    pub fn pending_len(&self) -> usize {
        match self.pending.lock() {
            Ok(pending) => pending.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    async fn run_scheduled(
        &self,
        id: Uuid,
        delayed_dispatch: DelayedDispatch,
        delay: Duration,
        ticket: &ScheduledTicket,
    ) -> Option<BatchResult> {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            _ = ticket.cancellation.cancelled() => {},
        }

        if !ticket.start() {
            info!("Scheduled notification {} cancelled before sending", id);
            return None;
        }

        let request = if delayed_dispatch.stamp_on_send {
            delayed_dispatch.request.stamped_at(Utc::now())
        } else {
            delayed_dispatch.request
        };

        let result = self.dispatcher.dispatch(vec![request], 1, self.retry_policy).await;

        for outcome in result.outcomes() {
            if outcome.is_sent() {
                info!("Scheduled notification {} sent to {} after {:?}", id, outcome.recipient, delay);
            } else {
                error!(
                    "Scheduled notification {} to {} failed cause {}",
                    id,
                    outcome.recipient,
                    outcome.error_message.clone().unwrap_or("unknown".to_string())
                );
            }
        }

        Some(result)
    }

    fn register(
        &self,
        id: Uuid,
        ticket: ScheduledTicket,
    ) {
        match self.pending.lock() {
            Ok(mut pending) => pending.insert(id, ticket),
            Err(poisoned) => poisoned.into_inner().insert(id, ticket),
        };
    }

    fn unregister(
        &self,
        id: &Uuid,
    ) {
        match self.pending.lock() {
            Ok(mut pending) => pending.remove(id),
            Err(poisoned) => poisoned.into_inner().remove(id),
        };
    }
}
