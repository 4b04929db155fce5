use crate::batch_result::BatchResult;
use crate::dispatch_outcome::DispatchOutcome;
use crate::dispatcher_resources::DispatcherResources;
use crate::error::PushDispatcherError;
use crate::notification_request::NotificationRequest;
use crate::retry_policy::RetryPolicy;
use crate::sender::{SendError, Sender};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

pub const DEFAULT_MAX_CONCURRENCY: usize = 20;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

type PendingQueue = Mutex<VecDeque<(usize, NotificationRequest)>>;
type OutcomeSlots = [OnceLock<DispatchOutcome>];

/// Fans a batch out to the injected [`Sender`] through a bounded pool of workers.
///
/// Each worker pulls the next pending request from a shared queue and runs it to a terminal
/// state, retries included, before pulling again. Every outcome is written into the slot at the
/// position of its request as soon as it is known, so the returned [`BatchResult`] always follows
/// input order and a worker that dies never takes finished outcomes with it.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn Sender>,
    max_concurrency: usize,
    max_batch_size: usize,
}

impl Dispatcher {
    pub fn new(resources: &DispatcherResources) -> Self {
        Self {
            sender: resources.sender.clone(),
            max_concurrency: resources.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY).max(1),
            max_batch_size: resources.max_batch_size.unwrap_or(DEFAULT_MAX_BATCH_SIZE).max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn effective_concurrency(
        &self,
        concurrency: usize,
    ) -> usize {
        concurrency.clamp(1, self.max_concurrency)
    }

    pub fn validate_batch(
        &self,
        requests: &[NotificationRequest],
    ) -> Result<(), PushDispatcherError> {
        if requests.len() > self.max_batch_size {
            return Err(PushDispatcherError::validation(
                "Batch too large",
                &format!("Batch of {} notifications exceeds the maximum of {}", requests.len(), self.max_batch_size),
            ));
        }

        Ok(())
    }

    /// Rejects oversized batches as a whole, otherwise dispatches like [`Dispatcher::dispatch_with_timeout`].
    pub async fn try_dispatch(
        &self,
        requests: Vec<NotificationRequest>,
        concurrency: usize,
        retry_policy: RetryPolicy,
        timeout: Option<Duration>,
    ) -> Result<BatchResult, PushDispatcherError> {
        self.validate_batch(&requests)?;

        let deadline = timeout.map(|timeout| Instant::now() + timeout);

        Ok(self.run(requests, concurrency, retry_policy, CancellationToken::new(), deadline).await)
    }

    pub async fn dispatch(
        &self,
        requests: Vec<NotificationRequest>,
        concurrency: usize,
        retry_policy: RetryPolicy,
    ) -> BatchResult {
        self.run(requests, concurrency, retry_policy, CancellationToken::new(), None).await
    }

    /// Once `timeout` expires no new send is started. In-flight sends finish on their own and
    /// requests still queued come back as cancelled.
    pub async fn dispatch_with_timeout(
        &self,
        requests: Vec<NotificationRequest>,
        concurrency: usize,
        retry_policy: RetryPolicy,
        timeout: Duration,
    ) -> BatchResult {
        self.run(requests, concurrency, retry_policy, CancellationToken::new(), Some(Instant::now() + timeout))
            .await
    }

    pub async fn dispatch_until(
        &self,
        requests: Vec<NotificationRequest>,
        concurrency: usize,
        retry_policy: RetryPolicy,
        cancellation: CancellationToken,
    ) -> BatchResult {
        self.run(requests, concurrency, retry_policy, cancellation.child_token(), None).await
    }

    async fn run(
        &self,
        requests: Vec<NotificationRequest>,
        concurrency: usize,
        retry_policy: RetryPolicy,
        cancellation: CancellationToken,
        deadline: Option<Instant>,
    ) -> BatchResult {
        if requests.is_empty() {
            return BatchResult::default();
        }

        let total = requests.len();
        let recipients = requests.iter().map(|it| it.recipient().clone()).collect::<Vec<_>>();
        let workers_len = self.effective_concurrency(concurrency).min(total);
        let queue: Arc<PendingQueue> = Arc::new(Mutex::new(requests.into_iter().enumerate().collect()));

        debug!("Dispatching {} notifications with {} workers", total, workers_len);

        let slots: Arc<OutcomeSlots> = (0..total).map(|_| OnceLock::new()).collect();

        let mut workers = JoinSet::new();
        for _ in 0..workers_len {
            workers.spawn(run_worker(self.sender.clone(), queue.clone(), slots.clone(), retry_policy, cancellation.clone()));
        }

        let expiration = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiration);

        loop {
            tokio::select! {
                joined = workers.join_next() => {
                    match joined {
                        Some(Ok(())) => {},
                        Some(Err(error)) => {
                            error!("Dispatch worker stopped unexpectedly: {}", error);
                            if !cancellation.is_cancelled() && has_pending(&queue) {
                                workers.spawn(run_worker(self.sender.clone(), queue.clone(), slots.clone(), retry_policy, cancellation.clone()));
                            }
                        },
                        None => break,
                    }
                }
                _ = &mut expiration, if !cancellation.is_cancelled() => {
                    warn!("Dispatch of {} notifications timed out, no new sends will be started", total);
                    cancellation.cancel();
                }
            }
        }

        for (position, request) in drain_pending(&queue) {
            let _ = slots[position].set(DispatchOutcome::cancelled(request.recipient().clone()));
        }

        let outcomes = slots
            .iter()
            .zip(recipients)
            .map(|(slot, recipient)| match slot.get() {
                Some(outcome) => outcome.clone(),
                None => DispatchOutcome::failed(recipient, &SendError::permanent("Dispatch worker stopped before reporting an outcome"), 1),
            })
            .collect::<Vec<_>>();

        BatchResult::new(outcomes)
    }
}

async fn run_worker(
    sender: Arc<dyn Sender>,
    queue: Arc<PendingQueue>,
    slots: Arc<OutcomeSlots>,
    retry_policy: RetryPolicy,
    cancellation: CancellationToken,
) {
    while !cancellation.is_cancelled() {
        let Some((position, request)) = next_request(&queue) else {
            break;
        };

        let outcome = deliver(sender.as_ref(), &request, &retry_policy, &cancellation).await;
        let _ = slots[position].set(outcome);
    }
}

async fn deliver(
    sender: &dyn Sender,
    request: &NotificationRequest,
    retry_policy: &RetryPolicy,
    cancellation: &CancellationToken,
) -> DispatchOutcome {
    let recipient = request.recipient().clone();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let error = match sender.send(request).await {
            Ok(provider_message_id) => {
                debug!("Notification to {} sent as {} after {} attempt(s)", recipient, provider_message_id, attempts);
                return DispatchOutcome::sent(recipient, provider_message_id, attempts);
            },
            Err(error) => error,
        };

        if !retry_policy.should_retry(&error, attempts) {
            warn!("Failed to send notification to {} after {} attempt(s) cause {}", recipient, attempts, error);
            return DispatchOutcome::failed(recipient, &error, attempts);
        }

        let delay = retry_policy.backoff(attempts);
        debug!("Retrying notification to {} in {:?} cause {}", recipient, delay, error);

        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            _ = cancellation.cancelled() => {
                warn!("Dispatch cancelled while waiting to retry notification to {}", recipient);
                return DispatchOutcome::failed(recipient, &error, attempts);
            }
        }
    }
}

fn next_request(queue: &PendingQueue) -> Option<(usize, NotificationRequest)> {
    match queue.lock() {
        Ok(mut pending) => pending.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

fn has_pending(queue: &PendingQueue) -> bool {
    match queue.lock() {
        Ok(pending) => !pending.is_empty(),
        Err(poisoned) => !poisoned.into_inner().is_empty(),
    }
}

fn drain_pending(queue: &PendingQueue) -> Vec<(usize, NotificationRequest)> {
    match queue.lock() {
        Ok(mut pending) => pending.drain(..).collect(),
        Err(poisoned) => poisoned.into_inner().drain(..).collect(),
    }
}
