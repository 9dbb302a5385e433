//! Request scheduler
//!
//! This module handles:
//! - The FIFO queue of URIs waiting to be fetched
//! - Bounded concurrency of in-flight fetches
//! - Start delays with jitter and adaptive backoff
//! - Per-request timeouts and cooperative cancellation
//!
//! Every attempt is reported to the caller's callback, including transport
//! failures. Only errors returned by the callback abort processing.

use super::throttle::Throttle;
use super::transport::{HttpResponse, HttpTransport};
use crate::config::SchedulerConfig;
use crate::{Result, TransportError};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Outcome of a single fetch
#[derive(Debug)]
pub enum RequestOutcome {
    Response(HttpResponse),
    Failure(TransportError),
}

/// Report of one attempt, handed to the scheduler callback
#[derive(Debug)]
pub struct RequestResult {
    pub request_uri: Url,

    /// Wall-clock time the fetch was issued
    pub request_start: DateTime<Utc>,

    /// Delay applied before the fetch was issued
    pub request_start_delay: Duration,

    /// Fetch latency, excluding the start delay and the callback
    pub elapsed_time: Duration,

    pub outcome: RequestOutcome,
}

struct RequestContext {
    number: usize,
    uri: Url,
    start_delay: Duration,
}

/// Queue and driver of HTTP fetches
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Mutex<VecDeque<Url>>,

    /// Queued requests plus started requests whose fetch has not returned
    pending: AtomicUsize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a URI for fetching
    ///
    /// No deduplication happens here.
    pub fn add(&self, uri: Url) {
        self.lock_queue().push_back(uri);
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of requests queued or in flight
    pub fn pending_requests(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Url>> {
        // The queue holds plain URIs; a poisoned lock leaves it consistent
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dequeue(&self) -> Option<Url> {
        self.lock_queue().pop_front()
    }

    fn complete(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Drains the queue, calling `on_result` once per completed attempt
    ///
    /// Returns once the queue is empty and no fetch is in flight. After
    /// `cancel` fires no new fetch is started; fetches already issued finish
    /// and are still reported.
    ///
    /// # Errors
    ///
    /// The first error returned by `on_result` aborts processing and is returned.
    pub async fn process<F, Fut>(
        &self,
        transport: &dyn HttpTransport,
        on_result: F,
        options: &SchedulerConfig,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        F: Fn(RequestResult) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let max_in_flight = options.max_number_of_simultaneous_requests.max(1);
        let request_timeout = options.request_timeout();
        let mut throttle = Throttle::new(options);
        let mut in_flight = FuturesUnordered::new();
        let mut request_count = 0usize;

        loop {
            if !cancel.is_cancelled() {
                while in_flight.len() < max_in_flight {
                    let Some(uri) = self.dequeue() else {
                        break;
                    };

                    request_count += 1;
                    let start_delay = start_delay(options, throttle.current_backoff());
                    tracing::debug!(
                        "Request #{} started with {:?} delay",
                        request_count,
                        start_delay
                    );

                    let context = RequestContext {
                        number: request_count,
                        uri,
                        start_delay,
                    };
                    in_flight.push(self.perform_request(
                        context,
                        transport,
                        &on_result,
                        request_timeout,
                        cancel,
                    ));
                }
            }

            match in_flight.next().await {
                Some(Ok(Some(latency))) => throttle.record(latency),
                Some(Ok(None)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }

        if cancel.is_cancelled() {
            let mut queue = self.lock_queue();
            let dropped = queue.len();
            queue.clear();
            self.pending.fetch_sub(dropped, Ordering::SeqCst);
            if dropped > 0 {
                tracing::debug!("Cancelled with {} queued requests dropped", dropped);
            }
        }

        tracing::debug!("Completed processing {} requests", request_count);
        Ok(())
    }

    /// Runs one attempt and returns the fetch latency
    ///
    /// Returns `Ok(None)` when cancellation interrupted the start delay and no
    /// request was issued.
    async fn perform_request<F, Fut>(
        &self,
        context: RequestContext,
        transport: &dyn HttpTransport,
        on_result: &F,
        request_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<Duration>>
    where
        F: Fn(RequestResult) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let abandoned = if cancel.is_cancelled() {
            true
        } else if context.start_delay.is_zero() {
            false
        } else {
            tokio::select! {
                _ = cancel.cancelled() => true,
                _ = tokio::time::sleep(context.start_delay) => false,
            }
        };

        if abandoned {
            self.complete();
            tracing::debug!("Request #{} cancelled", context.number);
            return Ok(None);
        }

        let request_start = Utc::now();
        let timer = Instant::now();

        let response = match tokio::time::timeout(request_timeout, transport.get(&context.uri)).await
        {
            Ok(response) => response,
            Err(_) => Err(TransportError::Timeout {
                url: context.uri.to_string(),
                timeout: request_timeout,
            }),
        };

        // Only the fetch is timed, not the handling of the response
        let elapsed_time = timer.elapsed();
        self.complete();

        let outcome = match response {
            Ok(response) => {
                tracing::debug!(
                    "Request #{} completed with {} in {:?}",
                    context.number,
                    response.status,
                    elapsed_time
                );
                RequestOutcome::Response(response)
            }
            Err(e) => {
                tracing::debug!(
                    "Request #{} completed with error in {:?}",
                    context.number,
                    elapsed_time
                );
                tracing::trace!("Request #{} error: {}", context.number, e);
                RequestOutcome::Failure(e)
            }
        };

        on_result(RequestResult {
            request_uri: context.uri,
            request_start,
            request_start_delay: context.start_delay,
            elapsed_time,
            outcome,
        })
        .await?;

        Ok(Some(elapsed_time))
    }
}

/// Base delay plus jitter plus the current backoff
///
/// Jitter only applies when a base delay is configured.
fn start_delay(options: &SchedulerConfig, backoff: Duration) -> Duration {
    let mut delay = options.delay_between_request_start();

    if !delay.is_zero() && options.delay_jitter > 0 {
        let jitter_ms = rand::rng().random_range(0..=options.delay_jitter);
        delay += Duration::from_millis(jitter_ms);
    }

    delay + backoff
}
