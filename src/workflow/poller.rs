// src/workflow/poller.rs
//! Job Poller: one bounded polling loop for both job kinds

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::OrchestrationError;
use crate::models::job::{AccessToken, JobHandle, JobOutput, JobStatus};
use crate::providers::RenderProvider;

/// Interval schedule and overall bound for polling one job
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// 1.0 keeps a fixed cadence
    pub multiplier: f64,
    /// Total time allowed before giving up with `Timeout`
    pub max_elapsed: Duration,
}

impl PollPolicy {
    pub fn storyboard() -> Self {
        Self {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            multiplier: 1.0,
            max_elapsed: Duration::from_secs(10 * 60),
        }
    }

    pub fn render() -> Self {
        Self {
            max_elapsed: Duration::from_secs(20 * 60),
            ..Self::storyboard()
        }
    }

    fn intervals(&self) -> ExponentialBackoff {
        // Elapsed time is tracked by the poll loop on the tokio clock, so the backoff never expires
        let mut backoff = ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            randomization_factor: 0.0,
            multiplier: self.multiplier,
            max_interval: self.max_interval.max(self.initial_interval),
            max_elapsed_time: None,
            ..Default::default()
        };
        backoff.reset();
        backoff
    }
}

/// Polls `handle` until its kind's completion predicate reports a terminal state.
///
/// Transient status-check errors count as "not finished yet"; anything else fails the job.
/// Cancellation is observed both while a status request is in flight and while waiting.
pub async fn poll_job(
    provider: &dyn RenderProvider,
    token: &AccessToken,
    handle: &JobHandle,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<JobOutput, OrchestrationError> {
    let started = Instant::now();
    let mut intervals = policy.intervals();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OrchestrationError::Cancelled),
            fetched = provider.get_job(token, &handle.id) => fetched,
        };

        match fetched {
            Ok(envelope) => match handle.kind.classify(&envelope.data) {
                JobStatus::Completed(output) => {
                    tracing::info!(
                        job_id = %handle.id,
                        kind = %handle.kind,
                        attempts = attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Job completed"
                    );
                    return Ok(output);
                }
                JobStatus::Failed { reason } => {
                    tracing::error!(job_id = %handle.id, kind = %handle.kind, "Job failed: {}", reason);
                    return Err(OrchestrationError::job(handle.kind, handle.id.clone(), reason));
                }
                status => {
                    tracing::debug!(job_id = %handle.id, kind = %handle.kind, attempt, ?status, "Job not finished");
                }
            },
            Err(e) if e.is_transient() => {
                tracing::warn!(job_id = %handle.id, kind = %handle.kind, attempt, "Status check failed (will retry): {}", e);
            }
            Err(e) => {
                return Err(OrchestrationError::job(
                    handle.kind,
                    handle.id.clone(),
                    format!("status check failed: {}", e),
                ));
            }
        }

        let delay = intervals.next_backoff().unwrap_or(policy.max_interval);
        let elapsed = started.elapsed();
        if elapsed + delay > policy.max_elapsed {
            tracing::error!(job_id = %handle.id, kind = %handle.kind, attempts = attempt, "Job polling timed out");
            return Err(OrchestrationError::Timeout {
                kind: handle.kind,
                job_id: handle.id.clone(),
                elapsed,
            });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OrchestrationError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
