use common_services::api::bulk::interfaces::{
    BulkIndexHandle, BulkJobResponse, BulkJobState, BulkJobStatus,
};
use common_types::BulkProgress;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

struct TrackedJob {
    status: BulkJobStatus,
    cancel: CancellationToken,
    ended_at: Option<Instant>,
}

impl TrackedJob {
    fn mark_ended(&mut self) {
        if self.status.state != BulkJobState::Running && self.ended_at.is_none() {
            self.ended_at = Some(Instant::now());
        }
    }
}

/// Bulk jobs started through the API, with a status folded from their progress stream.
/// Ended jobs stay queryable for `retention`, running jobs are never dropped.
#[derive(Clone)]
pub struct BulkJobs {
    jobs: Arc<RwLock<HashMap<String, TrackedJob>>>,
    retention: Duration,
}

impl BulkJobs {
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            retention,
        }
    }

    /// Registers a spawned job and follows its progress until the job ends.
    pub async fn track(&self, handle: BulkIndexHandle) -> BulkJobResponse {
        let BulkIndexHandle {
            job_id,
            total,
            mut progress,
            cancel,
            join,
        } = handle;

        {
            let mut jobs = self.jobs.write().await;
            self.evict_expired(&mut jobs);
            jobs.insert(
                job_id.clone(),
                TrackedJob {
                    status: BulkJobStatus::new(&job_id, total),
                    cancel,
                    ended_at: None,
                },
            );
        }

        let jobs = self.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            while let Some(event) = progress.recv().await {
                jobs.apply(&id, &event).await;
            }
            match join.await {
                Ok(tally) => info!(
                    "📦 Bulk job {} ended: {} indexed, {} failed",
                    id, tally.successes, tally.failures
                ),
                Err(e) => {
                    error!("Bulk job {} stopped unexpectedly: {}", id, e);
                    if let Some(job) = jobs.jobs.write().await.get_mut(&id) {
                        job.status.state = BulkJobState::Aborted;
                        job.mark_ended();
                    }
                }
            }
        });

        BulkJobResponse { job_id, total }
    }

    fn evict_expired(&self, jobs: &mut HashMap<String, TrackedJob>) {
        let before = jobs.len();
        jobs.retain(|_, job| {
            job.ended_at
                .is_none_or(|ended_at| ended_at.elapsed() < self.retention)
        });
        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!("Evicted {} ended bulk jobs", evicted);
        }
    }

    async fn apply(&self, job_id: &str, event: &BulkProgress) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.status.apply(event);
            job.mark_ended();
        }
    }

    pub async fn status(&self, job_id: &str) -> Option<BulkJobStatus> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map(|job| job.status.clone())
    }

    /// Requests cancellation. The photo being indexed right now still completes.
    pub async fn cancel(&self, job_id: &str) -> Option<BulkJobStatus> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(job_id)?;
        job.cancel.cancel();
        job.status.cancel_requested = true;
        Some(job.status.clone())
    }
}
