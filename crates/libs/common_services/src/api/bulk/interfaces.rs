use common_types::{BulkProgress, BulkTally, IndexFailure, WorkingSet};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StartBulkIndexRequest {
    pub working_set: WorkingSet,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BulkJobResponse {
    pub job_id: String,
    pub total: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BulkJobState {
    Running,
    Finished,
    Cancelled,
    /// The job's task ended without reporting a tally.
    Aborted,
}

/// Snapshot of a bulk job, folded from its progress events.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkJobStatus {
    pub job_id: String,
    pub state: BulkJobState,
    pub cancel_requested: bool,
    pub current: usize,
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub failed: Vec<IndexFailure>,
}

impl BulkJobStatus {
    #[must_use]
    pub fn new(job_id: &str, total: usize) -> Self {
        Self {
            job_id: job_id.to_owned(),
            state: BulkJobState::Running,
            cancel_requested: false,
            current: 0,
            total,
            successes: 0,
            failures: 0,
            failed: Vec::new(),
        }
    }

    pub fn apply(&mut self, event: &BulkProgress) {
        match event {
            BulkProgress::Started { total } => self.total = *total,
            BulkProgress::Indexed { current, .. } => {
                self.current = *current;
                self.successes += 1;
            }
            BulkProgress::Failed {
                current,
                photo_id,
                reason,
                ..
            } => {
                self.current = *current;
                self.failures += 1;
                self.failed.push(IndexFailure {
                    photo_id: photo_id.clone(),
                    reason: reason.clone(),
                });
            }
            BulkProgress::Finished { tally } => self.finish(tally),
        }
    }

    fn finish(&mut self, tally: &BulkTally) {
        self.state = if tally.cancelled {
            BulkJobState::Cancelled
        } else {
            BulkJobState::Finished
        };
        self.current = tally.processed;
        self.total = tally.total;
        self.successes = tally.successes;
        self.failures = tally.failures;
        self.failed.clone_from(&tally.failed);
    }
}

/// A bulk run executing on its own task.
#[derive(Debug)]
pub struct BulkIndexHandle {
    pub job_id: String,
    pub total: usize,
    pub progress: mpsc::Receiver<BulkProgress>,
    pub cancel: CancellationToken,
    pub join: JoinHandle<BulkTally>,
}
