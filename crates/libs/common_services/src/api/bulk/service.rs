use super::error::BulkIndexError;
use super::interfaces::BulkIndexHandle;
use super::registry::BulkClaim;
use crate::api::index::service::index_photo_from_source;
use crate::context::FaceIndexContext;
use crate::database::photo::Photo;
use crate::database::with_store_timeout;
use crate::utils::nice_id;
use common_types::{BulkProgress, BulkTally, IndexFailure, WorkingSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// The photos of a bulk run, claimed in the registry until this is dropped.
struct PreparedRun {
    photos: Vec<Photo>,
    _claim: BulkClaim,
}

async fn prepare_run(
    context: &FaceIndexContext,
    working_set: &WorkingSet,
) -> Result<PreparedRun, BulkIndexError> {
    let photos = with_store_timeout(
        context.settings.store_timeout,
        "unindexed_photos",
        context.catalog.unindexed_photos(working_set),
    )
    .await?;
    let photo_ids: Vec<String> = photos.iter().map(|p| p.id.clone()).collect();
    let claim = context
        .registry
        .claim(&photo_ids)
        .map_err(|overlapping| BulkIndexError::AlreadyRunning { overlapping })?;
    Ok(PreparedRun {
        photos,
        _claim: claim,
    })
}

/// How long a cancelled run waits for a backed-up receiver to take the final tally.
const FINISHED_GRACE: Duration = Duration::from_secs(1);

/// Sends progress while someone listens. A dropped receiver never stops the run, and a
/// receiver that stops reading cannot hold up a cancelled one.
struct ProgressSink<'a> {
    sender: &'a mpsc::Sender<BulkProgress>,
    cancel: &'a CancellationToken,
    connected: bool,
}

impl<'a> ProgressSink<'a> {
    const fn new(sender: &'a mpsc::Sender<BulkProgress>, cancel: &'a CancellationToken) -> Self {
        Self {
            sender,
            cancel,
            connected: true,
        }
    }

    fn mark_disconnected(&mut self) {
        self.connected = false;
        debug!("Progress receiver dropped, continuing without progress updates");
    }

    /// Waits for room in the channel, unless the run is cancelled first. Then the update
    /// is dropped.
    async fn emit(&mut self, event: BulkProgress) {
        if !self.connected {
            return;
        }
        let (sender, cancel) = (self.sender, self.cancel);
        tokio::select! {
            biased;
            sent = sender.send(event) => {
                if sent.is_err() {
                    self.mark_disconnected();
                }
            }
            () = cancel.cancelled() => {
                debug!("Run cancelled while progress was backed up, dropping update");
            }
        }
    }

    /// Delivers the final tally. After cancellation the receiver gets a short grace
    /// period to make room before the tally is given up.
    async fn finish(&mut self, tally: &BulkTally) {
        if !self.connected {
            return;
        }
        let event = BulkProgress::Finished {
            tally: tally.clone(),
        };
        let (sender, cancel) = (self.sender, self.cancel);
        let delivered = tokio::select! {
            biased;
            sent = sender.send(event.clone()) => Some(sent.is_ok()),
            () = cancel.cancelled() => None,
        };
        let delivered = match delivered {
            Some(delivered) => delivered,
            None => match tokio::time::timeout(FINISHED_GRACE, sender.send(event)).await {
                Ok(sent) => sent.is_ok(),
                Err(_) => {
                    warn!("Progress receiver is not reading, final tally not delivered");
                    return;
                }
            },
        };
        if !delivered {
            self.mark_disconnected();
        }
    }
}

/// Waits the configured throttle, returning early when the run is cancelled.
async fn throttle(context: &FaceIndexContext, cancel: &CancellationToken) {
    let delay = context.settings.throttle;
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        () = tokio::time::sleep(delay) => {}
        () = cancel.cancelled() => {}
    }
}

async fn process_photos(
    context: &FaceIndexContext,
    photos: &[Photo],
    cancel: &CancellationToken,
    progress: &mpsc::Sender<BulkProgress>,
) -> BulkTally {
    let total = photos.len();
    let mut sink = ProgressSink::new(progress, cancel);
    let mut tally = BulkTally {
        total,
        ..BulkTally::default()
    };
    sink.emit(BulkProgress::Started { total }).await;
    info!("🚀 Bulk indexing {} photos", total);

    for (i, photo) in photos.iter().enumerate() {
        if i > 0 {
            throttle(context, cancel).await;
        }
        if cancel.is_cancelled() {
            info!("🛑 Bulk run cancelled after {} of {} photos", i, total);
            tally.cancelled = true;
            break;
        }

        let current = i + 1;
        match index_photo_from_source(context, &photo.id, false).await {
            Ok(outcome) => {
                tally.successes += 1;
                sink.emit(BulkProgress::Indexed {
                    current,
                    total,
                    photo_id: photo.id.clone(),
                    faces: outcome.face_count(),
                })
                .await;
            }
            Err(error) => {
                warn!("Could not index photo {}: {}", photo.id, error);
                let reason = error.to_string();
                tally.failures += 1;
                tally.failed.push(IndexFailure {
                    photo_id: photo.id.clone(),
                    reason: reason.clone(),
                });
                sink.emit(BulkProgress::Failed {
                    current,
                    total,
                    photo_id: photo.id.clone(),
                    reason,
                })
                .await;
            }
        }
        tally.processed = current;
    }

    info!(
        "🏁 Bulk run done: {} indexed, {} failed, {} of {} processed",
        tally.successes, tally.failures, tally.processed, tally.total
    );
    sink.finish(&tally).await;
    tally
}

/// Indexes every unindexed photo of `working_set` in catalog order, one at a time.
///
/// `cancel` is checked before each photo, so an in-flight photo always completes. Failed
/// photos are counted and reported, they never abort the run.
///
/// # Errors
/// Only failures before the first photo: loading the working set, or another run already
/// holding some of its photos.
#[instrument(skip(context, cancel, progress), err(Debug))]
pub async fn run_bulk_index(
    context: &FaceIndexContext,
    working_set: &WorkingSet,
    cancel: &CancellationToken,
    progress: &mpsc::Sender<BulkProgress>,
) -> Result<BulkTally, BulkIndexError> {
    let run = prepare_run(context, working_set).await?;
    Ok(process_photos(context, &run.photos, cancel, progress).await)
}

/// Starts a bulk run on its own task. The working set is loaded and claimed before this
/// returns, so conflicts surface here rather than on the task.
///
/// # Errors
/// See [`run_bulk_index`].
#[instrument(skip(context), err(Debug))]
pub async fn spawn_bulk_index(
    context: Arc<FaceIndexContext>,
    working_set: WorkingSet,
) -> Result<BulkIndexHandle, BulkIndexError> {
    let run = prepare_run(&context, &working_set).await?;
    let job_id = nice_id(12);
    let total = run.photos.len();
    let (sender, receiver) = mpsc::channel(context.settings.progress_buffer);
    let cancel = CancellationToken::new();

    let task_cancel = cancel.clone();
    let span = info_span!("bulk_index", job_id = %job_id);
    let join = tokio::spawn(
        async move {
            let tally = process_photos(&context, &run.photos, &task_cancel, &sender).await;
            drop(run);
            tally
        }
        .instrument(span),
    );

    Ok(BulkIndexHandle {
        job_id,
        total,
        progress: receiver,
        cancel,
        join,
    })
}
