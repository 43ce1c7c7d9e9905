use crate::cli::{BulkArgs, SearchArgs};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use common_services::api::bulk::service::spawn_bulk_index;
use common_services::api::index::interfaces::IndexOutcome;
use common_services::api::index::service::{index_photo, index_photo_from_source};
use common_services::api::search::interfaces::PhotoMatch;
use common_services::api::search::service::{search_by_selfie, search_by_values};
use common_services::context::FaceIndexContext;
use common_types::BulkProgress;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

async fn open_image(path: PathBuf) -> Result<DynamicImage> {
    let image = tokio::task::spawn_blocking(move || {
        image::open(&path).wrap_err_with(|| format!("Could not open image {}", path.display()))
    })
    .await??;
    Ok(image)
}

pub async fn run_index(
    context: &FaceIndexContext,
    photo_id: &str,
    force: bool,
    image: Option<PathBuf>,
) -> Result<()> {
    let outcome = match image {
        Some(path) => index_photo(context, photo_id, &open_image(path).await?, force).await?,
        None => index_photo_from_source(context, photo_id, force).await?,
    };
    match outcome {
        IndexOutcome::Indexed(records) => {
            info!("✅ Photo {} indexed with {} faces", photo_id, records.len());
        }
        IndexOutcome::AlreadyIndexed => {
            info!("Photo {} was already indexed, use --force to re-index", photo_id);
        }
    }
    Ok(())
}

fn log_progress(event: &BulkProgress) {
    match event {
        BulkProgress::Started { total } => info!("Indexing {} photos", total),
        BulkProgress::Indexed {
            current,
            total,
            photo_id,
            faces,
        } => info!("[{}/{}] {} ({} faces)", current, total, photo_id, faces),
        BulkProgress::Failed {
            current,
            total,
            photo_id,
            reason,
        } => warn!("[{}/{}] {} failed: {}", current, total, photo_id, reason),
        BulkProgress::Finished { .. } => {}
    }
}

pub async fn run_bulk(context: FaceIndexContext, args: BulkArgs) -> Result<()> {
    let working_set = args
        .working_set()
        .ok_or_else(|| eyre!("Pick a photographer, an event or a list of photos"))?;
    let mut handle = spawn_bulk_index(Arc::new(context), working_set).await?;

    let cancel = handle.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 Ctrl-C received, stopping after the current photo");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.progress.recv().await {
        log_progress(&event);
    }
    let tally = handle.join.await?;

    info!(
        "🏁 {} indexed, {} failed, {} of {} processed{}",
        tally.successes,
        tally.failures,
        tally.processed,
        tally.total,
        if tally.cancelled { " (cancelled)" } else { "" }
    );
    println!("{}", serde_json::to_string_pretty(&tally)?);
    Ok(())
}

async fn read_descriptor(path: &Path) -> Result<Vec<f32>> {
    let raw = fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Could not read descriptor file {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

pub async fn run_search(context: &FaceIndexContext, args: SearchArgs) -> Result<()> {
    let matches: Vec<PhotoMatch> = match (args.image, args.descriptor) {
        (Some(image), _) => {
            let image = open_image(image).await?;
            search_by_selfie(context, &image, args.threshold, args.limit).await?
        }
        (None, Some(descriptor)) => {
            let values = read_descriptor(&descriptor).await?;
            search_by_values(context, values, None, args.threshold, args.limit).await?
        }
        (None, None) => return Err(eyre!("Pass --image or --descriptor")),
    };

    info!("🔎 {} matching photos", matches.len());
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}
