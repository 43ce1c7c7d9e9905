use crate::test_constants::{DIMENSIONS, MODEL_NAME};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use color_eyre::eyre::eyre;
use common_services::database::DbError;
use common_services::database::check_descriptor_model;
use common_services::database::face_encoding::{FaceEncodingRecord, FaceMatch};
use common_services::database::photo::Photo;
use common_services::extractor::{DescriptorExtractor, ExtractionError};
use common_services::interfaces::{DescriptorStore, ImageSource, PhotoCatalog, in_requested_order};
use common_types::{
    BoundingRegion, Descriptor, DetectedFace, Distance, ModelVersion, WorkingSet,
};
use image::DynamicImage;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

#[must_use]
pub fn model() -> ModelVersion {
    ModelVersion::new(MODEL_NAME, DIMENSIONS)
}

/// A unit descriptor whose cosine distance to [`query_values`] is exactly `distance`.
#[must_use]
pub fn values_at_distance(distance: f64) -> Vec<f32> {
    let cos = 1.0 - distance;
    let sin = (1.0 - cos * cos).max(0.0).sqrt();
    let mut values = vec![0.0_f32; DIMENSIONS];
    values[0] = cos as f32;
    values[1] = sin as f32;
    values
}

#[must_use]
pub fn query_values() -> Vec<f32> {
    values_at_distance(0.0)
}

pub fn face_at_distance(distance: f64, confidence: f32) -> DetectedFace {
    DetectedFace {
        descriptor: Descriptor::new(&model(), values_at_distance(distance))
            .expect("test descriptor is valid"),
        confidence,
        region: BoundingRegion {
            x: 0.25,
            y: 0.25,
            width: 0.5,
            height: 0.5,
        },
    }
}

/// What the fake extractor answers for one image.
#[derive(Debug, Clone)]
pub enum FaceScript {
    Faces(Vec<DetectedFace>),
    ServiceDown,
    Hang,
}

impl FaceScript {
    pub fn one_face(distance: f64) -> Self {
        Self::Faces(vec![face_at_distance(distance, 0.99)])
    }

    #[must_use]
    pub const fn no_face() -> Self {
        Self::Faces(Vec::new())
    }
}

/// Extractor that answers from a script keyed on the image width.
#[derive(Default)]
pub struct FakeExtractor {
    scripts: Mutex<HashMap<u32, FaceScript>>,
    calls: AtomicUsize,
    cancel_on_call: Mutex<Option<(usize, CancellationToken)>>,
}

impl FakeExtractor {
    pub fn script(&self, width: u32, script: FaceScript) {
        self.scripts.lock().expect("scripts lock").insert(width, script);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Cancels `token` while serving call number `call` (1-based).
    pub fn cancel_on_call(&self, call: usize, token: CancellationToken) {
        *self.cancel_on_call.lock().expect("cancel lock") = Some((call, token));
    }
}

#[async_trait]
impl DescriptorExtractor for FakeExtractor {
    async fn extract(&self, image: &DynamicImage) -> Result<Vec<DetectedFace>, ExtractionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((at, token)) = &*self.cancel_on_call.lock().expect("cancel lock")
            && *at == call
        {
            token.cancel();
        }

        let script = self
            .scripts
            .lock()
            .expect("scripts lock")
            .get(&image.width())
            .cloned()
            .unwrap_or_else(FaceScript::no_face);
        match script {
            FaceScript::Faces(faces) => Ok(faces),
            FaceScript::ServiceDown => Err(ExtractionError::ServiceError {
                status: 503,
                message: "model not loaded".to_owned(),
            }),
            FaceScript::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}

/// Image source that hands out a blank image per photo, with the photo's script width.
#[derive(Default)]
pub struct FakeImageSource {
    widths: Mutex<HashMap<String, u32>>,
}

impl FakeImageSource {
    pub fn insert(&self, photo_id: &str, width: u32) {
        self.widths
            .lock()
            .expect("widths lock")
            .insert(photo_id.to_owned(), width);
    }
}

#[async_trait]
impl ImageSource for FakeImageSource {
    async fn load(&self, photo: &Photo) -> color_eyre::Result<DynamicImage> {
        let width = self
            .widths
            .lock()
            .expect("widths lock")
            .get(&photo.id)
            .copied()
            .ok_or_else(|| eyre!("No such file: {}", photo.relative_path))?;
        Ok(DynamicImage::new_rgb8(width, 1))
    }
}

/// Descriptor store and photo catalog in memory, with the same contracts as Postgres.
pub struct InMemoryFaceIndex {
    model_version: ModelVersion,
    photos: Mutex<Vec<Photo>>,
    records: Mutex<Vec<FaceEncodingRecord>>,
    next_record_id: AtomicI64,
    fail_flag_updates: AtomicBool,
    hang_store: AtomicBool,
}

impl InMemoryFaceIndex {
    #[must_use]
    pub fn new(model_version: ModelVersion) -> Self {
        Self {
            model_version,
            photos: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
            next_record_id: AtomicI64::new(1),
            fail_flag_updates: AtomicBool::new(false),
            hang_store: AtomicBool::new(false),
        }
    }

    pub fn add_photo(&self, photo_id: &str, photographer_id: &str, event_id: Option<&str>) {
        let mut photos = self.photos.lock().expect("photos lock");
        let created_at = base_time() + ChronoDuration::seconds(photos.len() as i64);
        photos.push(Photo {
            id: photo_id.to_owned(),
            photographer_id: photographer_id.to_owned(),
            event_id: event_id.map(str::to_owned),
            relative_path: format!("{photographer_id}/{photo_id}.jpg"),
            is_face_indexed: false,
            created_at,
        });
    }

    pub fn photo(&self, photo_id: &str) -> Option<Photo> {
        self.photos
            .lock()
            .expect("photos lock")
            .iter()
            .find(|p| p.id == photo_id)
            .cloned()
    }

    pub fn is_indexed(&self, photo_id: &str) -> bool {
        self.photo(photo_id).is_some_and(|p| p.is_face_indexed)
    }

    pub fn records_of(&self, photo_id: &str) -> Vec<FaceEncodingRecord> {
        self.records
            .lock()
            .expect("records lock")
            .iter()
            .filter(|r| r.photo_id == photo_id)
            .cloned()
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().expect("records lock").len()
    }

    pub fn fail_flag_updates(&self, fail: bool) {
        self.fail_flag_updates.store(fail, Ordering::SeqCst);
    }

    /// Makes descriptor writes and searches never complete, like a stalled database.
    pub fn hang_store(&self, hang: bool) {
        self.hang_store.store(hang, Ordering::SeqCst);
    }

    async fn stall_if_hanging(&self) {
        if self.hang_store.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[async_trait]
impl DescriptorStore for InMemoryFaceIndex {
    async fn replace_for_photo(
        &self,
        photo_id: &str,
        faces: &[DetectedFace],
    ) -> Result<Vec<FaceEncodingRecord>, DbError> {
        self.stall_if_hanging().await;
        for face in faces {
            check_descriptor_model(&self.model_version, &face.descriptor)?;
        }
        if self.photo(photo_id).is_none() {
            return Err(DbError::PhotoNotFound(photo_id.to_owned()));
        }

        let created: Vec<FaceEncodingRecord> = faces
            .iter()
            .map(|face| FaceEncodingRecord {
                id: self.next_record_id.fetch_add(1, Ordering::SeqCst),
                photo_id: photo_id.to_owned(),
                descriptor: face.descriptor.clone(),
                confidence: face.confidence,
                region: face.region,
                created_at: Utc::now(),
            })
            .collect();

        let mut records = self.records.lock().expect("records lock");
        records.retain(|r| r.photo_id != photo_id);
        records.extend(created.iter().cloned());
        Ok(created)
    }

    async fn delete_for_photo(&self, photo_id: &str) -> Result<u64, DbError> {
        let mut records = self.records.lock().expect("records lock");
        let before = records.len();
        records.retain(|r| r.photo_id != photo_id);
        Ok((before - records.len()) as u64)
    }

    async fn nearest(
        &self,
        query: &Descriptor,
        threshold: Distance,
        limit: usize,
    ) -> Result<Vec<FaceMatch>, DbError> {
        self.stall_if_hanging().await;
        let records = self.records.lock().expect("records lock");
        let mut best: HashMap<&str, FaceMatch> = HashMap::new();
        for record in records.iter() {
            let distance = record
                .descriptor
                .cosine_distance(query)
                .map_err(DbError::InvalidDescriptor)?;
            if distance > threshold {
                continue;
            }
            let candidate = FaceMatch {
                record_id: record.id,
                photo_id: record.photo_id.clone(),
                distance,
            };
            best.entry(record.photo_id.as_str())
                .and_modify(|current| {
                    if distance < current.distance {
                        *current = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }
        let mut matches: Vec<FaceMatch> = best.into_values().collect();
        matches.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.photo_id.cmp(&b.photo_id))
        });
        matches.truncate(limit);
        Ok(matches)
    }
}

#[async_trait]
impl PhotoCatalog for InMemoryFaceIndex {
    async fn find_photo(&self, photo_id: &str) -> Result<Option<Photo>, DbError> {
        Ok(self.photo(photo_id))
    }

    async fn unindexed_photos(&self, working_set: &WorkingSet) -> Result<Vec<Photo>, DbError> {
        let photos = self.photos.lock().expect("photos lock");
        let unindexed = photos.iter().filter(|p| !p.is_face_indexed).cloned();
        Ok(match working_set {
            WorkingSet::Photographer { photographer_id } => unindexed
                .filter(|p| &p.photographer_id == photographer_id)
                .collect(),
            WorkingSet::Event { event_id } => unindexed
                .filter(|p| p.event_id.as_ref() == Some(event_id))
                .collect(),
            WorkingSet::Photos { photo_ids } => in_requested_order(
                unindexed.filter(|p| photo_ids.contains(&p.id)).collect(),
                photo_ids,
            ),
        })
    }

    async fn set_face_indexed(&self, photo_id: &str, indexed: bool) -> Result<(), DbError> {
        if self.fail_flag_updates.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let mut photos = self.photos.lock().expect("photos lock");
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| DbError::PhotoNotFound(photo_id.to_owned()))?;
        photo.is_face_indexed = indexed;
        Ok(())
    }
}
