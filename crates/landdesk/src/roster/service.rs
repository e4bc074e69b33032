use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Local};
use mime::Mime;
use tracing::{info, warn};

use super::domain::{
    GuideDraft, GuideId, GuideRecord, GuideSubmission, GuideValidationError, GuideView,
};
use super::import::{self, RawGuideRow, RowValidationError};
use super::repository::{GuideRepository, RosterRepositoryError};
use crate::auth::CompanyId;
use crate::storage::{
    validate_photo_upload, PhotoStorage, PhotoStorageError, PhotoUploadError,
};

static GUIDE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PHOTO_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_guide_id() -> GuideId {
    let id = GUIDE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    GuideId(format!("guide-{id:06}"))
}

fn next_photo_name(content_type: &Mime) -> String {
    let id = PHOTO_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("photo-{id:06}.{}", content_type.subtype())
}

/// Roster maintenance for the signed-in company: single-entry CRUD, photo
/// attachment, and the bulk import path.
pub struct RosterService<R> {
    repository: Arc<R>,
    photos: Arc<dyn PhotoStorage>,
    photo_url_ttl: Duration,
}

impl<R> RosterService<R>
where
    R: GuideRepository + 'static,
{
    pub fn new(repository: Arc<R>, photos: Arc<dyn PhotoStorage>, photo_url_ttl: Duration) -> Self {
        Self {
            repository,
            photos,
            photo_url_ttl,
        }
    }

    pub fn create(
        &self,
        owner: &CompanyId,
        submission: GuideSubmission,
    ) -> Result<GuideRecord, RosterError> {
        let draft = GuideDraft::from_submission(submission)?;
        let record = GuideRecord {
            id: next_guide_id(),
            owner: owner.clone(),
            guide: draft,
            created_at: Local::now().naive_local(),
        };

        let stored = self.repository.insert(record)?;
        info!(owner = %owner.0, guide = %stored.id.0, "guide registered");
        Ok(stored)
    }

    /// Replace the editable fields of an existing entry. The photo reference
    /// and active flag are managed by their own operations and survive.
    pub fn update(
        &self,
        owner: &CompanyId,
        id: &GuideId,
        submission: GuideSubmission,
    ) -> Result<GuideRecord, RosterError> {
        let mut record = self.fetch_owned(owner, id)?;
        let mut draft = GuideDraft::from_submission(submission)?;
        draft.photo = record.guide.photo.take();
        draft.is_active = record.guide.is_active;
        record.guide = draft;

        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn delete(&self, owner: &CompanyId, id: &GuideId) -> Result<(), RosterError> {
        // Hard delete of the row; the stored photo object is left to the
        // storage backend's retention rules.
        let record = self.fetch_owned(owner, id)?;
        self.repository.delete(owner, &record.id)?;
        info!(owner = %owner.0, guide = %record.id.0, "guide removed");
        Ok(())
    }

    pub fn toggle_active(&self, owner: &CompanyId, id: &GuideId) -> Result<GuideRecord, RosterError> {
        let mut record = self.fetch_owned(owner, id)?;
        record.guide.is_active = !record.guide.is_active;
        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn get(&self, owner: &CompanyId, id: &GuideId) -> Result<GuideView, RosterError> {
        let record = self.fetch_owned(owner, id)?;
        Ok(self.view(&record))
    }

    pub fn list(&self, owner: &CompanyId) -> Result<Vec<GuideView>, RosterError> {
        let records = self.repository.list_for_owner(owner)?;
        Ok(records.iter().map(|record| self.view(record)).collect())
    }

    /// Upload a photo and attach its opaque reference to the entry.
    pub fn attach_photo(
        &self,
        owner: &CompanyId,
        id: &GuideId,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> Result<GuideRecord, RosterError> {
        validate_photo_upload(bytes.len(), content_type)?;

        let mut record = self.fetch_owned(owner, id)?;
        let file_name = next_photo_name(content_type);
        let photo = self.photos.store(&file_name, bytes, content_type)?;
        record.guide.photo = Some(photo);

        self.repository.update(record.clone())?;
        info!(owner = %owner.0, guide = %record.id.0, "guide photo attached");
        Ok(record)
    }

    /// Validate uploaded rows and insert the whole batch, or nothing.
    pub fn import(&self, owner: &CompanyId, rows: &[RawGuideRow]) -> Result<usize, RosterError> {
        let drafts = import::validate_rows(rows).map_err(RosterError::Import)?;
        self.insert_drafts(owner, drafts)
    }

    /// As [`RosterService::import`], parsing the uploaded sheet first.
    pub fn import_sheet<S: Read>(&self, owner: &CompanyId, reader: S) -> Result<usize, RosterError> {
        let drafts = import::validate_sheet(reader).map_err(RosterError::Import)?;
        self.insert_drafts(owner, drafts)
    }

    fn insert_drafts(
        &self,
        owner: &CompanyId,
        drafts: Vec<GuideDraft>,
    ) -> Result<usize, RosterError> {
        let created_at = Local::now().naive_local();
        let records: Vec<GuideRecord> = drafts
            .into_iter()
            .map(|draft| GuideRecord {
                id: next_guide_id(),
                owner: owner.clone(),
                guide: draft,
                created_at,
            })
            .collect();

        let inserted = self.repository.insert_batch(records)?;
        info!(owner = %owner.0, inserted, "bulk import persisted");
        Ok(inserted)
    }

    fn fetch_owned(&self, owner: &CompanyId, id: &GuideId) -> Result<GuideRecord, RosterError> {
        self.repository
            .fetch(owner, id)?
            .ok_or(RosterError::NotFound)
    }

    /// Resolve the stored reference into a fresh signed URL. Resolution
    /// failures degrade to a view without a photo instead of failing the read.
    fn view(&self, record: &GuideRecord) -> GuideView {
        let photo_url = record.guide.photo.as_ref().and_then(|photo| {
            match self.photos.signed_url(photo, self.photo_url_ttl) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!(guide = %record.id.0, error = %err, "photo url resolution failed");
                    None
                }
            }
        });

        GuideView::from_record(record, photo_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] GuideValidationError),
    #[error("가이드를 찾을 수 없습니다")]
    NotFound,
    #[error("업로드 데이터에 오류가 있습니다")]
    Import(Vec<RowValidationError>),
    #[error(transparent)]
    Upload(#[from] PhotoUploadError),
    #[error(transparent)]
    Storage(#[from] PhotoStorageError),
    #[error(transparent)]
    Repository(#[from] RosterRepositoryError),
}
