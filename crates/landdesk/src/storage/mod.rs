//! Private photo storage boundary. Rows keep an opaque [`PhotoRef`]; a
//! resolvable URL is minted per read with a bounded lifetime and never
//! persisted, so link expiry cannot leak into stored state.

pub mod drive;

use chrono::Duration;
use mime::Mime;
use serde::{Deserialize, Serialize};

pub use drive::{GoogleDrivePhotoStore, PhotoStorageError};

/// Upload ceiling for guide photos.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Opaque reference to a stored photo (a storage object key, not a URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(pub String);

/// Gateway to the object storage backend.
pub trait PhotoStorage: Send + Sync {
    fn store(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> Result<PhotoRef, PhotoStorageError>;

    /// Resolve a reference into a time-limited URL. The backend owns the
    /// actual expiry; `ttl` is the requested lifetime.
    fn signed_url(&self, photo: &PhotoRef, ttl: Duration) -> Result<String, PhotoStorageError>;

    fn remove(&self, photo: &PhotoRef) -> Result<(), PhotoStorageError>;
}

/// Pure upload precondition checks, run before any backend call.
pub fn validate_photo_upload(len: usize, content_type: &Mime) -> Result<(), PhotoUploadError> {
    if len > MAX_PHOTO_BYTES {
        return Err(PhotoUploadError::TooLarge);
    }

    let supported = content_type.type_() == mime::IMAGE
        && matches!(content_type.subtype().as_str(), "jpeg" | "png" | "webp");
    if !supported {
        return Err(PhotoUploadError::UnsupportedType);
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhotoUploadError {
    #[error("파일 크기는 5MB 이하여야 합니다")]
    TooLarge,
    #[error("JPG, PNG, WEBP 형식의 이미지만 업로드 가능합니다")]
    UnsupportedType,
}
