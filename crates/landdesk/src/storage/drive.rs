use std::io::Cursor;

use chrono::Duration;
use google_drive3::{api::File, api::Scope, DriveHub};
use mime::Mime;
use tokio::runtime::Runtime;

use super::{PhotoRef, PhotoStorage};

#[derive(Debug, thiserror::Error)]
pub enum PhotoStorageError {
    #[error("photo storage operation failed: {0}")]
    Backend(String),
    #[error("photo storage returned no resolvable link")]
    NoLink,
    #[error("photo storage runtime unavailable: {0}")]
    Runtime(String),
}

/// Thin wrapper around the generated google-drive3 client so synchronous
/// services can push and resolve guide photos without exposing async details.
/// Objects live in a single private folder; the backend governs how long a
/// resolved link actually stays valid.
pub struct GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    runtime: Runtime,
    folder_id: Option<String>,
}

impl<C> GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, runtime: Runtime, folder_id: Option<String>) -> Self {
        Self {
            hub,
            runtime,
            folder_id,
        }
    }

    pub fn with_runtime(
        hub: DriveHub<C>,
        folder_id: Option<String>,
    ) -> Result<Self, PhotoStorageError> {
        let runtime =
            Runtime::new().map_err(|err| PhotoStorageError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, runtime, folder_id))
    }

    fn map_error<E: std::fmt::Display>(err: E) -> PhotoStorageError {
        PhotoStorageError::Backend(err.to_string())
    }
}

impl<C> std::fmt::Debug for GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDrivePhotoStore").finish_non_exhaustive()
    }
}

impl<C> PhotoStorage for GoogleDrivePhotoStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn store(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> Result<PhotoRef, PhotoStorageError> {
        let metadata = File {
            name: Some(file_name.to_string()),
            parents: self.folder_id.as_ref().map(|parent| vec![parent.clone()]),
            ..File::default()
        };

        let cursor = Cursor::new(bytes);
        let content_type = content_type.clone();

        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .create(metadata)
                .param("fields", "id")
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .upload(cursor, content_type)
                .await
        });

        let (_, file) = result.map_err(Self::map_error)?;
        match file.id {
            Some(id) if !id.is_empty() => Ok(PhotoRef(id)),
            _ => Err(PhotoStorageError::NoLink),
        }
    }

    fn signed_url(&self, photo: &PhotoRef, _ttl: Duration) -> Result<String, PhotoStorageError> {
        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .get(&photo.0)
                .param("fields", "webContentLink")
                .supports_all_drives(true)
                .add_scope(Scope::Readonly)
                .doit()
                .await
        });

        let (_, file) = result.map_err(Self::map_error)?;
        file.web_content_link
            .filter(|link| !link.is_empty())
            .ok_or(PhotoStorageError::NoLink)
    }

    fn remove(&self, photo: &PhotoRef) -> Result<(), PhotoStorageError> {
        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .delete(&photo.0)
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .doit()
                .await
        });

        let _response = result.map_err(Self::map_error)?;
        Ok(())
    }
}
