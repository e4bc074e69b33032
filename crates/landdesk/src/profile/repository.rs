use super::domain::CompanyProfile;
use crate::auth::CompanyId;

/// Storage abstraction for company profiles so services can be exercised in
/// isolation from the managed data store.
pub trait ProfileRepository: Send + Sync {
    /// Insert the profile if the account has none yet, returning the stored
    /// row either way.
    fn ensure(&self, profile: CompanyProfile) -> Result<CompanyProfile, ProfileRepositoryError>;

    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, ProfileRepositoryError>;

    fn save(&self, profile: CompanyProfile) -> Result<(), ProfileRepositoryError>;

    /// All profiles, newest first. The admin account itself is filtered out by
    /// the caller, not here.
    fn list(&self) -> Result<Vec<CompanyProfile>, ProfileRepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileRepositoryError {
    #[error("profile not found")]
    NotFound,
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}
