use super::domain::{GuideId, GuideRecord};
use crate::auth::CompanyId;

/// Storage abstraction for the guide roster so services can be exercised in
/// isolation from the managed data store.
///
/// Every owner-scoped operation takes the owning company explicitly; an id
/// belonging to another company behaves as if the record did not exist.
pub trait GuideRepository: Send + Sync {
    fn insert(&self, record: GuideRecord) -> Result<GuideRecord, RosterRepositoryError>;

    /// All-or-nothing batch insert: either every record is stored or none is,
    /// reported as a single result. Partial success is not an outcome.
    fn insert_batch(&self, records: Vec<GuideRecord>) -> Result<usize, RosterRepositoryError>;

    fn update(&self, record: GuideRecord) -> Result<(), RosterRepositoryError>;

    fn delete(&self, owner: &CompanyId, id: &GuideId) -> Result<(), RosterRepositoryError>;

    fn fetch(
        &self,
        owner: &CompanyId,
        id: &GuideId,
    ) -> Result<Option<GuideRecord>, RosterRepositoryError>;

    /// The owner's roster, newest first.
    fn list_for_owner(&self, owner: &CompanyId) -> Result<Vec<GuideRecord>, RosterRepositoryError>;

    fn count_for_owner(&self, owner: &CompanyId) -> Result<usize, RosterRepositoryError>;

    /// Every roster row across all owners (admin aggregation).
    fn list_all(&self) -> Result<Vec<GuideRecord>, RosterRepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RosterRepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("roster store unavailable: {0}")]
    Unavailable(String),
}
