use std::sync::Arc;

use chrono::Local;
use tracing::info;

use super::business_number::{BusinessNumber, BusinessNumberError};
use super::domain::CompanyProfile;
use super::repository::{ProfileRepository, ProfileRepositoryError};
use crate::auth::AuthUser;

/// Profile completion and maintenance for the signed-in company.
pub struct ProfileService<R> {
    repository: Arc<R>,
}

impl<R> ProfileService<R>
where
    R: ProfileRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Load the account's profile, creating the blank row on first access.
    pub fn load(&self, user: &AuthUser) -> Result<CompanyProfile, ProfileError> {
        let blank = CompanyProfile::for_account(user, Local::now().naive_local());
        let profile = self.repository.ensure(blank)?;
        Ok(profile)
    }

    /// Capture (or replace) the company name and business number.
    ///
    /// The business number must pass the checksum; the stored form is the
    /// hyphenated display form, never the raw input.
    pub fn complete(
        &self,
        user: &AuthUser,
        company_name: &str,
        business_number: &str,
    ) -> Result<CompanyProfile, ProfileError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(ProfileError::CompanyNameRequired);
        }

        let business_number = BusinessNumber::parse(business_number)?;

        let mut profile = self.load(user)?;
        profile.company_name = Some(company_name.to_string());
        profile.business_number = Some(business_number);
        self.repository.save(profile.clone())?;

        info!(company = %profile.id.0, "company profile completed");
        Ok(profile)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("여행사명을 입력해주세요")]
    CompanyNameRequired,
    #[error(transparent)]
    BusinessNumber(#[from] BusinessNumberError),
    #[error(transparent)]
    Repository(#[from] ProfileRepositoryError),
}
