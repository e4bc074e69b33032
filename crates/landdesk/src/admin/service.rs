use std::sync::Arc;

use serde::Serialize;

use super::export::RosterExport;
use crate::auth::CompanyId;
use crate::config::AdminConfig;
use crate::profile::{CompanyProfile, ProfileRepository, ProfileRepositoryError};
use crate::roster::{GuideRecord, GuideRepository, RosterRepositoryError};

/// Cross-company aggregation for the administrator: every land company with
/// its roster size, per-company drill-down, and the spreadsheet export.
pub struct AdminService<PR, GR> {
    profiles: Arc<PR>,
    guides: Arc<GR>,
    admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyOverview {
    pub profile: CompanyProfile,
    pub guide_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverviewTotals {
    pub companies: usize,
    pub guides: usize,
    /// Rounded to the nearest whole guide, as the dashboard displays it.
    pub average_guides: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub companies: Vec<CompanyOverview>,
    pub totals: OverviewTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    pub profile: CompanyProfile,
    pub guides: Vec<GuideRecord>,
}

impl<PR, GR> AdminService<PR, GR>
where
    PR: ProfileRepository + 'static,
    GR: GuideRepository + 'static,
{
    pub fn new(profiles: Arc<PR>, guides: Arc<GR>, admin: AdminConfig) -> Self {
        Self {
            profiles,
            guides,
            admin,
        }
    }

    /// Every land company (the admin account itself excluded) with its
    /// roster size, plus the dashboard totals.
    pub fn overview(&self) -> Result<AdminOverview, AdminError> {
        let mut companies = Vec::new();
        for profile in self.tenant_profiles()? {
            let guide_count = self.guides.count_for_owner(&profile.id)?;
            companies.push(CompanyOverview {
                profile,
                guide_count,
            });
        }

        let totals = totals_for(&companies);
        Ok(AdminOverview { companies, totals })
    }

    pub fn company_detail(&self, id: &CompanyId) -> Result<CompanyDetail, AdminError> {
        let profile = self
            .profiles
            .fetch(id)?
            .ok_or(AdminError::CompanyNotFound)?;
        let guides = self.guides.list_for_owner(id)?;
        Ok(CompanyDetail { profile, guides })
    }

    /// Assemble the full export: every company with its roster, newest first.
    pub fn export(&self) -> Result<RosterExport, AdminError> {
        let mut details = Vec::new();
        for profile in self.tenant_profiles()? {
            let guides = self.guides.list_for_owner(&profile.id)?;
            details.push(CompanyDetail { profile, guides });
        }

        Ok(RosterExport::build(&details))
    }

    fn tenant_profiles(&self) -> Result<Vec<CompanyProfile>, AdminError> {
        let profiles = self.profiles.list()?;
        Ok(profiles
            .into_iter()
            .filter(|profile| !self.admin.is_admin_email(&profile.email))
            .collect())
    }
}

fn totals_for(companies: &[CompanyOverview]) -> OverviewTotals {
    let guides: usize = companies.iter().map(|company| company.guide_count).sum();
    let average_guides = if companies.is_empty() {
        0
    } else {
        (guides as f64 / companies.len() as f64).round() as usize
    };

    OverviewTotals {
        companies: companies.len(),
        guides,
        average_guides,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("랜드사를 찾을 수 없습니다")]
    CompanyNotFound,
    #[error(transparent)]
    Profiles(#[from] ProfileRepositoryError),
    #[error(transparent)]
    Roster(#[from] RosterRepositoryError),
}
