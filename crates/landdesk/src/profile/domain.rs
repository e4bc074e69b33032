use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::business_number::BusinessNumber;
use crate::auth::{AuthUser, CompanyId};

/// Company ("land company") profile attached to an account.
///
/// A freshly registered account has an empty profile; the roster UI is gated
/// on [`CompanyProfile::is_complete`] until the company name and business
/// number have been captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: CompanyId,
    pub email: String,
    pub company_name: Option<String>,
    pub business_number: Option<BusinessNumber>,
    pub created_at: NaiveDateTime,
}

impl CompanyProfile {
    /// Blank profile for a just-registered account.
    pub fn for_account(user: &AuthUser, created_at: NaiveDateTime) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            company_name: None,
            business_number: None,
            created_at,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.company_name.is_some() && self.business_number.is_some()
    }
}
