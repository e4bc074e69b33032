//! Company ("land company") profile completion, including business
//! registration number formatting and checksum validation.

pub mod business_number;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use business_number::{
    format_business_number, validate_business_number, BusinessNumber, BusinessNumberError,
};
pub use domain::CompanyProfile;
pub use repository::{ProfileRepository, ProfileRepositoryError};
pub use router::{profile_router, ProfileRouterState};
pub use service::{ProfileError, ProfileService};
