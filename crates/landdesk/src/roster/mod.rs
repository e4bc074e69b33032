//! Guide roster for the signed-in company: birth date normalization,
//! single-entry CRUD, photo attachment, and spreadsheet bulk import.

pub mod birth_date;
pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

pub use birth_date::{
    from_calendar, normalize_birth_date, normalize_birth_date_at, BirthDateError, BirthDateInput,
};
pub use domain::{
    Gender, GuideDraft, GuideId, GuideRecord, GuideSubmission, GuideType, GuideValidationError,
    GuideView, MessengerKind,
};
pub use import::{
    parse_rows, template_csv, validate_rows, validate_sheet, ImportFileError, RawGuideRow,
    RowValidationError, INSTRUCTION_MARKER,
};
pub use repository::{GuideRepository, RosterRepositoryError};
pub use router::{roster_router, RosterRouterState};
pub use service::{RosterError, RosterService};
