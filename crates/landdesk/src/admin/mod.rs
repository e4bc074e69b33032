//! Administrator view across every land company: dashboard aggregation,
//! per-company drill-down, and the spreadsheet export.

pub mod export;
pub mod router;
pub mod service;

pub use export::{ExportSheet, RosterExport};
pub use router::{admin_router, AdminRouterState};
pub use service::{
    AdminError, AdminOverview, AdminService, CompanyDetail, CompanyOverview, OverviewTotals,
};
