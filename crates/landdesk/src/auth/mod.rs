//! Account lifecycle and session handling in front of the managed auth
//! backend: signup, login, email verification, password reset, and role
//! resolution for loaded sessions.

pub mod domain;
pub mod provider;
pub mod router;
pub mod service;

pub use domain::{AuthUser, CompanyId, Role, Session, SessionToken};
pub use provider::{AuthProvider, AuthProviderError};
pub use router::{auth_router, bearer_token, require_admin, require_session};
pub use service::{AuthError, AuthService};
