use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;

/// Identifier of an account. One account per land company, so the same value
/// doubles as the owner key for profiles and guide rosters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Opaque bearer token issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

/// Identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: CompanyId,
    pub email: String,
    pub email_verified: bool,
}

/// Access level of a session.
///
/// Resolved exactly once, when the session is loaded, from the configured
/// administrator email. Downstream code branches on the variant and never
/// re-derives the role from the email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Tenant,
}

impl Role {
    pub fn resolve(email: &str, admin: &AdminConfig) -> Self {
        if admin.is_admin_email(email) {
            Role::Admin
        } else {
            Role::Tenant
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tenant => "tenant",
        }
    }
}

/// An authenticated session with its role already resolved.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user: AuthUser,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
