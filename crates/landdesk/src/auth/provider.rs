use super::domain::{AuthUser, SessionToken};

/// Boundary to the managed authentication backend (account registry, session
/// store, and verification/reset mail dispatch all live behind it).
pub trait AuthProvider: Send + Sync {
    /// Register a new account and dispatch the verification email.
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthProviderError>;

    /// Exchange credentials for a session.
    fn sign_in(&self, email: &str, password: &str)
        -> Result<(SessionToken, AuthUser), AuthProviderError>;

    /// Look up the user behind a token. `None` means unknown or expired.
    fn session(&self, token: &SessionToken) -> Result<Option<AuthUser>, AuthProviderError>;

    fn sign_out(&self, token: &SessionToken) -> Result<(), AuthProviderError>;

    /// Redeem an emailed verification token.
    fn confirm_email(&self, confirm_token: &str) -> Result<AuthUser, AuthProviderError>;

    fn resend_verification(&self, email: &str) -> Result<(), AuthProviderError>;

    fn request_password_reset(&self, email: &str) -> Result<(), AuthProviderError>;

    fn update_password(
        &self,
        token: &SessionToken,
        new_password: &str,
    ) -> Result<(), AuthProviderError>;
}

/// Failure classes reported by the provider. The service layer translates
/// these into user-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum AuthProviderError {
    #[error("account already registered")]
    AlreadyRegistered,
    #[error("email address rejected")]
    InvalidEmail,
    #[error("password rejected")]
    WeakPassword,
    #[error("credentials rejected")]
    InvalidCredentials,
    #[error("email not confirmed")]
    EmailNotConfirmed,
    #[error("session unknown or expired")]
    SessionExpired,
    #[error("mail dispatch failed: {0}")]
    MailDelivery(String),
    #[error("auth backend unavailable: {0}")]
    Transport(String),
}
