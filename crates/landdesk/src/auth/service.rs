use std::sync::Arc;

use tracing::info;

use super::domain::{AuthUser, Role, Session, SessionToken};
use super::provider::{AuthProvider, AuthProviderError};
use crate::config::AdminConfig;

/// Facade over the auth provider. Resolves the session role once at load time
/// and translates provider failures into the product's user-facing messages.
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    admin: AdminConfig,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, admin: AdminConfig) -> Self {
        Self { provider, admin }
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();
        let user = self.provider.sign_up(email, password)?;
        info!(user = %user.id.0, "account registered, verification mail dispatched");
        Ok(user)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let (token, user) = self.provider.sign_in(email.trim(), password)?;
        Ok(self.session_from_user(token, user))
    }

    /// Load the session behind a bearer token, resolving its role.
    pub fn authenticate(&self, token: &SessionToken) -> Result<Session, AuthError> {
        let user = self
            .provider
            .session(token)?
            .ok_or(AuthError::SessionExpired)?;
        Ok(self.session_from_user(token.clone(), user))
    }

    pub fn sign_out(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.provider.sign_out(token)?;
        Ok(())
    }

    pub fn confirm_email(&self, confirm_token: &str) -> Result<AuthUser, AuthError> {
        let user = self.provider.confirm_email(confirm_token)?;
        info!(user = %user.id.0, "email address confirmed");
        Ok(user)
    }

    pub fn resend_verification(&self, session: &Session) -> Result<(), AuthError> {
        self.provider.resend_verification(&session.user.email)?;
        Ok(())
    }

    pub fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.provider.request_password_reset(email.trim())?;
        Ok(())
    }

    pub fn update_password(
        &self,
        token: &SessionToken,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.provider.update_password(token, new_password)?;
        Ok(())
    }

    fn session_from_user(&self, token: SessionToken, user: AuthUser) -> Session {
        let role = Role::resolve(&user.email, &self.admin);
        Session { token, user, role }
    }
}

/// User-facing auth failures. Messages are the product's Korean strings.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("이메일 인증이 필요합니다. 이메일을 확인해주세요.")]
    EmailNotConfirmed,
    #[error("이메일 또는 비밀번호가 올바르지 않습니다.")]
    InvalidCredentials,
    #[error("이미 가입된 이메일입니다")]
    AlreadyRegistered,
    #[error("유효하지 않은 이메일 주소입니다")]
    InvalidEmail,
    #[error("비밀번호는 최소 6자 이상이어야 합니다")]
    WeakPassword,
    #[error("로그인이 필요합니다")]
    SessionRequired,
    #[error("세션이 만료되었습니다. 비밀번호 찾기를 다시 시도해주세요.")]
    SessionExpired,
    #[error("이메일 전송에 실패했습니다. 다시 시도해주세요.")]
    MailDelivery,
    #[error("인증 처리에 실패했습니다: {0}")]
    Provider(String),
}

impl From<AuthProviderError> for AuthError {
    fn from(value: AuthProviderError) -> Self {
        match value {
            AuthProviderError::AlreadyRegistered => AuthError::AlreadyRegistered,
            AuthProviderError::InvalidEmail => AuthError::InvalidEmail,
            AuthProviderError::WeakPassword => AuthError::WeakPassword,
            AuthProviderError::InvalidCredentials => AuthError::InvalidCredentials,
            AuthProviderError::EmailNotConfirmed => AuthError::EmailNotConfirmed,
            AuthProviderError::SessionExpired => AuthError::SessionExpired,
            AuthProviderError::MailDelivery(_) => AuthError::MailDelivery,
            AuthProviderError::Transport(detail) => AuthError::Provider(detail),
        }
    }
}
