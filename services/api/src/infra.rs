use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Local};
use metrics_exporter_prometheus::PrometheusHandle;
use mime::Mime;

use landdesk::auth::{AuthProvider, AuthProviderError, AuthUser, CompanyId, SessionToken};
use landdesk::profile::{CompanyProfile, ProfileRepository, ProfileRepositoryError};
use landdesk::roster::{GuideId, GuideRecord, GuideRepository, RosterRepositoryError};
use landdesk::storage::{PhotoRef, PhotoStorage, PhotoStorageError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryGuideRepository {
    records: Arc<Mutex<HashMap<GuideId, GuideRecord>>>,
}

impl InMemoryGuideRepository {
    fn sorted_newest_first(mut records: Vec<GuideRecord>) -> Vec<GuideRecord> {
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        records
    }
}

impl GuideRepository for InMemoryGuideRepository {
    fn insert(&self, record: GuideRecord) -> Result<GuideRecord, RosterRepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RosterRepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn insert_batch(&self, records: Vec<GuideRecord>) -> Result<usize, RosterRepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if records.iter().any(|record| guard.contains_key(&record.id)) {
            return Err(RosterRepositoryError::Conflict);
        }

        let inserted = records.len();
        for record in records {
            guard.insert(record.id.clone(), record);
        }
        Ok(inserted)
    }

    fn update(&self, record: GuideRecord) -> Result<(), RosterRepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RosterRepositoryError::NotFound)
        }
    }

    fn delete(&self, owner: &CompanyId, id: &GuideId) -> Result<(), RosterRepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get(id) {
            Some(record) if &record.owner == owner => {
                guard.remove(id);
                Ok(())
            }
            _ => Err(RosterRepositoryError::NotFound),
        }
    }

    fn fetch(
        &self,
        owner: &CompanyId,
        id: &GuideId,
    ) -> Result<Option<GuideRecord>, RosterRepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .get(id)
            .filter(|record| &record.owner == owner)
            .cloned())
    }

    fn list_for_owner(&self, owner: &CompanyId) -> Result<Vec<GuideRecord>, RosterRepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let records = guard
            .values()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(records))
    }

    fn count_for_owner(&self, owner: &CompanyId) -> Result<usize, RosterRepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.owner == owner)
            .count())
    }

    fn list_all(&self) -> Result<Vec<GuideRecord>, RosterRepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(Self::sorted_newest_first(guard.values().cloned().collect()))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    profiles: Arc<Mutex<HashMap<CompanyId, CompanyProfile>>>,
}

impl ProfileRepository for InMemoryProfileRepository {
    fn ensure(&self, profile: CompanyProfile) -> Result<CompanyProfile, ProfileRepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        let stored = guard.entry(profile.id.clone()).or_insert(profile);
        Ok(stored.clone())
    }

    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, ProfileRepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save(&self, profile: CompanyProfile) -> Result<(), ProfileRepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        if guard.contains_key(&profile.id) {
            guard.insert(profile.id.clone(), profile);
            Ok(())
        } else {
            Err(ProfileRepositoryError::NotFound)
        }
    }

    fn list(&self) -> Result<Vec<CompanyProfile>, ProfileRepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        let mut profiles: Vec<CompanyProfile> = guard.values().cloned().collect();
        profiles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        Ok(profiles)
    }
}

#[derive(Debug, Clone)]
struct AccountRecord {
    user: AuthUser,
    password: String,
    confirm_token: String,
}

/// Development stand-in for the managed auth backend. Accounts and sessions
/// live in process memory; "sent" mail is observable through the pending
/// confirm tokens and reset log.
#[derive(Default)]
pub(crate) struct InMemoryAuthProvider {
    accounts: Mutex<HashMap<String, AccountRecord>>,
    sessions: Mutex<HashMap<String, CompanyId>>,
    reset_requests: Mutex<Vec<String>>,
    sequence: AtomicU64,
}

impl InMemoryAuthProvider {
    fn next(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn account_by_id(&self, id: &CompanyId) -> Option<AccountRecord> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        guard.values().find(|record| &record.user.id == id).cloned()
    }

    /// The verification token that "went out" for an address. Demo and tests
    /// use this in place of a mailbox.
    pub(crate) fn confirm_token_for(&self, email: &str) -> Option<String> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        guard
            .get(&email.to_ascii_lowercase())
            .map(|record| record.confirm_token.clone())
    }

    pub(crate) fn reset_requests(&self) -> Vec<String> {
        self.reset_requests
            .lock()
            .expect("reset mutex poisoned")
            .clone()
    }
}

impl AuthProvider for InMemoryAuthProvider {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthProviderError> {
        let normalized = email.trim().to_ascii_lowercase();
        if !normalized.contains('@') || !normalized.contains('.') {
            return Err(AuthProviderError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthProviderError::WeakPassword);
        }

        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        if guard.contains_key(&normalized) {
            return Err(AuthProviderError::AlreadyRegistered);
        }

        let id = self.next();
        let record = AccountRecord {
            user: AuthUser {
                id: CompanyId(format!("company-{id:04}")),
                email: normalized.clone(),
                email_verified: false,
            },
            password: password.to_string(),
            confirm_token: format!("confirm-{id:04}"),
        };
        let user = record.user.clone();
        guard.insert(normalized, record);
        Ok(user)
    }

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionToken, AuthUser), AuthProviderError> {
        let normalized = email.trim().to_ascii_lowercase();
        let user = {
            let guard = self.accounts.lock().expect("account mutex poisoned");
            let record = guard
                .get(&normalized)
                .ok_or(AuthProviderError::InvalidCredentials)?;
            if record.password != password {
                return Err(AuthProviderError::InvalidCredentials);
            }
            if !record.user.email_verified {
                return Err(AuthProviderError::EmailNotConfirmed);
            }
            record.user.clone()
        };

        let token = SessionToken(format!("session-{:04}", self.next()));
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.0.clone(), user.id.clone());
        Ok((token, user))
    }

    fn session(&self, token: &SessionToken) -> Result<Option<AuthUser>, AuthProviderError> {
        let owner = {
            let guard = self.sessions.lock().expect("session mutex poisoned");
            guard.get(&token.0).cloned()
        };

        match owner {
            Some(id) => Ok(self.account_by_id(&id).map(|record| record.user)),
            None => Ok(None),
        }
    }

    fn sign_out(&self, token: &SessionToken) -> Result<(), AuthProviderError> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(&token.0);
        Ok(())
    }

    fn confirm_email(&self, confirm_token: &str) -> Result<AuthUser, AuthProviderError> {
        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        let record = guard
            .values_mut()
            .find(|record| record.confirm_token == confirm_token)
            .ok_or(AuthProviderError::SessionExpired)?;
        record.user.email_verified = true;
        Ok(record.user.clone())
    }

    fn resend_verification(&self, email: &str) -> Result<(), AuthProviderError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        if guard.contains_key(&email.to_ascii_lowercase()) {
            Ok(())
        } else {
            Err(AuthProviderError::MailDelivery("unknown address".to_string()))
        }
    }

    fn request_password_reset(&self, email: &str) -> Result<(), AuthProviderError> {
        self.reset_requests
            .lock()
            .expect("reset mutex poisoned")
            .push(email.to_ascii_lowercase());
        Ok(())
    }

    fn update_password(
        &self,
        token: &SessionToken,
        new_password: &str,
    ) -> Result<(), AuthProviderError> {
        if new_password.len() < 6 {
            return Err(AuthProviderError::WeakPassword);
        }

        let owner = {
            let guard = self.sessions.lock().expect("session mutex poisoned");
            guard
                .get(&token.0)
                .cloned()
                .ok_or(AuthProviderError::SessionExpired)?
        };

        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        let record = guard
            .values_mut()
            .find(|record| record.user.id == owner)
            .ok_or(AuthProviderError::SessionExpired)?;
        record.password = new_password.to_string();
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredPhoto {
    len: usize,
    content_type: String,
}

/// Development stand-in for the private photo bucket. Signed URLs carry an
/// explicit expiry stamp so callers can see the TTL being applied per read.
#[derive(Default)]
pub(crate) struct InMemoryPhotoStore {
    objects: Mutex<HashMap<String, StoredPhoto>>,
}

impl InMemoryPhotoStore {
    pub(crate) fn object_count(&self) -> usize {
        self.objects.lock().expect("photo mutex poisoned").len()
    }
}

impl PhotoStorage for InMemoryPhotoStore {
    fn store(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> Result<PhotoRef, PhotoStorageError> {
        let mut guard = self.objects.lock().expect("photo mutex poisoned");
        guard.insert(
            file_name.to_string(),
            StoredPhoto {
                len: bytes.len(),
                content_type: content_type.to_string(),
            },
        );
        Ok(PhotoRef(file_name.to_string()))
    }

    fn signed_url(&self, photo: &PhotoRef, ttl: Duration) -> Result<String, PhotoStorageError> {
        let guard = self.objects.lock().expect("photo mutex poisoned");
        let stored = guard
            .get(&photo.0)
            .ok_or_else(|| PhotoStorageError::Backend("object missing".to_string()))?;

        let expires_at = Local::now().naive_local() + ttl;
        Ok(format!(
            "memory://guide-photos/{}?type={}&len={}&expires={}",
            photo.0,
            stored.content_type,
            stored.len,
            expires_at.format("%Y%m%dT%H%M%S"),
        ))
    }

    fn remove(&self, photo: &PhotoRef) -> Result<(), PhotoStorageError> {
        let mut guard = self.objects.lock().expect("photo mutex poisoned");
        guard.remove(&photo.0);
        Ok(())
    }
}
