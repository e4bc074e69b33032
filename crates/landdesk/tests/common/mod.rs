#![allow(dead_code)]

//! Shared in-memory collaborators and builders for the integration suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Duration;
use mime::Mime;

use landdesk::admin::AdminService;
use landdesk::auth::{
    AuthProvider, AuthProviderError, AuthService, AuthUser, CompanyId, Session, SessionToken,
};
use landdesk::config::AdminConfig;
use landdesk::profile::{
    CompanyProfile, ProfileRepository, ProfileRepositoryError, ProfileService,
};
use landdesk::roster::{
    GuideId, GuideRecord, GuideRepository, GuideSubmission, RosterRepositoryError, RosterService,
};
use landdesk::storage::{PhotoRef, PhotoStorage, PhotoStorageError};

pub const ADMIN_EMAIL: &str = "admin@gctour.com";

pub fn admin_config() -> AdminConfig {
    AdminConfig {
        email: ADMIN_EMAIL.to_string(),
    }
}

#[derive(Default, Clone)]
pub struct MemoryProfiles {
    profiles: Arc<Mutex<HashMap<CompanyId, CompanyProfile>>>,
}

impl ProfileRepository for MemoryProfiles {
    fn ensure(&self, profile: CompanyProfile) -> Result<CompanyProfile, ProfileRepositoryError> {
        let mut guard = self.profiles.lock().expect("lock");
        let stored = guard.entry(profile.id.clone()).or_insert(profile);
        Ok(stored.clone())
    }

    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, ProfileRepositoryError> {
        let guard = self.profiles.lock().expect("lock");
        Ok(guard.get(id).cloned())
    }

    fn save(&self, profile: CompanyProfile) -> Result<(), ProfileRepositoryError> {
        let mut guard = self.profiles.lock().expect("lock");
        if guard.contains_key(&profile.id) {
            guard.insert(profile.id.clone(), profile);
            Ok(())
        } else {
            Err(ProfileRepositoryError::NotFound)
        }
    }

    fn list(&self) -> Result<Vec<CompanyProfile>, ProfileRepositoryError> {
        let guard = self.profiles.lock().expect("lock");
        let mut profiles: Vec<CompanyProfile> = guard.values().cloned().collect();
        profiles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        Ok(profiles)
    }
}

#[derive(Default, Clone)]
pub struct MemoryGuides {
    records: Arc<Mutex<HashMap<GuideId, GuideRecord>>>,
}

impl MemoryGuides {
    pub fn total(&self) -> usize {
        self.records.lock().expect("lock").len()
    }

    fn sorted(mut records: Vec<GuideRecord>) -> Vec<GuideRecord> {
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        records
    }
}

impl GuideRepository for MemoryGuides {
    fn insert(&self, record: GuideRecord) -> Result<GuideRecord, RosterRepositoryError> {
        let mut guard = self.records.lock().expect("lock");
        if guard.contains_key(&record.id) {
            return Err(RosterRepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn insert_batch(&self, records: Vec<GuideRecord>) -> Result<usize, RosterRepositoryError> {
        let mut guard = self.records.lock().expect("lock");
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
        let mut guard = self.records.lock().expect("lock");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RosterRepositoryError::NotFound)
        }
    }

    fn delete(&self, owner: &CompanyId, id: &GuideId) -> Result<(), RosterRepositoryError> {
        let mut guard = self.records.lock().expect("lock");
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
        let guard = self.records.lock().expect("lock");
        Ok(guard
            .get(id)
            .filter(|record| &record.owner == owner)
            .cloned())
    }

    fn list_for_owner(&self, owner: &CompanyId) -> Result<Vec<GuideRecord>, RosterRepositoryError> {
        let guard = self.records.lock().expect("lock");
        Ok(Self::sorted(
            guard
                .values()
                .filter(|record| &record.owner == owner)
                .cloned()
                .collect(),
        ))
    }

    fn count_for_owner(&self, owner: &CompanyId) -> Result<usize, RosterRepositoryError> {
        let guard = self.records.lock().expect("lock");
        Ok(guard
            .values()
            .filter(|record| &record.owner == owner)
            .count())
    }

    fn list_all(&self) -> Result<Vec<GuideRecord>, RosterRepositoryError> {
        let guard = self.records.lock().expect("lock");
        Ok(Self::sorted(guard.values().cloned().collect()))
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
    confirm_token: String,
}

#[derive(Default)]
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, CompanyId>>,
    sequence: AtomicU64,
}

impl MemoryAuth {
    pub fn confirm_token_for(&self, email: &str) -> Option<String> {
        let guard = self.accounts.lock().expect("lock");
        guard
            .get(&email.to_ascii_lowercase())
            .map(|account| account.confirm_token.clone())
    }

    fn next(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }
}

impl AuthProvider for MemoryAuth {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthProviderError> {
        let normalized = email.trim().to_ascii_lowercase();
        if !normalized.contains('@') {
            return Err(AuthProviderError::InvalidEmail);
        }
        if password.len() < 6 {
            return Err(AuthProviderError::WeakPassword);
        }

        let mut guard = self.accounts.lock().expect("lock");
        if guard.contains_key(&normalized) {
            return Err(AuthProviderError::AlreadyRegistered);
        }

        let id = self.next();
        let account = Account {
            user: AuthUser {
                id: CompanyId(format!("company-{id:04}")),
                email: normalized.clone(),
                email_verified: false,
            },
            password: password.to_string(),
            confirm_token: format!("confirm-{id:04}"),
        };
        let user = account.user.clone();
        guard.insert(normalized, account);
        Ok(user)
    }

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionToken, AuthUser), AuthProviderError> {
        let normalized = email.trim().to_ascii_lowercase();
        let user = {
            let guard = self.accounts.lock().expect("lock");
            let account = guard
                .get(&normalized)
                .ok_or(AuthProviderError::InvalidCredentials)?;
            if account.password != password {
                return Err(AuthProviderError::InvalidCredentials);
            }
            if !account.user.email_verified {
                return Err(AuthProviderError::EmailNotConfirmed);
            }
            account.user.clone()
        };

        let token = SessionToken(format!("session-{:04}", self.next()));
        self.sessions
            .lock()
            .expect("lock")
            .insert(token.0.clone(), user.id.clone());
        Ok((token, user))
    }

    fn session(&self, token: &SessionToken) -> Result<Option<AuthUser>, AuthProviderError> {
        let owner = {
            let guard = self.sessions.lock().expect("lock");
            guard.get(&token.0).cloned()
        };

        let Some(owner) = owner else {
            return Ok(None);
        };

        let guard = self.accounts.lock().expect("lock");
        Ok(guard
            .values()
            .find(|account| account.user.id == owner)
            .map(|account| account.user.clone()))
    }

    fn sign_out(&self, token: &SessionToken) -> Result<(), AuthProviderError> {
        self.sessions.lock().expect("lock").remove(&token.0);
        Ok(())
    }

    fn confirm_email(&self, confirm_token: &str) -> Result<AuthUser, AuthProviderError> {
        let mut guard = self.accounts.lock().expect("lock");
        let account = guard
            .values_mut()
            .find(|account| account.confirm_token == confirm_token)
            .ok_or(AuthProviderError::SessionExpired)?;
        account.user.email_verified = true;
        Ok(account.user.clone())
    }

    fn resend_verification(&self, _email: &str) -> Result<(), AuthProviderError> {
        Ok(())
    }

    fn request_password_reset(&self, _email: &str) -> Result<(), AuthProviderError> {
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
            let guard = self.sessions.lock().expect("lock");
            guard
                .get(&token.0)
                .cloned()
                .ok_or(AuthProviderError::SessionExpired)?
        };

        let mut guard = self.accounts.lock().expect("lock");
        let account = guard
            .values_mut()
            .find(|account| account.user.id == owner)
            .ok_or(AuthProviderError::SessionExpired)?;
        account.password = new_password.to_string();
        Ok(())
    }
}

/// Every signed-url call mints a fresh serial so tests can prove URLs are
/// produced per read rather than stored.
#[derive(Default)]
pub struct MemoryPhotos {
    objects: Mutex<HashMap<String, usize>>,
    mints: AtomicU64,
}

impl MemoryPhotos {
    pub fn mint_count(&self) -> u64 {
        self.mints.load(Ordering::Relaxed)
    }
}

impl PhotoStorage for MemoryPhotos {
    fn store(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        _content_type: &Mime,
    ) -> Result<PhotoRef, PhotoStorageError> {
        self.objects
            .lock()
            .expect("lock")
            .insert(file_name.to_string(), bytes.len());
        Ok(PhotoRef(file_name.to_string()))
    }

    fn signed_url(&self, photo: &PhotoRef, ttl: Duration) -> Result<String, PhotoStorageError> {
        let guard = self.objects.lock().expect("lock");
        if !guard.contains_key(&photo.0) {
            return Err(PhotoStorageError::Backend("object missing".to_string()));
        }

        let serial = self.mints.fetch_add(1, Ordering::Relaxed);
        Ok(format!(
            "test://photos/{}?sn={}&ttl_hours={}",
            photo.0,
            serial,
            ttl.num_hours()
        ))
    }

    fn remove(&self, photo: &PhotoRef) -> Result<(), PhotoStorageError> {
        self.objects.lock().expect("lock").remove(&photo.0);
        Ok(())
    }
}

pub struct Harness {
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService<MemoryProfiles>>,
    pub roster: Arc<RosterService<MemoryGuides>>,
    pub admin: Arc<AdminService<MemoryProfiles, MemoryGuides>>,
    pub provider: Arc<MemoryAuth>,
    pub profile_repo: Arc<MemoryProfiles>,
    pub guide_repo: Arc<MemoryGuides>,
    pub photos: Arc<MemoryPhotos>,
}

pub fn harness() -> Harness {
    let provider = Arc::new(MemoryAuth::default());
    let profile_repo = Arc::new(MemoryProfiles::default());
    let guide_repo = Arc::new(MemoryGuides::default());
    let photos = Arc::new(MemoryPhotos::default());

    let auth = Arc::new(AuthService::new(
        provider.clone() as Arc<dyn AuthProvider>,
        admin_config(),
    ));
    let profiles = Arc::new(ProfileService::new(profile_repo.clone()));
    let roster = Arc::new(RosterService::new(
        guide_repo.clone(),
        photos.clone() as Arc<dyn PhotoStorage>,
        Duration::hours(24),
    ));
    let admin = Arc::new(AdminService::new(
        profile_repo.clone(),
        guide_repo.clone(),
        admin_config(),
    ));

    Harness {
        auth,
        profiles,
        roster,
        admin,
        provider,
        profile_repo,
        guide_repo,
        photos,
    }
}

/// Sign up, confirm the verification token, and sign in.
pub fn register_company(harness: &Harness, email: &str, password: &str) -> Session {
    harness.auth.sign_up(email, password).expect("signup");
    let token = harness
        .provider
        .confirm_token_for(email)
        .expect("confirm token issued");
    harness.auth.confirm_email(&token).expect("confirmation");
    harness.auth.sign_in(email, password).expect("login")
}

pub fn valid_submission() -> GuideSubmission {
    GuideSubmission {
        guide_type: "guide".to_string(),
        name_ko: "홍길동".to_string(),
        name_en_last: "hong".to_string(),
        name_en_first: "gildong".to_string(),
        gender: Some("male".to_string()),
        birth_date: Some("19900101".to_string()),
        email: Some("hong@example.com".to_string()),
        messenger_type: Some("kakao".to_string()),
        messenger_id: Some("hong123".to_string()),
    }
}
