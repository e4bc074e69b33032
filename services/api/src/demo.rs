use crate::infra::{
    InMemoryAuthProvider, InMemoryGuideRepository, InMemoryPhotoStore, InMemoryProfileRepository,
};
use clap::Args;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use landdesk::admin::{AdminService, ExportSheet};
use landdesk::auth::{AuthProvider, AuthService, Session};
use landdesk::config::AppConfig;
use landdesk::error::AppError;
use landdesk::profile::ProfileService;
use landdesk::roster::{
    normalize_birth_date, template_csv, GuideSubmission, RosterError, RosterService,
};
use landdesk::storage::PhotoStorage;

#[derive(Args, Debug, Default)]
pub(crate) struct TemplateArgs {
    /// Write the sheet to this path instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the admin aggregation portion of the demo
    #[arg(long)]
    pub(crate) skip_admin: bool,
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    let sheet = template_csv();
    match args.output {
        Some(path) => {
            std::fs::write(&path, sheet)?;
            println!("Template written to {}", path.display());
        }
        None => print!("{sheet}"),
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let provider = Arc::new(InMemoryAuthProvider::default());
    let profile_repository = Arc::new(InMemoryProfileRepository::default());
    let guide_repository = Arc::new(InMemoryGuideRepository::default());
    let photo_store = Arc::new(InMemoryPhotoStore::default());

    let auth = AuthService::new(
        provider.clone() as Arc<dyn AuthProvider>,
        config.admin.clone(),
    );
    let profiles = ProfileService::new(profile_repository.clone());
    let roster = RosterService::new(
        guide_repository.clone(),
        photo_store.clone() as Arc<dyn PhotoStorage>,
        config.storage.photo_url_ttl(),
    );
    let admin = AdminService::new(
        profile_repository.clone(),
        guide_repository.clone(),
        config.admin.clone(),
    );

    println!("Land company back office demo");

    println!("\nAccount signup and email verification");
    let email = "hanla@example.com";
    let user = match auth.sign_up(email, "secret1") {
        Ok(user) => user,
        Err(err) => {
            println!("  Signup rejected: {err}");
            return Ok(());
        }
    };
    println!("- Registered {} as {}", user.email, user.id.0);

    match auth.sign_in(email, "secret1") {
        Ok(_) => println!("- Unexpected: login succeeded before verification"),
        Err(err) => println!("- Login before verification blocked: {err}"),
    }

    let session = match confirm_and_sign_in(&provider, &auth, email, "secret1") {
        Some(session) => session,
        None => return Ok(()),
    };
    println!(
        "- Verified and signed in ({} role, token {})",
        session.role.label(),
        session.token.0
    );

    match auth.request_password_reset(email) {
        Ok(()) => println!(
            "- Password reset mail queued ({} pending)",
            provider.reset_requests().len()
        ),
        Err(err) => println!("- Password reset request failed: {err}"),
    }

    println!("\nProfile completion with business number validation");
    match profiles.complete(&session.user, "한라여행사", "123-45-67890") {
        Ok(_) => println!("- Unexpected: invalid checksum accepted"),
        Err(err) => println!("- Checksum rejected 123-45-67890: {err}"),
    }
    match profiles.complete(&session.user, "한라여행사", "2208162517") {
        Ok(profile) => {
            let number = profile
                .business_number
                .as_ref()
                .map(|number| number.as_str().to_string())
                .unwrap_or_default();
            println!("- Stored 한라여행사 with business number {number}");
        }
        Err(err) => println!("- Profile completion failed: {err}"),
    }

    println!("\nSingle guide entry");
    match normalize_birth_date("19900101") {
        Ok(normalized) => println!("- Birth date 19900101 normalizes to {}", normalized.field_value()),
        Err(err) => println!("- Birth date rejected: {err}"),
    }

    let submission = GuideSubmission {
        guide_type: "guide".to_string(),
        name_ko: "홍길동".to_string(),
        name_en_last: "hong".to_string(),
        name_en_first: "gildong".to_string(),
        gender: Some("male".to_string()),
        birth_date: Some("19900101".to_string()),
        email: Some("hong@example.com".to_string()),
        messenger_type: Some("kakao".to_string()),
        messenger_id: Some("hong123".to_string()),
    };
    let record = match roster.create(&session.user.id, submission) {
        Ok(record) => record,
        Err(err) => {
            println!("  Guide registration failed: {err}");
            return Ok(());
        }
    };
    println!(
        "- Registered {} ({} {})",
        record.guide.name_ko, record.guide.name_en_first, record.guide.name_en_last
    );

    let photo_mime = mime_guess::from_path("hong.png").first_or_octet_stream();
    match roster.attach_photo(&session.user.id, &record.id, vec![0u8; 2048], &photo_mime) {
        Ok(_) => println!("- Photo stored ({} object in bucket)", photo_store.object_count()),
        Err(err) => println!("- Photo upload failed: {err}"),
    }

    match roster.list(&session.user.id) {
        Ok(views) => {
            for view in &views {
                let photo = view.photo_url.as_deref().unwrap_or("(no photo)");
                println!("- {} -> {}", view.name_ko, photo);
            }
        }
        Err(err) => println!("- Listing failed: {err}"),
    }

    println!("\nBulk import (all-or-nothing)");
    match roster.import_sheet(&session.user.id, Cursor::new(template_csv().into_bytes())) {
        Ok(inserted) => println!("- Template sheet imported: {inserted} guides"),
        Err(err) => println!("- Template import failed: {err}"),
    }

    let broken_sheet = "\
구분,한글명,영문성,영문명,성별,생년월일,이메일,메신저유형,메신저ID
guide,,PARK,JISOO,male,1991-02-03,park@example.com,kakao,park1
driver,이몽룡,LEE,MONGRYONG,male,1988-07-21,lee@example,telegram,lee9
";
    match roster.import_sheet(&session.user.id, Cursor::new(broken_sheet.as_bytes())) {
        Ok(inserted) => println!("- Unexpected: broken sheet imported {inserted} guides"),
        Err(RosterError::Import(errors)) => {
            println!("- Broken sheet blocked with {} errors:", errors.len());
            for error in errors.iter().take(10) {
                println!("    row {} {}: {}", error.row, error.field, error.message);
            }
        }
        Err(err) => println!("- Broken sheet failed differently: {err}"),
    }

    if args.skip_admin {
        return Ok(());
    }

    println!("\nAdmin aggregation");
    let admin_email = config.admin.email.clone();
    if auth.sign_up(&admin_email, "admin-secret").is_err() {
        println!("- Admin account could not be registered");
        return Ok(());
    }

    let admin_session = match confirm_and_sign_in(&provider, &auth, &admin_email, "admin-secret") {
        Some(session) => session,
        None => return Ok(()),
    };
    println!(
        "- {} signed in with role {}",
        admin_session.user.email,
        admin_session.role.label()
    );

    match admin.overview() {
        Ok(overview) => {
            println!(
                "- {} companies, {} guides, average {}",
                overview.totals.companies, overview.totals.guides, overview.totals.average_guides
            );
            for company in &overview.companies {
                println!(
                    "    {} ({}): {} guides",
                    company.profile.company_name.as_deref().unwrap_or("-"),
                    company.profile.email,
                    company.guide_count
                );
            }
        }
        Err(err) => println!("- Overview failed: {err}"),
    }

    match admin.export() {
        Ok(export) => {
            println!("- Export summary sheet:");
            for line in export.sheet_csv(ExportSheet::Summary).lines() {
                println!("    {line}");
            }
        }
        Err(err) => println!("- Export failed: {err}"),
    }

    Ok(())
}

fn confirm_and_sign_in(
    provider: &Arc<InMemoryAuthProvider>,
    auth: &AuthService,
    email: &str,
    password: &str,
) -> Option<Session> {
    let token = match provider.confirm_token_for(email) {
        Some(token) => token,
        None => {
            println!("  No verification token found for {email}");
            return None;
        }
    };

    if let Err(err) = auth.confirm_email(&token) {
        println!("  Verification failed: {err}");
        return None;
    }

    match auth.sign_in(email, password) {
        Ok(session) => Some(session),
        Err(err) => {
            println!("  Login failed: {err}");
            None
        }
    }
}
