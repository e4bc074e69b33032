use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAuthProvider, InMemoryGuideRepository, InMemoryPhotoStore,
    InMemoryProfileRepository,
};
use crate::routes::compose_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use landdesk::admin::AdminService;
use landdesk::auth::{AuthProvider, AuthService};
use landdesk::config::AppConfig;
use landdesk::error::AppError;
use landdesk::profile::ProfileService;
use landdesk::roster::RosterService;
use landdesk::storage::PhotoStorage;
use landdesk::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let profile_repository = Arc::new(InMemoryProfileRepository::default());
    let guide_repository = Arc::new(InMemoryGuideRepository::default());
    let auth_provider: Arc<dyn AuthProvider> = Arc::new(InMemoryAuthProvider::default());
    let photo_store: Arc<dyn PhotoStorage> = Arc::new(InMemoryPhotoStore::default());

    let auth = Arc::new(AuthService::new(auth_provider, config.admin.clone()));
    let profiles = Arc::new(ProfileService::new(profile_repository.clone()));
    let roster = Arc::new(RosterService::new(
        guide_repository.clone(),
        photo_store,
        config.storage.photo_url_ttl(),
    ));
    let admin = Arc::new(AdminService::new(
        profile_repository,
        guide_repository,
        config.admin.clone(),
    ));

    let app = compose_router(auth, profiles, roster, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "land-company back office ready");

    axum::serve(listener, app).await?;
    Ok(())
}
