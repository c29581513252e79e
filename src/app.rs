// app.rs - shared state and router assembly
//
// Route tiers follow the handler tree:
//   public    - no session
//   protected - session_auth_middleware
//   elevated  - session_auth_middleware, then require_admin

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::PasswordHasher;
use crate::config::{AppConfig, PasswordConfig, SessionConfig};
use crate::database::repository::{Repositories, TenantRepository};
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, session_auth_middleware, SessionCookies};
use crate::services::{
    AdminService, AuthService, DashboardService, InvestmentService, PolicyService, SessionManager,
};
use crate::storage::DocumentStore;

/// Everything handlers need, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub admin: AdminService,
    pub policies: PolicyService,
    pub investments: InvestmentService,
    pub dashboard: DashboardService,
    pub tenants: Arc<dyn TenantRepository>,
    pub cookies: SessionCookies,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        documents: Arc<dyn DocumentStore>,
        hasher: PasswordHasher,
        session: &SessionConfig,
        password: &PasswordConfig,
    ) -> Self {
        let sessions = SessionManager::new(repos.sessions.clone(), session.ttl_hours);

        Self {
            auth: AuthService::new(
                repos.tenants.clone(),
                repos.accounts.clone(),
                sessions.clone(),
                hasher.clone(),
                password.min_length,
            ),
            admin: AdminService::new(
                repos.tenants.clone(),
                repos.accounts.clone(),
                sessions,
                hasher,
                password.min_length,
            ),
            policies: PolicyService::new(repos.policies.clone(), documents),
            investments: InvestmentService::new(repos.investments.clone()),
            dashboard: DashboardService::new(repos.policies, repos.investments),
            tenants: repos.tenants,
            cookies: SessionCookies::new(session),
        }
    }
}

pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let admin = elevated::routes().route_layer(middleware::from_fn(require_admin));

    let gated = protected::routes()
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_auth_middleware,
        ));

    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(public::auth::routes())
        .merge(gated);

    router = match &config.server.static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).not_found_service(index))
        }
        None => router.fallback(not_found),
    };

    let mut router = router
        .layer(DefaultBodyLimit::max(config.api.max_upload_bytes))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state);

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Credentialed CORS for the configured front end origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
