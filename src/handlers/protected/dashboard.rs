// handlers/protected/dashboard.rs - derived, read-only figures

use axum::{extract::State, routing::get, Router};
use chrono::Utc;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{DashboardAnalytics, DashboardStats};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/stats", get(stats_get))
        .route("/api/dashboard/analytics", get(analytics_get))
}

pub async fn stats_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<DashboardStats> {
    let tenant = user.tenant()?;
    let today = Utc::now().date_naive();
    Ok(ApiResponse::success(state.dashboard.stats(tenant, today).await?))
}

pub async fn analytics_get(State(state): State<AppState>, user: AuthUser) -> ApiResult<DashboardAnalytics> {
    let tenant = user.tenant()?;
    let today = Utc::now().date_naive();
    Ok(ApiResponse::success(state.dashboard.analytics(tenant, today).await?))
}
