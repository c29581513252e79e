// handlers/protected/investments.rs - /api/investments CRUD, tenant scoped

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::Investment;
use crate::error::ApiError;
use crate::filter::{InvestmentFilter, InvestmentQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ServiceError;
use crate::types::InvestmentId;
use crate::validation::InvestmentPayload;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/investments", get(investments_get).post(investments_post))
        .route(
            "/api/investments/:id",
            get(investment_get).put(investment_put).delete(investment_delete),
        )
}

/// GET /api/investments?type=&currency=&search= - newest first
pub async fn investments_get(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<InvestmentQuery>, ApiError>,
) -> ApiResult<Vec<Investment>> {
    let tenant = user.tenant()?;
    let filter = InvestmentFilter::try_from(query).map_err(ServiceError::from)?;
    Ok(ApiResponse::success(state.investments.list(tenant, &filter).await?))
}

pub async fn investments_post(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<InvestmentPayload>, ApiError>,
) -> ApiResult<Investment> {
    let tenant = user.tenant()?;
    Ok(ApiResponse::created(state.investments.create(tenant, payload).await?))
}

pub async fn investment_get(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<InvestmentId>, ApiError>,
) -> ApiResult<Investment> {
    let tenant = user.tenant()?;
    Ok(ApiResponse::success(state.investments.get(tenant, id).await?))
}

/// PUT /api/investments/:id - partial update, always refreshes lastUpdated
pub async fn investment_put(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<InvestmentId>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<InvestmentPayload>, ApiError>,
) -> ApiResult<Investment> {
    let tenant = user.tenant()?;
    Ok(ApiResponse::success(state.investments.update(tenant, id, payload).await?))
}

pub async fn investment_delete(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<InvestmentId>, ApiError>,
) -> ApiResult<Value> {
    let tenant = user.tenant()?;
    state.investments.delete(tenant, id).await?;
    Ok(ApiResponse::message("Investment deleted"))
}
