// handlers/protected/policies/mod.rs - /api/policies CRUD and attachments, tenant scoped

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::PolicyView;
use crate::error::ApiError;
use crate::filter::{PolicyFilter, PolicyQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ServiceError;
use crate::types::PolicyId;

pub mod submission;

pub use submission::PolicySubmission;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/policies", get(policies_get).post(policies_post))
        .route(
            "/api/policies/:id",
            get(policy_get).put(policy_put).delete(policy_delete),
        )
        .route("/api/policies/:id/document", get(policy_document_get))
}

/// GET /api/policies?search=&type= - newest first, each with its derived `status`
pub async fn policies_get(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<PolicyQuery>, ApiError>,
) -> ApiResult<Vec<PolicyView>> {
    let tenant = user.tenant()?;
    let filter = PolicyFilter::try_from(query).map_err(ServiceError::from)?;
    let today = Utc::now().date_naive();

    let policies = state.policies.list(tenant, &filter).await?;
    Ok(ApiResponse::success(
        policies.into_iter().map(|p| p.view(today)).collect(),
    ))
}

/// POST /api/policies - JSON, or multipart with an optional `document` file
pub async fn policies_post(
    State(state): State<AppState>,
    user: AuthUser,
    submission: PolicySubmission,
) -> ApiResult<PolicyView> {
    let tenant = user.tenant()?;
    let policy = state
        .policies
        .create(tenant, submission.payload, submission.upload)
        .await?;
    Ok(ApiResponse::created(policy.view(Utc::now().date_naive())))
}

pub async fn policy_get(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<PolicyId>, ApiError>,
) -> ApiResult<PolicyView> {
    let tenant = user.tenant()?;
    let policy = state.policies.get(tenant, id).await?;
    Ok(ApiResponse::success(policy.view(Utc::now().date_naive())))
}

/// PUT /api/policies/:id - partial update; a new `document` replaces the old one
pub async fn policy_put(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<PolicyId>, ApiError>,
    submission: PolicySubmission,
) -> ApiResult<PolicyView> {
    let tenant = user.tenant()?;
    let policy = state
        .policies
        .update(tenant, id, submission.payload, submission.upload)
        .await?;
    Ok(ApiResponse::success(policy.view(Utc::now().date_naive())))
}

pub async fn policy_delete(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<PolicyId>, ApiError>,
) -> ApiResult<Value> {
    let tenant = user.tenant()?;
    state.policies.delete(tenant, id).await?;
    Ok(ApiResponse::message("Policy deleted"))
}

/// GET /api/policies/:id/document - raw attachment download
pub async fn policy_document_get(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<PolicyId>, ApiError>,
) -> Result<Response, ApiError> {
    let tenant = user.tenant()?;
    let document = state.policies.document(tenant, id).await?;

    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
