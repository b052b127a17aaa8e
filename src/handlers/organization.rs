//! Organization profile handlers

use axum::{extract::State, response::Json};

use crate::error::AppResult;
use crate::routes::ApiResponse;
use crate::service::types::{OrganizationInfo, SetOrganizationReq};
use crate::state::AppState;

/// POST /organization/get
pub async fn get_organization(State(state): State<AppState>) -> AppResult<Json<ApiResponse<OrganizationInfo>>> {
    Ok(Json(ApiResponse::success(state.service.get_organization().await?)))
}

/// POST /organization/set
pub async fn set_organization(
    State(state): State<AppState>,
    Json(req): Json<SetOrganizationReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.set_organization(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}
