//! Department member handlers

use axum::{extract::State, response::Json};

use crate::error::AppResult;
use crate::routes::ApiResponse;
use crate::service::types::*;
use crate::state::AppState;

/// POST /organization/department/member/add
pub async fn create_department_member(
    State(state): State<AppState>,
    Json(req): Json<CreateDepartmentMemberReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.create_department_member(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /organization/department/member/update
pub async fn update_user_in_department(
    State(state): State<AppState>,
    Json(req): Json<UpdateUserInDepartmentReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.update_user_in_department(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /organization/department/member/del
pub async fn delete_user_in_department(
    State(state): State<AppState>,
    Json(req): Json<UserDepartmentReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.delete_user_in_department(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /organization/department/member/move
pub async fn move_user_department(
    State(state): State<AppState>,
    Json(req): Json<MoveUserDepartmentReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.move_user_department(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /organization/department/member/sort
pub async fn sort_organization_user_list(
    State(state): State<AppState>,
    Json(req): Json<SortOrganizationUserListReq>,
) -> AppResult<Json<ApiResponse<SortResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.sort_organization_user_list(req).await?,
    )))
}

/// POST /organization/ungrouped/add
pub async fn add_user_to_ungrouped(
    State(state): State<AppState>,
    Json(req): Json<UserIdReq>,
) -> AppResult<Json<ApiResponse<UngroupedResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.add_user_to_ungrouped(&req.user_id).await?,
    )))
}
