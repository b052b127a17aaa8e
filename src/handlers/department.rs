//! Department handlers
//!
//! Tree maintenance and the read side of the directory

use axum::{extract::State, response::Json};

use crate::error::AppResult;
use crate::routes::ApiResponse;
use crate::service::types::*;
use crate::state::AppState;

/// POST /organization/department/add
pub async fn create_department(
    State(state): State<AppState>,
    Json(req): Json<CreateDepartmentReq>,
) -> AppResult<Json<ApiResponse<CreateDepartmentResp>>> {
    let resp = state.service.create_department(req).await?;
    Ok(Json(ApiResponse::success(resp)))
}

/// POST /organization/department/update
pub async fn update_department(
    State(state): State<AppState>,
    Json(req): Json<UpdateDepartmentReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.update_department(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /organization/department/del
pub async fn delete_department(
    State(state): State<AppState>,
    Json(req): Json<DepartmentIdsReq>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.service.delete_department(req).await?;
    Ok(Json(ApiResponse::success_msg("success")))
}

/// POST /organization/department/find
pub async fn get_department(
    State(state): State<AppState>,
    Json(req): Json<DepartmentIdsReq>,
) -> AppResult<Json<ApiResponse<DepartmentsResp>>> {
    Ok(Json(ApiResponse::success(state.service.get_department(req).await?)))
}

/// POST /organization/department/parents
pub async fn get_department_parents(
    State(state): State<AppState>,
    Json(req): Json<DepartmentIdReq>,
) -> AppResult<Json<ApiResponse<DepartmentsResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.get_department_parents(req).await?,
    )))
}

/// POST /organization/department/by_name
pub async fn get_department_by_name(
    State(state): State<AppState>,
    Json(req): Json<GetDepartmentByNameReq>,
) -> AppResult<Json<ApiResponse<DepartmentsResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.get_department_by_name(req).await?,
    )))
}

/// POST /organization/department/all
pub async fn get_organization_department(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OrganizationDepartmentResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.get_organization_department().await?,
    )))
}

/// POST /organization/department/expand
pub async fn get_sub_department(
    State(state): State<AppState>,
    Json(req): Json<DepartmentIdReq>,
) -> AppResult<Json<ApiResponse<SubDepartmentResp>>> {
    Ok(Json(ApiResponse::success(state.service.get_sub_department(req).await?)))
}

/// POST /organization/department/search
pub async fn get_search_department_user(
    State(state): State<AppState>,
    Json(req): Json<GetSearchDepartmentUserReq>,
) -> AppResult<Json<ApiResponse<SearchDepartmentUserResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.get_search_department_user(req).await?,
    )))
}

/// POST /organization/department/sort
pub async fn sort_department_list(
    State(state): State<AppState>,
    Json(req): Json<SortDepartmentListReq>,
) -> AppResult<Json<ApiResponse<SortResp>>> {
    Ok(Json(ApiResponse::success(state.service.sort_department_list(req).await?)))
}

/// POST /organization/department/import
pub async fn import_departments(
    State(state): State<AppState>,
    Json(req): Json<ImportDepartmentsReq>,
) -> AppResult<Json<ApiResponse<ImportDepartmentsResp>>> {
    Ok(Json(ApiResponse::success(state.service.import_departments(req).await?)))
}

/// POST /organization/department/user
pub async fn get_user_in_department(
    State(state): State<AppState>,
    Json(req): Json<UserIdsReq>,
) -> AppResult<Json<ApiResponse<UserInDepartmentResp>>> {
    Ok(Json(ApiResponse::success(
        state.service.get_user_in_department(req).await?,
    )))
}
