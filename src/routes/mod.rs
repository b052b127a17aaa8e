use axum::{
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            code: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let organization_routes = Router::new()
        // Department routes
        .route("/department/add", post(handlers::department::create_department))
        .route("/department/update", post(handlers::department::update_department))
        .route("/department/del", post(handlers::department::delete_department))
        .route("/department/find", post(handlers::department::get_department))
        .route("/department/parents", post(handlers::department::get_department_parents))
        .route("/department/by_name", post(handlers::department::get_department_by_name))
        .route("/department/all", post(handlers::department::get_organization_department))
        .route("/department/expand", post(handlers::department::get_sub_department))
        .route("/department/search", post(handlers::department::get_search_department_user))
        .route("/department/sort", post(handlers::department::sort_department_list))
        .route("/department/import", post(handlers::department::import_departments))
        .route("/department/user", post(handlers::department::get_user_in_department))
        // Member routes
        .route("/department/member/add", post(handlers::member::create_department_member))
        .route("/department/member/update", post(handlers::member::update_user_in_department))
        .route("/department/member/del", post(handlers::member::delete_user_in_department))
        .route("/department/member/move", post(handlers::member::move_user_department))
        .route("/department/member/sort", post(handlers::member::sort_organization_user_list))
        .route("/ungrouped/add", post(handlers::member::add_user_to_ungrouped))
        // Organization profile
        .route("/set", post(handlers::organization::set_organization))
        .route("/get", post(handlers::organization::get_organization));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/organization", organization_routes)
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("Not Found")))
}
