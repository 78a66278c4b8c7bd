use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    error::AppResult,
    metrics::DashboardMetrics,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::AtQuery,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(AtQuery),
    responses(
        (status = 200, description = "Fleet, contract and revenue aggregates", body = ApiResponse<DashboardMetrics>)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(at): Query<AtQuery>,
) -> AppResult<Json<ApiResponse<DashboardMetrics>>> {
    let resp = dashboard_service::dashboard(&state, at.now()).await?;
    Ok(Json(resp))
}
