use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::preferences::ThemePreference,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::preference_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/theme", get(get_theme).put(set_theme))
}

#[utoipa::path(
    get,
    path = "/api/preferences/theme",
    responses(
        (status = 200, description = "Theme of the current user", body = ApiResponse<ThemePreference>)
    ),
    security(("bearer_auth" = [])),
    tag = "Preferences"
)]
pub async fn get_theme(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ThemePreference>>> {
    let resp = preference_service::get_theme(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/preferences/theme",
    request_body = ThemePreference,
    responses(
        (status = 200, description = "Theme updated", body = ApiResponse<ThemePreference>)
    ),
    security(("bearer_auth" = [])),
    tag = "Preferences"
)]
pub async fn set_theme(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ThemePreference>,
) -> AppResult<Json<ApiResponse<ThemePreference>>> {
    let resp = preference_service::set_theme(&state, &user, payload).await?;
    Ok(Json(resp))
}
