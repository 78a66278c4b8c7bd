use crate::{
    dto::preferences::ThemePreference,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
    theme::{DbThemeStorage, ThemeStore},
};

pub async fn get_theme(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ThemePreference>> {
    let store = ThemeStore::init(DbThemeStorage::new(state.orm.clone(), user.user_id)).await?;
    Ok(ApiResponse::success(
        "Theme",
        ThemePreference {
            theme: store.current(),
        },
        None,
    ))
}

pub async fn set_theme(
    state: &AppState,
    user: &AuthUser,
    payload: ThemePreference,
) -> AppResult<ApiResponse<ThemePreference>> {
    let store = ThemeStore::init(DbThemeStorage::new(state.orm.clone(), user.user_id)).await?;
    let theme = store.apply(payload.theme).await?;
    tracing::debug!(user_id = %user.user_id, theme = theme.as_str(), "theme updated");
    Ok(ApiResponse::success("Theme updated", ThemePreference { theme }, None))
}
