use axum::{Router, http::HeaderMap};

use crate::state::AppState;

pub mod auth;
pub mod cars;
pub mod contracts;
pub mod customers;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod params;
pub mod preferences;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cars", cars::router())
        .nest("/customers", customers::router())
        .nest("/contracts", contracts::router())
        .nest("/dashboard", dashboard::router())
        .nest("/preferences", preferences::router())
}

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id set by the request-id layer, or `-` when absent or not valid UTF-8.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}
