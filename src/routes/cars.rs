use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::cars::{BookingEventList, CarList, CreateCarRequest, UpdateCarRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CarWithStatus,
    response::ApiResponse,
    routes::params::{AtQuery, ListQuery},
    services::car_service,
    state::AppState,
    status::CarStatus,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/{id}", get(get_car).put(update_car).delete(delete_car))
        .route("/{id}/availability", get(car_availability))
}

#[utoipa::path(
    get,
    path = "/api/cars",
    params(
        ("q" = Option<String>, Query, description = "Search manufacturer, model or license plate"),
        ("status" = Option<CarStatus>, Query, description = "available or busy"),
        ("sort_by" = Option<String>, Query, description = "manufacturer, model, license_plate, year, category, mileage, price_per_day, created_at"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "List cars", body = ApiResponse<CarList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
pub async fn list_cars(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery<CarStatus>>,
) -> AppResult<Json<ApiResponse<CarList>>> {
    let resp = car_service::list_cars(&state, query, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Get car", body = ApiResponse<CarWithStatus>),
        (status = 404, description = "Car not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
pub async fn get_car(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CarWithStatus>>> {
    let resp = car_service::get_car(&state, id, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cars",
    request_body = CreateCarRequest,
    responses(
        (status = 201, description = "Create car", body = ApiResponse<CarWithStatus>),
        (status = 409, description = "License plate or chassis number taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
pub async fn create_car(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCarRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CarWithStatus>>)> {
    let resp = car_service::create_car(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Updated car", body = ApiResponse<CarWithStatus>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
pub async fn update_car(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCarRequest>,
) -> AppResult<Json<ApiResponse<CarWithStatus>>> {
    let resp = car_service::update_car(&state, &user, id, payload, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Deleted car"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Car has contracts")
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
pub async fn delete_car(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = car_service::delete_car(&state, &user, id, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}/availability",
    params(
        ("id" = Uuid, Path, description = "Car ID"),
        AtQuery,
    ),
    responses(
        (status = 200, description = "Booking events for the car", body = ApiResponse<BookingEventList>),
        (status = 404, description = "Car not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cars"
)]
pub async fn car_availability(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Query(at): Query<AtQuery>,
) -> AppResult<Json<ApiResponse<BookingEventList>>> {
    let resp = car_service::car_availability(&state, id, at.now()).await?;
    Ok(Json(resp))
}
