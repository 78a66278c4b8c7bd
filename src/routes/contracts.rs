use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        cars::BookingEventList,
        contracts::{ContractList, CreateContractRequest, UpdateContractRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::ContractDetail,
    response::ApiResponse,
    routes::params::{AtQuery, ListQuery},
    services::contract_service,
    state::AppState,
    status::RentalStatus,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contracts).post(create_contract))
        .route("/calendar", get(calendar))
        .route(
            "/{id}",
            get(get_contract).put(update_contract).delete(delete_contract),
        )
}

#[utoipa::path(
    get,
    path = "/api/contracts",
    params(
        ("q" = Option<String>, Query, description = "Search customer name, passport, car model or license plate"),
        ("status" = Option<RentalStatus>, Query, description = "confirmed, active or completed"),
        ("sort_by" = Option<String>, Query, description = "customer, car, license_plate, start_date, end_date, total_amount, created_at"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "List contracts", body = ApiResponse<ContractList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Contracts"
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery<RentalStatus>>,
) -> AppResult<Json<ApiResponse<ContractList>>> {
    let resp = contract_service::list_contracts(&state, query, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/contracts/calendar",
    params(AtQuery),
    responses(
        (status = 200, description = "All contracts as calendar events", body = ApiResponse<BookingEventList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Contracts"
)]
pub async fn calendar(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(at): Query<AtQuery>,
) -> AppResult<Json<ApiResponse<BookingEventList>>> {
    let resp = contract_service::calendar(&state, at.now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Get contract", body = ApiResponse<ContractDetail>),
        (status = 404, description = "Contract not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Contracts"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ContractDetail>>> {
    let resp = contract_service::get_contract(&state, id, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Create contract", body = ApiResponse<ContractDetail>),
        (status = 400, description = "Invalid dates, amounts or references"),
        (status = 409, description = "Car already booked for the period")
    ),
    security(("bearer_auth" = [])),
    tag = "Contracts"
)]
pub async fn create_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateContractRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ContractDetail>>)> {
    let resp = contract_service::create_contract(&state, &user, payload, chrono::Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Updated contract", body = ApiResponse<ContractDetail>),
        (status = 409, description = "Car already booked for the period")
    ),
    security(("bearer_auth" = [])),
    tag = "Contracts"
)]
pub async fn update_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContractRequest>,
) -> AppResult<Json<ApiResponse<ContractDetail>>> {
    let resp =
        contract_service::update_contract(&state, &user, id, payload, chrono::Utc::now()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    params(("id" = Uuid, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Deleted contract"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Contracts"
)]
pub async fn delete_contract(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = contract_service::delete_contract(&state, &user, id).await?;
    Ok(Json(resp))
}
