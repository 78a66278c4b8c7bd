use chrono::{DateTime, Utc};
use sea_orm::{Condition, EntityTrait, PaginatorTrait};

use crate::{
    entity::customers::Entity as Customers,
    error::AppResult,
    metrics::{DashboardMetrics, compute_dashboard},
    response::{ApiResponse, Meta},
    services::{car_service, contract_service},
    state::AppState,
};

pub async fn dashboard(
    state: &AppState,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<DashboardMetrics>> {
    let cars = car_service::cars_with_status(&state.orm, now).await?;
    let contracts = contract_service::load_details(&state.orm, Condition::all(), now).await?;
    let customers = Customers::find().count(&state.orm).await? as usize;

    let metrics = compute_dashboard(&cars, &contracts, customers, now);
    tracing::debug!(
        cars = metrics.fleet.total,
        contracts = metrics.contracts.total,
        "dashboard computed"
    );
    Ok(ApiResponse::success("Dashboard", metrics, Some(Meta::empty())))
}
