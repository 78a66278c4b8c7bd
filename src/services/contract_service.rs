use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    availability::{BookingRecord, project_availability},
    db::OrmConn,
    dto::{
        cars::BookingEventList,
        contracts::{
            ContractList, CreateContractRequest, PAYMENT_METHODS, PAYMENT_STATUSES,
            UpdateContractRequest,
        },
    },
    entity::{
        cars::{Column as CarCol, Entity as Cars},
        contracts::{
            ActiveModel as ContractActive, Column as ContractCol, Entity as Contracts,
            Model as ContractModel,
        },
        customers::{Column as CustomerCol, Entity as Customers},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Contract, ContractDetail},
    pipeline::view_pipeline,
    response::{ApiResponse, Meta},
    routes::params::ListQuery,
    services::{car_service, customer_service},
    state::AppState,
    status::RentalStatus,
};

const SECONDS_PER_DAY: i64 = 86_400;

pub async fn list_contracts(
    state: &AppState,
    query: ListQuery<RentalStatus>,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<ContractList>> {
    let details = load_details(&state.orm, Condition::all(), now).await?;
    let view = view_pipeline(&details, &query.into_pipeline(state.config.default_page_size), now);
    let meta = Meta::from(&view);
    Ok(ApiResponse::success(
        "Contracts",
        ContractList { items: view.items },
        Some(meta),
    ))
}

pub async fn get_contract(
    state: &AppState,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<ContractDetail>> {
    let detail = find_detail(&state.orm, id, now).await?;
    Ok(ApiResponse::success("Contract", detail, None))
}

pub async fn create_contract(
    state: &AppState,
    user: &AuthUser,
    payload: CreateContractRequest,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<ContractDetail>> {
    let customer = customer_service::find_customer(&state.orm, payload.customer_id)
        .await
        .map_err(|err| missing_reference(err, "customer"))?;
    let car = car_service::find_car(&state.orm, payload.car_id)
        .await
        .map_err(|err| missing_reference(err, "car"))?;

    ensure_valid_range(payload.start_date, payload.end_date)?;
    ensure_car_free(&state.orm, car.id, payload.start_date, payload.end_date, None).await?;

    let daily_rate = payload.daily_rate.unwrap_or(car.price_per_day);
    let total_amount = payload
        .total_amount
        .unwrap_or_else(|| rental_total(daily_rate, payload.start_date, payload.end_date));
    ensure_amounts(daily_rate, total_amount, payload.deposit)?;
    let payment_method = choice(payload.payment_method, "cash", PAYMENT_METHODS, "payment_method")?;
    let payment_status = choice(payload.payment_status, "pending", PAYMENT_STATUSES, "payment_status")?;

    let active = ContractActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        car_id: Set(car.id),
        start_date: Set(payload.start_date.fixed_offset()),
        end_date: Set(payload.end_date.fixed_offset()),
        daily_rate: Set(daily_rate),
        total_amount: Set(total_amount),
        deposit: Set(payload.deposit),
        payment_method: Set(payment_method),
        payment_status: Set(payment_status),
        notes: Set(payload.notes.filter(|n| !n.trim().is_empty())),
        photo_url: Set(payload.photo_url.filter(|u| !u.is_empty())),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let contract = contract_from_entity(active.insert(&state.orm).await?);

    audit::record(
        &state.pool,
        user.user_id,
        "contract_create",
        "contracts",
        serde_json::json!({ "contract_id": contract.id, "car_id": car.id, "customer_id": customer.id }),
    )
    .await;
    tracing::info!(contract_id = %contract.id, car = %car.license_plate, "contract created");

    Ok(ApiResponse::success(
        "Contract created",
        ContractDetail::new(contract, customer, car, now),
        Some(Meta::empty()),
    ))
}

pub async fn update_contract(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateContractRequest,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<ContractDetail>> {
    let existing = Contracts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let customer_id = payload.customer_id.unwrap_or(existing.customer_id);
    let car_id = payload.car_id.unwrap_or(existing.car_id);
    let start = payload
        .start_date
        .unwrap_or_else(|| existing.start_date.with_timezone(&Utc));
    let end = payload
        .end_date
        .unwrap_or_else(|| existing.end_date.with_timezone(&Utc));

    let customer = customer_service::find_customer(&state.orm, customer_id)
        .await
        .map_err(|err| missing_reference(err, "customer"))?;
    let car = car_service::find_car(&state.orm, car_id)
        .await
        .map_err(|err| missing_reference(err, "car"))?;
    ensure_valid_range(start, end)?;
    ensure_car_free(&state.orm, car.id, start, end, Some(id)).await?;

    let dates_changed = payload.start_date.is_some() || payload.end_date.is_some();
    let daily_rate = payload.daily_rate.unwrap_or(existing.daily_rate);
    let total_amount = match payload.total_amount {
        Some(total) => total,
        None if dates_changed || payload.daily_rate.is_some() => rental_total(daily_rate, start, end),
        None => existing.total_amount,
    };
    let deposit = payload.deposit.or(existing.deposit);
    ensure_amounts(daily_rate, total_amount, deposit)?;

    let mut active: ContractActive = existing.into();
    active.customer_id = Set(customer.id);
    active.car_id = Set(car.id);
    active.start_date = Set(start.fixed_offset());
    active.end_date = Set(end.fixed_offset());
    active.daily_rate = Set(daily_rate);
    active.total_amount = Set(total_amount);
    active.deposit = Set(deposit);
    if let Some(method) = payload.payment_method {
        active.payment_method = Set(choice(Some(method), "cash", PAYMENT_METHODS, "payment_method")?);
    }
    if let Some(status) = payload.payment_status {
        active.payment_status =
            Set(choice(Some(status), "pending", PAYMENT_STATUSES, "payment_status")?);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes).filter(|n| !n.trim().is_empty()));
    }
    if let Some(photo_url) = payload.photo_url {
        active.photo_url = Set(Some(photo_url).filter(|u| !u.is_empty()));
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let contract = contract_from_entity(active.update(&state.orm).await?);

    audit::record(
        &state.pool,
        user.user_id,
        "contract_update",
        "contracts",
        serde_json::json!({ "contract_id": contract.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        ContractDetail::new(contract, customer, car, now),
        Some(Meta::empty()),
    ))
}

pub async fn delete_contract(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Contracts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "contract_delete",
        "contracts",
        serde_json::json!({ "contract_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Every contract as a calendar event.
pub async fn calendar(
    state: &AppState,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<BookingEventList>> {
    let details = load_details(&state.orm, Condition::all(), now).await?;
    let bookings: Vec<BookingRecord> = details.iter().map(BookingRecord::from).collect();
    let items = project_availability(&bookings, now);
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Calendar",
        BookingEventList { items },
        Some(Meta::new(1, total, total, 1)),
    ))
}

/// Contracts matching `condition`, expanded with their customer and car.
pub(crate) async fn load_details(
    orm: &OrmConn,
    condition: Condition,
    now: DateTime<Utc>,
) -> AppResult<Vec<ContractDetail>> {
    let contracts = Contracts::find()
        .filter(condition)
        .order_by_asc(ContractCol::CreatedAt)
        .order_by_asc(ContractCol::Id)
        .all(orm)
        .await?;
    if contracts.is_empty() {
        return Ok(Vec::new());
    }

    let customer_ids: HashSet<Uuid> = contracts.iter().map(|c| c.customer_id).collect();
    let car_ids: HashSet<Uuid> = contracts.iter().map(|c| c.car_id).collect();

    let customers: HashMap<Uuid, _> = Customers::find()
        .filter(CustomerCol::Id.is_in(customer_ids))
        .all(orm)
        .await?
        .into_iter()
        .map(|m| (m.id, customer_service::customer_from_entity(m)))
        .collect();
    let cars: HashMap<Uuid, _> = Cars::find()
        .filter(CarCol::Id.is_in(car_ids))
        .all(orm)
        .await?
        .into_iter()
        .map(|m| (m.id, car_service::car_from_entity(m)))
        .collect();

    let mut details = Vec::with_capacity(contracts.len());
    for model in contracts {
        let (Some(customer), Some(car)) = (customers.get(&model.customer_id), cars.get(&model.car_id))
        else {
            tracing::warn!(contract_id = %model.id, "contract references a missing customer or car");
            continue;
        };
        details.push(ContractDetail::new(
            contract_from_entity(model),
            customer.clone(),
            car.clone(),
            now,
        ));
    }
    Ok(details)
}

async fn find_detail(orm: &OrmConn, id: Uuid, now: DateTime<Utc>) -> AppResult<ContractDetail> {
    load_details(orm, Condition::all().add(ContractCol::Id.eq(id)), now)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound)
}

async fn ensure_car_free(
    orm: &OrmConn,
    car_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut condition = Condition::all()
        .add(ContractCol::CarId.eq(car_id))
        .add(ContractCol::StartDate.lt(end.fixed_offset()))
        .add(ContractCol::EndDate.gt(start.fixed_offset()));
    if let Some(id) = except {
        condition = condition.add(ContractCol::Id.ne(id));
    }
    if let Some(clash) = Contracts::find().filter(condition).one(orm).await? {
        return Err(AppError::Conflict(format!(
            "Car is already booked by contract {} for an overlapping period",
            clash.id
        )));
    }
    Ok(())
}

fn ensure_valid_range(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if start >= end {
        return Err(AppError::BadRequest("end_date must be after start_date".into()));
    }
    Ok(())
}

fn ensure_amounts(daily_rate: i64, total_amount: i64, deposit: Option<i64>) -> AppResult<()> {
    if daily_rate < 0 || total_amount < 0 || deposit.is_some_and(|d| d < 0) {
        return Err(AppError::BadRequest("Amounts must not be negative".into()));
    }
    Ok(())
}

fn choice(value: Option<String>, default: &str, allowed: &[&str], field: &str) -> AppResult<String> {
    let value = value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string());
    if !allowed.contains(&value.as_str()) {
        return Err(AppError::BadRequest(format!(
            "{field} must be one of {}",
            allowed.join(", ")
        )));
    }
    Ok(value)
}

fn missing_reference(err: AppError, what: &str) -> AppError {
    match err {
        AppError::NotFound => AppError::BadRequest(format!("Unknown {what}")),
        other => other,
    }
}

/// Whole days charged for a rental: any started day counts, minimum one.
pub fn billable_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    ((seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1)
}

pub fn rental_total(daily_rate: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    daily_rate.saturating_mul(billable_days(start, end))
}

pub(crate) fn contract_from_entity(model: ContractModel) -> Contract {
    Contract {
        id: model.id,
        customer_id: model.customer_id,
        car_id: model.car_id,
        start_date: model.start_date.with_timezone(&Utc),
        end_date: model.end_date.with_timezone(&Utc),
        daily_rate: model.daily_rate,
        total_amount: model.total_amount,
        deposit: model.deposit,
        payment_method: model.payment_method,
        payment_status: model.payment_status,
        notes: model.notes,
        photo_url: model.photo_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn partial_days_round_up() {
        assert_eq!(billable_days(start(), start() + Duration::hours(3)), 1);
        assert_eq!(billable_days(start(), start() + Duration::days(2)), 2);
        assert_eq!(billable_days(start(), start() + Duration::days(2) + Duration::minutes(1)), 3);
    }

    #[test]
    fn empty_or_inverted_range_bills_one_day() {
        assert_eq!(billable_days(start(), start()), 1);
        assert_eq!(billable_days(start(), start() - Duration::days(4)), 1);
    }

    #[test]
    fn total_is_rate_times_days() {
        assert_eq!(rental_total(45, start(), start() + Duration::days(4)), 180);
    }

    #[test]
    fn choice_normalises_and_validates() {
        assert_eq!(choice(None, "cash", PAYMENT_METHODS, "m").unwrap(), "cash");
        assert_eq!(choice(Some(" CARD ".into()), "cash", PAYMENT_METHODS, "m").unwrap(), "card");
        assert!(choice(Some("barter".into()), "cash", PAYMENT_METHODS, "m").is_err());
    }

    #[test]
    fn range_must_move_forward() {
        assert!(ensure_valid_range(start(), start()).is_err());
        assert!(ensure_valid_range(start(), start() + Duration::hours(1)).is_ok());
    }
}
