use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    availability::{BookingRecord, project_availability},
    db::OrmConn,
    dto::cars::{BookingEventList, CarList, CreateCarRequest, UpdateCarRequest},
    entity::{
        cars::{ActiveModel as CarActive, Column as CarCol, Entity as Cars, Model as CarModel},
        contracts::{Column as ContractCol, Entity as Contracts},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Car, CarWithStatus, RentalWindow},
    pipeline::view_pipeline,
    response::{ApiResponse, Meta},
    routes::params::ListQuery,
    services::contract_service,
    state::AppState,
    status::CarStatus,
};

pub async fn list_cars(
    state: &AppState,
    query: ListQuery<CarStatus>,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<CarList>> {
    let cars = cars_with_status(&state.orm, now).await?;
    let view = view_pipeline(&cars, &query.into_pipeline(state.config.default_page_size), now);
    let meta = Meta::from(&view);
    Ok(ApiResponse::success(
        "Cars",
        CarList { items: view.items },
        Some(meta),
    ))
}

pub async fn get_car(
    state: &AppState,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<CarWithStatus>> {
    let car = find_car(&state.orm, id).await?;
    let rentals = rentals_of(&state.orm, car.id).await?;
    Ok(ApiResponse::success(
        "Car",
        CarWithStatus::new(car, rentals, now),
        None,
    ))
}

pub async fn create_car(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCarRequest,
) -> AppResult<ApiResponse<CarWithStatus>> {
    validate_car(&payload)?;
    ensure_unique(&state.orm, &payload.license_plate, &payload.chassis_number, None).await?;

    let active = CarActive {
        id: Set(Uuid::new_v4()),
        license_plate: Set(payload.license_plate.trim().to_string()),
        chassis_number: Set(payload.chassis_number.trim().to_string()),
        manufacturer: Set(payload.manufacturer),
        model: Set(payload.model),
        year: Set(payload.year),
        color: Set(payload.color),
        category: Set(payload.category),
        transmission: Set(payload.transmission),
        fuel_type: Set(payload.fuel_type),
        seats: Set(payload.seats),
        doors: Set(payload.doors),
        mileage: Set(payload.mileage),
        engine_power: Set(payload.engine_power),
        price_per_day: Set(payload.price_per_day),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let car = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "car_create",
        "cars",
        serde_json::json!({ "car_id": car.id, "license_plate": car.license_plate }),
    )
    .await;
    tracing::info!(car_id = %car.id, "car created");

    // A brand new car has no contracts yet.
    Ok(ApiResponse::success(
        "Car created",
        CarWithStatus::new(car_from_entity(car), Vec::new(), Utc::now()),
        Some(Meta::empty()),
    ))
}

pub async fn update_car(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCarRequest,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<CarWithStatus>> {
    let existing = Cars::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let plate = payload
        .license_plate
        .as_deref()
        .unwrap_or(&existing.license_plate)
        .trim()
        .to_string();
    let chassis = payload
        .chassis_number
        .as_deref()
        .unwrap_or(&existing.chassis_number)
        .trim()
        .to_string();
    validate_car_fields(
        &plate,
        &chassis,
        payload.price_per_day.unwrap_or(existing.price_per_day),
        payload.seats.unwrap_or(existing.seats),
        payload.doors.unwrap_or(existing.doors),
    )?;
    ensure_unique(&state.orm, &plate, &chassis, Some(id)).await?;

    let mut active: CarActive = existing.into();
    active.license_plate = Set(plate);
    active.chassis_number = Set(chassis);
    if let Some(manufacturer) = payload.manufacturer {
        active.manufacturer = Set(manufacturer);
    }
    if let Some(model) = payload.model {
        active.model = Set(model);
    }
    if let Some(year) = payload.year {
        active.year = Set(year);
    }
    if let Some(color) = payload.color {
        active.color = Set(color);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(transmission) = payload.transmission {
        active.transmission = Set(transmission);
    }
    if let Some(fuel_type) = payload.fuel_type {
        active.fuel_type = Set(fuel_type);
    }
    if let Some(seats) = payload.seats {
        active.seats = Set(seats);
    }
    if let Some(doors) = payload.doors {
        active.doors = Set(doors);
    }
    if let Some(mileage) = payload.mileage {
        active.mileage = Set(mileage);
    }
    if let Some(engine_power) = payload.engine_power {
        active.engine_power = Set(engine_power);
    }
    if let Some(price) = payload.price_per_day {
        active.price_per_day = Set(price);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url).filter(|url| !url.is_empty()));
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let car = car_from_entity(active.update(&state.orm).await?);
    let rentals = rentals_of(&state.orm, car.id).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "car_update",
        "cars",
        serde_json::json!({ "car_id": car.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        CarWithStatus::new(car, rentals, now),
        Some(Meta::empty()),
    ))
}

pub async fn delete_car(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let car = find_car(&state.orm, id).await?;
    let rentals = rentals_of(&state.orm, car.id).await?;

    if CarWithStatus::new(car, rentals, now).status == CarStatus::Busy {
        return Err(AppError::Conflict("Car is currently rented".into()));
    }
    let history = Contracts::find()
        .filter(ContractCol::CarId.eq(id))
        .count(&state.orm)
        .await?;
    if history > 0 {
        return Err(AppError::Conflict(format!(
            "Car is referenced by {history} contract(s)"
        )));
    }

    let result = Cars::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "car_delete",
        "cars",
        serde_json::json!({ "car_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Calendar events for every contract booked on this car.
pub async fn car_availability(
    state: &AppState,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<BookingEventList>> {
    find_car(&state.orm, id).await?;
    let details = contract_service::load_details(
        &state.orm,
        Condition::all().add(ContractCol::CarId.eq(id)),
        now,
    )
    .await?;
    let bookings: Vec<BookingRecord> = details.iter().map(BookingRecord::from).collect();
    let items = project_availability(&bookings, now);
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Availability",
        BookingEventList { items },
        Some(Meta::new(1, total, total, 1)),
    ))
}

/// Every car with its rental windows and status recomputed from the current contract set.
///
/// Rows come back in creation order so separate page requests slice the same sequence.
pub(crate) async fn cars_with_status(
    orm: &OrmConn,
    now: DateTime<Utc>,
) -> AppResult<Vec<CarWithStatus>> {
    let cars = Cars::find()
        .order_by_asc(CarCol::CreatedAt)
        .order_by_asc(CarCol::Id)
        .all(orm)
        .await?;

    let mut windows: HashMap<Uuid, Vec<RentalWindow>> = HashMap::new();
    for contract in Contracts::find()
        .order_by_asc(ContractCol::StartDate)
        .all(orm)
        .await?
    {
        windows
            .entry(contract.car_id)
            .or_default()
            .push(contract_service::contract_from_entity(contract).window());
    }

    Ok(cars
        .into_iter()
        .map(|model| {
            let rentals = windows.remove(&model.id).unwrap_or_default();
            CarWithStatus::new(car_from_entity(model), rentals, now)
        })
        .collect())
}

async fn rentals_of(orm: &OrmConn, car_id: Uuid) -> AppResult<Vec<RentalWindow>> {
    Ok(Contracts::find()
        .filter(ContractCol::CarId.eq(car_id))
        .order_by_asc(ContractCol::StartDate)
        .all(orm)
        .await?
        .into_iter()
        .map(|contract| contract_service::contract_from_entity(contract).window())
        .collect())
}

pub(crate) async fn find_car(orm: &OrmConn, id: Uuid) -> AppResult<Car> {
    Cars::find_by_id(id)
        .one(orm)
        .await?
        .map(car_from_entity)
        .ok_or(AppError::NotFound)
}

async fn ensure_unique(
    orm: &OrmConn,
    plate: &str,
    chassis: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut condition = Condition::all().add(
        Condition::any()
            .add(CarCol::LicensePlate.eq(plate))
            .add(CarCol::ChassisNumber.eq(chassis)),
    );
    if let Some(id) = except {
        condition = condition.add(CarCol::Id.ne(id));
    }
    if Cars::find().filter(condition).count(orm).await? > 0 {
        return Err(AppError::Conflict(
            "License plate or chassis number already registered".into(),
        ));
    }
    Ok(())
}

fn validate_car(payload: &CreateCarRequest) -> AppResult<()> {
    validate_car_fields(
        payload.license_plate.trim(),
        payload.chassis_number.trim(),
        payload.price_per_day,
        payload.seats,
        payload.doors,
    )
}

/// Checks shared by create and update; `plate` and `chassis` are already trimmed.
fn validate_car_fields(plate: &str, chassis: &str, price_per_day: i64, seats: i32, doors: i32) -> AppResult<()> {
    if plate.is_empty() || chassis.is_empty() {
        return Err(AppError::BadRequest(
            "license_plate and chassis_number are required".into(),
        ));
    }
    if price_per_day < 0 {
        return Err(AppError::BadRequest("price_per_day must not be negative".into()));
    }
    if seats <= 0 || doors <= 0 {
        return Err(AppError::BadRequest("seats and doors must be positive".into()));
    }
    Ok(())
}

pub(crate) fn car_from_entity(model: CarModel) -> Car {
    Car {
        id: model.id,
        license_plate: model.license_plate,
        chassis_number: model.chassis_number,
        manufacturer: model.manufacturer,
        model: model.model,
        year: model.year,
        color: model.color,
        category: model.category,
        transmission: model.transmission,
        fuel_type: model.fuel_type,
        seats: model.seats,
        doors: model.doors,
        mileage: model.mileage,
        engine_power: model.engine_power,
        price_per_day: model.price_per_day,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
