use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::{
        contracts::ContractList,
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
    },
    entity::{
        contracts::{Column as ContractCol, Entity as Contracts},
        customers::{
            ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers,
            Model as CustomerModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Customer,
    pipeline::view_pipeline,
    response::{ApiResponse, Meta},
    routes::params::ListQuery,
    services::contract_service,
    state::AppState,
};

pub async fn list_customers(
    state: &AppState,
    query: ListQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    // Creation order keeps unsorted pages stable between requests.
    let customers: Vec<Customer> = Customers::find()
        .order_by_asc(CustomerCol::CreatedAt)
        .order_by_asc(CustomerCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();
    let view = view_pipeline(
        &customers,
        &query.into_pipeline(state.config.default_page_size),
        Utc::now(),
    );
    let meta = Meta::from(&view);
    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items: view.items },
        Some(meta),
    ))
}

pub async fn get_customer(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Customer>> {
    let customer = find_customer(&state.orm, id).await?;
    Ok(ApiResponse::success("Customer", customer, None))
}

pub async fn customer_contracts(
    state: &AppState,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<ContractList>> {
    find_customer(&state.orm, id).await?;
    let items = contract_service::load_details(
        &state.orm,
        Condition::all().add(ContractCol::CustomerId.eq(id)),
        now,
    )
    .await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Customer contracts",
        ContractList { items },
        Some(Meta::new(1, total, total, 1)),
    ))
}

pub async fn create_customer(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let passport = payload.passport_number.trim().to_string();
    if payload.first_name.trim().is_empty() || passport.is_empty() {
        return Err(AppError::BadRequest(
            "first_name and passport_number are required".into(),
        ));
    }
    ensure_unique_passport(&state.orm, &passport, None).await?;

    let active = CustomerActive {
        id: Set(Uuid::new_v4()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        passport_number: Set(passport),
        driver_license_number: Set(payload.driver_license_number),
        phone: Set(payload.phone),
        email: Set(non_blank(payload.email)),
        address: Set(non_blank(payload.address)),
        country: Set(non_blank(payload.country)),
        passport_photo_url: Set(non_blank(payload.passport_photo_url)),
        license_photo_url: Set(non_blank(payload.license_photo_url)),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let customer = customer_from_entity(active.insert(&state.orm).await?);

    audit::record(
        &state.pool,
        user.user_id,
        "customer_create",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Customer created",
        customer,
        Some(Meta::empty()),
    ))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let existing = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CustomerActive = existing.into();
    if let Some(passport) = payload.passport_number {
        let passport = passport.trim().to_string();
        if passport.is_empty() {
            return Err(AppError::BadRequest("passport_number must not be empty".into()));
        }
        ensure_unique_passport(&state.orm, &passport, Some(id)).await?;
        active.passport_number = Set(passport);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(license) = payload.driver_license_number {
        active.driver_license_number = Set(license);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if payload.email.is_some() {
        active.email = Set(non_blank(payload.email));
    }
    if payload.address.is_some() {
        active.address = Set(non_blank(payload.address));
    }
    if payload.country.is_some() {
        active.country = Set(non_blank(payload.country));
    }
    if payload.passport_photo_url.is_some() {
        active.passport_photo_url = Set(non_blank(payload.passport_photo_url));
    }
    if payload.license_photo_url.is_some() {
        active.license_photo_url = Set(non_blank(payload.license_photo_url));
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let customer = customer_from_entity(active.update(&state.orm).await?);

    audit::record(
        &state.pool,
        user.user_id,
        "customer_update",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", customer, Some(Meta::empty())))
}

pub async fn delete_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let contracts = Contracts::find()
        .filter(ContractCol::CustomerId.eq(id))
        .count(&state.orm)
        .await?;
    if contracts > 0 {
        return Err(AppError::Conflict(format!(
            "Customer is referenced by {contracts} contract(s)"
        )));
    }

    let result = Customers::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "customer_delete",
        "customers",
        serde_json::json!({ "customer_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn find_customer(orm: &OrmConn, id: Uuid) -> AppResult<Customer> {
    Customers::find_by_id(id)
        .one(orm)
        .await?
        .map(customer_from_entity)
        .ok_or(AppError::NotFound)
}

async fn ensure_unique_passport(orm: &OrmConn, passport: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all().add(CustomerCol::PassportNumber.eq(passport));
    if let Some(id) = except {
        condition = condition.add(CustomerCol::Id.ne(id));
    }
    if Customers::find().filter(condition).count(orm).await? > 0 {
        return Err(AppError::Conflict("Passport number already registered".into()));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        passport_number: model.passport_number,
        driver_license_number: model.driver_license_number,
        phone: model.phone,
        email: model.email,
        address: model.address,
        country: model.country,
        passport_photo_url: model.passport_photo_url,
        license_photo_url: model.license_photo_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
