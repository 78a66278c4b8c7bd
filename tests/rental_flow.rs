use car_rental_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        cars::CreateCarRequest,
        contracts::CreateContractRequest,
        customers::CreateCustomerRequest,
        preferences::ThemePreference,
    },
    error::AppError,
    middleware::auth::{AuthUser, decode_token},
    routes::params::ListQuery,
    services::{
        auth_service, car_service, contract_service, customer_service, dashboard_service,
        preference_service,
    },
    state::AppState,
    status::{CarStatus, RentalStatus},
    theme::Theme,
};
use chrono::{Duration, Utc};

// Integration flow: bootstrap admin -> fleet and customer -> contract -> statuses,
// conflicts, calendar, dashboard and theme.
#[tokio::test]
async fn contract_lifecycle_drives_car_status() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let now = Utc::now();

    // First account becomes admin without a caller.
    let admin = auth_service::register_user(
        &state,
        None,
        RegisterRequest {
            email: "Admin@Example.com".into(),
            password: "admin12345".into(),
            role: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(admin.role, "admin");

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "admin@example.com".into(),
            password: "admin12345".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let admin_user = decode_token(&login.token, &state.config.jwt_secret)?;
    assert_eq!(admin_user.user_id, admin.id);

    // Later registrations need an admin caller.
    let anonymous = auth_service::register_user(
        &state,
        None,
        RegisterRequest {
            email: "staff@example.com".into(),
            password: "staff12345".into(),
            role: None,
        },
    )
    .await;
    assert!(matches!(anonymous, Err(AppError::Unauthorized(_))));

    let staff = auth_service::register_user(
        &state,
        Some(&admin_user),
        RegisterRequest {
            email: "staff@example.com".into(),
            password: "staff12345".into(),
            role: None,
        },
    )
    .await?
    .data
    .unwrap();
    let staff_user = AuthUser {
        user_id: staff.id,
        role: staff.role.clone(),
    };

    let car = car_service::create_car(&state, &staff_user, car_request("01A777AA", 50_000))
        .await?
        .data
        .unwrap();
    assert_eq!(car.status, CarStatus::Available);

    let customer = customer_service::create_customer(
        &state,
        &staff_user,
        CreateCustomerRequest {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            passport_number: "PT1234567".into(),
            driver_license_number: "DL-1".into(),
            phone: "+351900000000".into(),
            email: None,
            address: None,
            country: Some("Portugal".into()),
            passport_photo_url: None,
            license_photo_url: None,
        },
    )
    .await?
    .data
    .unwrap();

    // Running now, 2 days and 1 hour long: billed as 3 days.
    let start = now - Duration::days(1);
    let end = now + Duration::days(1) + Duration::hours(1);
    let contract = contract_service::create_contract(
        &state,
        &staff_user,
        contract_request(customer.id, car.car.id, start, end),
        now,
    )
    .await?
    .data
    .unwrap();
    assert_eq!(contract.status, RentalStatus::Active);
    assert_eq!(contract.contract.daily_rate, 50_000);
    assert_eq!(contract.contract.total_amount, 150_000);

    let busy = car_service::get_car(&state, car.car.id, now).await?.data.unwrap();
    assert_eq!(busy.status, CarStatus::Busy);

    // Same car, overlapping window.
    let clash = contract_service::create_contract(
        &state,
        &staff_user,
        contract_request(customer.id, car.car.id, now, now + Duration::days(3)),
        now,
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    // Looking past the end date the car is free again and the contract completed.
    let later = end + Duration::hours(1);
    let free = car_service::get_car(&state, car.car.id, later).await?.data.unwrap();
    assert_eq!(free.status, CarStatus::Available);

    let completed = contract_service::list_contracts(
        &state,
        ListQuery {
            status: Some(RentalStatus::Completed),
            ..ListQuery::default()
        },
        later,
    )
    .await?;
    assert_eq!(completed.data.unwrap().items.len(), 1);

    let calendar = contract_service::calendar(&state, now).await?.data.unwrap();
    assert_eq!(calendar.items.len(), 1);
    assert_eq!(calendar.items[0].title, "Booked by Ana Silva");

    let metrics = dashboard_service::dashboard(&state, now).await?.data.unwrap();
    assert_eq!(metrics.fleet.busy, 1);
    assert_eq!(metrics.contracts.active, 1);
    assert_eq!(metrics.revenue_outstanding, 150_000);

    // Unsorted pages slice one stable sequence.
    for plate in ["01B001BB", "01B002BB", "01B003BB", "01B004BB"] {
        car_service::create_car(&state, &staff_user, car_request(plate, 30_000)).await?;
    }
    let everything: Vec<String> = car_service::list_cars(&state, ListQuery::default(), now)
        .await?
        .data
        .unwrap()
        .items
        .into_iter()
        .map(|c| c.car.license_plate)
        .collect();
    assert_eq!(everything.len(), 5);
    let mut paged = Vec::new();
    for page in 1..=3 {
        let query = ListQuery {
            page: Some(page),
            per_page: Some(2),
            ..ListQuery::default()
        };
        let resp = car_service::list_cars(&state, query, now).await?;
        assert_eq!(resp.meta.unwrap().total_pages, Some(3));
        paged.extend(resp.data.unwrap().items.into_iter().map(|c| c.car.license_plate));
    }
    assert_eq!(paged, everything);

    // Staff cannot delete, and a car with history cannot be deleted at all.
    let forbidden = car_service::delete_car(&state, &staff_user, car.car.id, now).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));
    let referenced = car_service::delete_car(&state, &admin_user, car.car.id, later).await;
    assert!(matches!(referenced, Err(AppError::Conflict(_))));

    // Theme preference survives between requests.
    let initial = preference_service::get_theme(&state, &staff_user).await?.data.unwrap();
    assert_eq!(initial.theme, Theme::System);
    preference_service::set_theme(&state, &staff_user, ThemePreference { theme: Theme::Dark })
        .await?;
    let stored = preference_service::get_theme(&state, &staff_user).await?.data.unwrap();
    assert_eq!(stored.theme, Theme::Dark);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE contracts, cars, customers, user_preferences, audit_logs, users CASCADE",
    )
    .execute(&pool)
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        default_page_size: 10,
    };
    Ok(AppState::new(pool, config))
}

fn car_request(plate: &str, price_per_day: i64) -> CreateCarRequest {
    CreateCarRequest {
        license_plate: plate.into(),
        chassis_number: format!("CH-{plate}"),
        manufacturer: "Toyota".into(),
        model: "Corolla".into(),
        year: 2022,
        color: "White".into(),
        category: "sedan".into(),
        transmission: "automatic".into(),
        fuel_type: "petrol".into(),
        seats: 5,
        doors: 4,
        mileage: 12_000,
        engine_power: 140,
        price_per_day,
        image_url: None,
    }
}

fn contract_request(
    customer_id: uuid::Uuid,
    car_id: uuid::Uuid,
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
) -> CreateContractRequest {
    CreateContractRequest {
        customer_id,
        car_id,
        start_date: start,
        end_date: end,
        daily_rate: None,
        total_amount: None,
        deposit: None,
        payment_method: None,
        payment_status: None,
        notes: None,
        photo_url: None,
    }
}
