use chrono::{Duration, Utc};
use car_rental_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::{auth_service::hash_password, contract_service::rental_total},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin12345", "admin").await?;
    let staff_id = ensure_user(&pool, "staff@example.com", "staff12345", "staff").await?;
    seed_cars(&pool).await?;
    seed_customers(&pool).await?;
    seed_contracts(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Staff ID: {staff_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_cars(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let cars = vec![
        ("01A123BC", "JTDBR32E720051234", "Toyota", "Camry", 2022, "White", "sedan", "automatic", "petrol", 180, 45_000),
        ("01B456CD", "1FAHP3F29CL123456", "Ford", "Focus", 2020, "Blue", "hatchback", "manual", "petrol", 125, 30_000),
        ("01C789DE", "WBA8E9G51GNT12345", "BMW", "X5", 2023, "Black", "suv", "automatic", "diesel", 286, 90_000),
        ("01D012EF", "5YJ3E1EA7KF123456", "Tesla", "Model 3", 2021, "Red", "sedan", "automatic", "electric", 283, 80_000),
        ("01E345FG", "KMHD84LF5JU123456", "Hyundai", "Elantra", 2019, "Silver", "sedan", "automatic", "petrol", 147, 28_000),
    ];

    for (plate, chassis, manufacturer, model, year, color, category, transmission, fuel, power, price) in cars {
        sqlx::query(
            r#"
            INSERT INTO cars (id, license_plate, chassis_number, manufacturer, model, year, color,
                              category, transmission, fuel_type, seats, doors, mileage,
                              engine_power, price_per_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 5, 4, 0, $11, $12)
            ON CONFLICT (license_plate) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(plate)
        .bind(chassis)
        .bind(manufacturer)
        .bind(model)
        .bind(year)
        .bind(color)
        .bind(category)
        .bind(transmission)
        .bind(fuel)
        .bind(power)
        .bind(price as i64)
        .execute(pool)
        .await?;
    }

    println!("Seeded cars");
    Ok(())
}

async fn seed_customers(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let customers = vec![
        ("Aziz", "Karimov", "AA1234567", "DL-1001", "+998901112233", Some("Uzbekistan")),
        ("Maria", "Lopez", "XB7654321", "DL-2002", "+34600111222", Some("Spain")),
        ("John", "Smith", "US5550001", "DL-3003", "+12025550123", None),
    ];

    for (first, last, passport, license, phone, country) in customers {
        sqlx::query(
            r#"
            INSERT INTO customers (id, first_name, last_name, passport_number,
                                   driver_license_number, phone, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (passport_number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(first)
        .bind(last)
        .bind(passport)
        .bind(license)
        .bind(phone)
        .bind(country)
        .execute(pool)
        .await?;
    }

    println!("Seeded customers");
    Ok(())
}

/// One past, one running and one upcoming rental so every status shows up.
async fn seed_contracts(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contracts")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("Contracts already present, skipping");
        return Ok(());
    }

    let now = Utc::now();
    let plan = vec![
        ("AA1234567", "01A123BC", now - Duration::days(10), now - Duration::days(7), "paid"),
        ("XB7654321", "01B456CD", now - Duration::days(1), now + Duration::days(2), "pending"),
        ("US5550001", "01C789DE", now + Duration::days(3), now + Duration::days(6), "pending"),
    ];

    for (passport, plate, start, end, payment_status) in plan {
        let (customer_id,): (Uuid,) =
            sqlx::query_as("SELECT id FROM customers WHERE passport_number = $1")
                .bind(passport)
                .fetch_one(pool)
                .await?;
        let (car_id, daily_rate): (Uuid, i64) =
            sqlx::query_as("SELECT id, price_per_day FROM cars WHERE license_plate = $1")
                .bind(plate)
                .fetch_one(pool)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO contracts (id, customer_id, car_id, start_date, end_date, daily_rate,
                                   total_amount, payment_method, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'cash', $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .bind(car_id)
        .bind(start)
        .bind(end)
        .bind(daily_rate)
        .bind(rental_total(daily_rate, start, end))
        .bind(payment_status)
        .execute(pool)
        .await?;
    }

    println!("Seeded contracts");
    Ok(())
}
