use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::status::{CarStatus, RentalStatus, car_status, derive_status};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Car {
    pub id: Uuid,
    pub license_plate: String,
    pub chassis_number: String,
    pub manufacturer: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub category: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i32,
    pub doors: i32,
    pub mileage: i32,
    pub engine_power: i32,
    pub price_per_day: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One contract period booked on a car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RentalWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A car with the periods it is booked for.
///
/// `status` is the value at read time; [`CarWithStatus::derived_status`]
/// re-evaluates it against the carried rental windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CarWithStatus {
    #[serde(flatten)]
    pub car: Car,
    pub status: CarStatus,
    #[serde(default)]
    pub rentals: Vec<RentalWindow>,
}

impl CarWithStatus {
    pub fn new(car: Car, rentals: Vec<RentalWindow>, now: DateTime<Utc>) -> Self {
        let mut row = Self {
            car,
            status: CarStatus::Available,
            rentals,
        };
        row.status = row.derived_status(now);
        row
    }

    pub fn derived_status(&self, now: DateTime<Utc>) -> CarStatus {
        let plate = self.car.license_plate.as_str();
        car_status(
            plate,
            self.rentals.iter().map(|w| (plate, w.start, w.end)),
            now,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub passport_number: String,
    pub driver_license_number: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub passport_photo_url: Option<String>,
    pub license_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Contract {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub daily_rate: i64,
    pub total_amount: i64,
    pub deposit: Option<i64>,
    pub payment_method: String,
    pub payment_status: String,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn window(&self) -> RentalWindow {
        RentalWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> RentalStatus {
        derive_status(self.start_date, self.end_date, now)
    }
}

/// Contract expanded with the customer and car it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContractDetail {
    #[serde(flatten)]
    pub contract: Contract,
    pub customer: Customer,
    pub car: Car,
    pub status: RentalStatus,
}

impl ContractDetail {
    pub fn new(contract: Contract, customer: Customer, car: Car, now: DateTime<Utc>) -> Self {
        let status = contract.status_at(now);
        Self {
            contract,
            customer,
            car,
            status,
        }
    }
}
