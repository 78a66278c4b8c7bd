use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{availability::BookingEvent, models::CarWithStatus};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateCarRequest {
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
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateCarRequest {
    pub license_plate: Option<String>,
    pub chassis_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub seats: Option<i32>,
    pub doors: Option<i32>,
    pub mileage: Option<i32>,
    pub engine_power: Option<i32>,
    pub price_per_day: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CarList {
    #[schema(value_type = Vec<CarWithStatus>)]
    pub items: Vec<CarWithStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BookingEventList {
    #[schema(value_type = Vec<BookingEvent>)]
    pub items: Vec<BookingEvent>,
}
