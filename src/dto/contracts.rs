use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ContractDetail;

pub const PAYMENT_METHODS: &[&str] = &["cash", "card", "transfer"];
pub const PAYMENT_STATUSES: &[&str] = &["pending", "paid", "refunded"];

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateContractRequest {
    pub customer_id: Uuid,
    pub car_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Defaults to the car's price per day.
    pub daily_rate: Option<i64>,
    /// Defaults to the daily rate times the billable days.
    pub total_amount: Option<i64>,
    pub deposit: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateContractRequest {
    pub customer_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub daily_rate: Option<i64>,
    pub total_amount: Option<i64>,
    pub deposit: Option<i64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ContractList {
    #[schema(value_type = Vec<ContractDetail>)]
    pub items: Vec<ContractDetail>,
}
