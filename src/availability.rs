//! Projection of rental contracts into calendar events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::ContractDetail,
    status::{RentalStatus, derive_status},
};

const PLACEHOLDER: &str = "N/A";

/// The subset of a contract the calendar needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookingRecord {
    pub contract_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub customer_name: String,
    pub passport: Option<String>,
    pub phone: Option<String>,
    pub total_amount: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookingEvent {
    pub contract_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub status: RentalStatus,
    pub customer_name: String,
    pub passport: String,
    pub phone: String,
    pub total_amount: String,
}

impl From<&ContractDetail> for BookingRecord {
    fn from(detail: &ContractDetail) -> Self {
        Self {
            contract_id: detail.contract.id,
            start: detail.contract.start_date,
            end: detail.contract.end_date,
            customer_name: detail.customer.full_name(),
            passport: Some(detail.customer.passport_number.clone()),
            phone: Some(detail.customer.phone.clone()),
            total_amount: Some(detail.contract.total_amount),
        }
    }
}

/// Turn bookings into calendar events classified against `now`.
///
/// Output has the same length and order as `bookings`.
pub fn project_availability(bookings: &[BookingRecord], now: DateTime<Utc>) -> Vec<BookingEvent> {
    bookings
        .iter()
        .map(|booking| project_one(booking, now))
        .collect()
}

fn project_one(booking: &BookingRecord, now: DateTime<Utc>) -> BookingEvent {
    let customer_name = text_or_placeholder(Some(booking.customer_name.as_str()));
    BookingEvent {
        contract_id: booking.contract_id,
        start: booking.start,
        end: booking.end,
        title: format!("Booked by {customer_name}"),
        status: derive_status(booking.start, booking.end, now),
        passport: text_or_placeholder(booking.passport.as_deref()),
        phone: text_or_placeholder(booking.phone.as_deref()),
        total_amount: booking
            .total_amount
            .map(|amount| amount.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        customer_name,
    }
}

fn text_or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn booking(name: &str, start: u32, end: u32) -> BookingRecord {
        BookingRecord {
            contract_id: Uuid::new_v4(),
            start: day(start),
            end: day(end),
            customer_name: name.to_string(),
            passport: None,
            phone: Some("+1 555 0100".into()),
            total_amount: Some(450),
        }
    }

    #[test]
    fn active_booking_mentions_customer() {
        let events = project_availability(&[booking("Ana", 10, 15)], day(12));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, RentalStatus::Active);
        assert!(events[0].title.contains("Ana"));
    }

    #[test]
    fn preserves_order_and_length() {
        let input = vec![
            booking("Late", 20, 25),
            booking("Early", 1, 2),
            booking("Now", 10, 14),
        ];
        let events = project_availability(&input, day(12));
        let ids: Vec<_> = events.iter().map(|e| e.contract_id).collect();
        let expected: Vec<_> = input.iter().map(|b| b.contract_id).collect();
        assert_eq!(ids, expected);
        let statuses: Vec<_> = events.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                RentalStatus::Confirmed,
                RentalStatus::Completed,
                RentalStatus::Active
            ]
        );
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let mut record = booking("  ", 10, 15);
        record.phone = None;
        record.total_amount = None;
        let event = &project_availability(&[record], day(1))[0];
        assert_eq!(event.customer_name, "N/A");
        assert_eq!(event.title, "Booked by N/A");
        assert_eq!(event.passport, "N/A");
        assert_eq!(event.phone, "N/A");
        assert_eq!(event.total_amount, "N/A");
    }

    #[test]
    fn refresh_with_later_now_reclassifies() {
        let input = vec![booking("Ana", 10, 15)];
        assert_eq!(project_availability(&input, day(5))[0].status, RentalStatus::Confirmed);
        assert_eq!(project_availability(&input, day(12))[0].status, RentalStatus::Active);
        assert_eq!(project_availability(&input, day(20))[0].status, RentalStatus::Completed);
    }

    #[test]
    fn inverted_range_does_not_panic() {
        let events = project_availability(&[booking("Bo", 15, 10)], day(12));
        assert_eq!(events[0].status, RentalStatus::Completed);
    }
}
