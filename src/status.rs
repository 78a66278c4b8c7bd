use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a rental, computed from its date range and the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Confirmed,
    Active,
    Completed,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
        }
    }
}

/// Whether a car can be rented right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CarStatus {
    Available,
    Busy,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Busy => "busy",
        }
    }
}

/// Classify a rental window against `now`.
///
/// An inverted window (`start > end`) can never become active and is
/// reported as completed.
pub fn derive_status(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> RentalStatus {
    if start > end {
        return RentalStatus::Completed;
    }
    if now < start {
        RentalStatus::Confirmed
    } else if now <= end {
        RentalStatus::Active
    } else {
        RentalStatus::Completed
    }
}

/// A car is busy while any contract on its plate is active.
pub fn car_status<'a, I>(license_plate: &str, rentals: I, now: DateTime<Utc>) -> CarStatus
where
    I: IntoIterator<Item = (&'a str, DateTime<Utc>, DateTime<Utc>)>,
{
    let busy = rentals.into_iter().any(|(plate, start, end)| {
        plate.eq_ignore_ascii_case(license_plate)
            && derive_status(start, end, now) == RentalStatus::Active
    });
    if busy {
        CarStatus::Busy
    } else {
        CarStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn classifies_against_window() {
        assert_eq!(derive_status(at(10), at(15), at(5)), RentalStatus::Confirmed);
        assert_eq!(derive_status(at(10), at(15), at(12)), RentalStatus::Active);
        assert_eq!(derive_status(at(10), at(15), at(20)), RentalStatus::Completed);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        assert_eq!(derive_status(at(10), at(15), at(10)), RentalStatus::Active);
        assert_eq!(derive_status(at(10), at(15), at(15)), RentalStatus::Active);
    }

    #[test]
    fn inverted_window_is_completed() {
        assert_eq!(derive_status(at(15), at(10), at(1)), RentalStatus::Completed);
        assert_eq!(derive_status(at(15), at(10), at(12)), RentalStatus::Completed);
        assert_eq!(derive_status(at(15), at(10), at(20)), RentalStatus::Completed);
    }

    #[test]
    fn car_is_busy_only_with_active_contract() {
        let rentals = vec![
            ("AB-123", at(1), at(3)),
            ("CD-456", at(10), at(15)),
        ];
        let now = at(12);
        assert_eq!(
            car_status("AB-123", rentals.iter().copied(), now),
            CarStatus::Available
        );
        assert_eq!(
            car_status("cd-456", rentals.iter().copied(), now),
            CarStatus::Busy
        );
        assert_eq!(car_status("ZZ-000", Vec::new(), now), CarStatus::Available);
    }
}
