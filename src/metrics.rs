use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{CarWithStatus, ContractDetail},
    status::{CarStatus, RentalStatus, car_status},
};

const RETURN_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FleetSummary {
    pub total: usize,
    pub available: usize,
    pub busy: usize,
    /// Busy cars as a percentage of the fleet, 0 when the fleet is empty.
    pub utilization: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContractSummary {
    pub total: usize,
    pub confirmed: usize,
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub amount: i64,
    pub contracts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub cars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpcomingReturn {
    pub contract_id: Uuid,
    pub license_plate: String,
    pub customer_name: String,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardMetrics {
    pub generated_at: DateTime<Utc>,
    pub fleet: FleetSummary,
    pub contracts: ContractSummary,
    pub customers: usize,
    pub revenue_paid: i64,
    pub revenue_outstanding: i64,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub categories: Vec<CategoryCount>,
    pub upcoming_returns: Vec<UpcomingReturn>,
}

pub fn compute_dashboard(
    cars: &[CarWithStatus],
    contracts: &[ContractDetail],
    customers: usize,
    now: DateTime<Utc>,
) -> DashboardMetrics {
    DashboardMetrics {
        generated_at: now,
        fleet: fleet_summary(cars, contracts, now),
        contracts: contract_summary(contracts, now),
        customers,
        revenue_paid: revenue_with_payment_status(contracts, "paid"),
        revenue_outstanding: revenue_with_payment_status(contracts, "pending"),
        monthly_revenue: monthly_revenue(contracts),
        categories: category_counts(cars),
        upcoming_returns: upcoming_returns(contracts, now),
    }
}

/// Busy is evaluated against `contracts` at `now`, not the status the cars were read with.
fn fleet_summary(cars: &[CarWithStatus], contracts: &[ContractDetail], now: DateTime<Utc>) -> FleetSummary {
    let total = cars.len();
    let busy = cars
        .iter()
        .filter(|c| {
            let rentals = contracts.iter().map(|d| {
                (
                    d.car.license_plate.as_str(),
                    d.contract.start_date,
                    d.contract.end_date,
                )
            });
            car_status(&c.car.license_plate, rentals, now) == CarStatus::Busy
        })
        .count();
    let utilization = if total == 0 {
        0.0
    } else {
        (busy as f64 / total as f64 * 1000.0).round() / 10.0
    };
    FleetSummary {
        total,
        available: total - busy,
        busy,
        utilization,
    }
}

fn contract_summary(contracts: &[ContractDetail], now: DateTime<Utc>) -> ContractSummary {
    let mut summary = ContractSummary {
        total: contracts.len(),
        ..ContractSummary::default()
    };
    for detail in contracts {
        match detail.contract.status_at(now) {
            RentalStatus::Confirmed => summary.confirmed += 1,
            RentalStatus::Active => summary.active += 1,
            RentalStatus::Completed => summary.completed += 1,
        }
    }
    summary
}

fn revenue_with_payment_status(contracts: &[ContractDetail], payment_status: &str) -> i64 {
    contracts
        .iter()
        .filter(|d| d.contract.payment_status == payment_status)
        .map(|d| d.contract.total_amount)
        .sum()
}

fn monthly_revenue(contracts: &[ContractDetail]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<String, (i64, usize)> = BTreeMap::new();
    for detail in contracts.iter().filter(|d| d.contract.payment_status != "refunded") {
        let key = detail.contract.start_date.format("%Y-%m").to_string();
        let entry = months.entry(key).or_default();
        entry.0 += detail.contract.total_amount;
        entry.1 += 1;
    }
    months
        .into_iter()
        .map(|(month, (amount, contracts))| MonthlyRevenue {
            month,
            amount,
            contracts,
        })
        .collect()
}

fn category_counts(cars: &[CarWithStatus]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for c in cars {
        *counts.entry(c.car.category.as_str()).or_default() += 1;
    }
    let mut categories: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, cars)| CategoryCount {
            category: category.to_string(),
            cars,
        })
        .collect();
    categories.sort_by(|a, b| b.cars.cmp(&a.cars).then_with(|| a.category.cmp(&b.category)));
    categories
}

fn upcoming_returns(contracts: &[ContractDetail], now: DateTime<Utc>) -> Vec<UpcomingReturn> {
    let horizon = now + Duration::days(RETURN_WINDOW_DAYS);
    let mut returns: Vec<UpcomingReturn> = contracts
        .iter()
        .filter(|d| d.contract.status_at(now) == RentalStatus::Active)
        .filter(|d| d.contract.end_date <= horizon)
        .map(|d| UpcomingReturn {
            contract_id: d.contract.id,
            license_plate: d.car.license_plate.clone(),
            customer_name: d.customer.full_name(),
            end_date: d.contract.end_date,
        })
        .collect();
    returns.sort_by_key(|r| r.end_date);
    returns
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{Car, Contract, Customer};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn car(plate: &str, category: &str) -> CarWithStatus {
        CarWithStatus::new(
            Car {
                id: Uuid::new_v4(),
                license_plate: plate.into(),
                chassis_number: format!("CH-{plate}"),
                manufacturer: "Skoda".into(),
                model: "Octavia".into(),
                year: 2022,
                color: "grey".into(),
                category: category.into(),
                transmission: "automatic".into(),
                fuel_type: "diesel".into(),
                seats: 5,
                doors: 5,
                mileage: 30_000,
                engine_power: 150,
                price_per_day: 60,
                image_url: None,
                created_at: now(),
                updated_at: now(),
            },
            vec![],
            now(),
        )
    }

    fn contract(start: DateTime<Utc>, days: i64, amount: i64, payment_status: &str) -> ContractDetail {
        contract_on("X-1", start, days, amount, payment_status)
    }

    fn contract_on(
        plate: &str,
        start: DateTime<Utc>,
        days: i64,
        amount: i64,
        payment_status: &str,
    ) -> ContractDetail {
        let car = car(plate, "sedan").car;
        let customer = Customer {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            passport_number: "P1".into(),
            driver_license_number: "L1".into(),
            phone: "1".into(),
            email: None,
            address: None,
            country: None,
            passport_photo_url: None,
            license_photo_url: None,
            created_at: now(),
            updated_at: now(),
        };
        let contract = Contract {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            car_id: car.id,
            start_date: start,
            end_date: start + Duration::days(days),
            daily_rate: 60,
            total_amount: amount,
            deposit: None,
            payment_method: "card".into(),
            payment_status: payment_status.into(),
            notes: None,
            photo_url: None,
            created_at: now(),
            updated_at: now(),
        };
        ContractDetail::new(contract, customer, car, now())
    }

    #[test]
    fn empty_fleet_has_zero_utilization() {
        let metrics = compute_dashboard(&[], &[], 0, now());
        assert_eq!(metrics.fleet, FleetSummary::default());
        assert!(metrics.monthly_revenue.is_empty());
    }

    #[test]
    fn fleet_and_categories() {
        let cars = vec![car("A", "suv"), car("B", "compact"), car("C", "suv")];
        let rentals = vec![
            contract_on("A", now() - Duration::days(1), 3, 180, "paid"),
            contract_on("B", now() + Duration::days(2), 3, 180, "pending"),
        ];
        let metrics = compute_dashboard(&cars, &rentals, 4, now());
        assert_eq!(metrics.fleet.busy, 1);
        assert_eq!(metrics.fleet.available, 2);
        assert_eq!(metrics.fleet.utilization, 33.3);
        assert_eq!(metrics.categories[0].category, "suv");
        assert_eq!(metrics.categories[0].cars, 2);
        assert_eq!(metrics.customers, 4);
    }

    #[test]
    fn revenue_and_status_breakdown() {
        let contracts = vec![
            contract(now() - Duration::days(40), 3, 180, "paid"),
            contract(now() - Duration::days(1), 2, 120, "pending"),
            contract(now() + Duration::days(5), 2, 120, "refunded"),
        ];
        let metrics = compute_dashboard(&[], &contracts, 1, now());
        assert_eq!(metrics.contracts.completed, 1);
        assert_eq!(metrics.contracts.active, 1);
        assert_eq!(metrics.contracts.confirmed, 1);
        assert_eq!(metrics.revenue_paid, 180);
        assert_eq!(metrics.revenue_outstanding, 120);

        let months: Vec<&str> = metrics.monthly_revenue.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-03", "2024-05"]);
    }

    #[test]
    fn upcoming_returns_only_include_active_rentals_ending_soon() {
        let soon = contract(now() - Duration::days(1), 2, 100, "paid");
        let later = contract(now() - Duration::days(1), 10, 100, "paid");
        let metrics = compute_dashboard(&[], &[later, soon.clone()], 1, now());
        assert_eq!(metrics.upcoming_returns.len(), 1);
        assert_eq!(metrics.upcoming_returns[0].contract_id, soon.contract.id);
    }

    #[test]
    fn fleet_is_recomputed_for_a_later_now() {
        let rental = contract_on("A", now() - Duration::days(1), 2, 120, "paid");
        let mut snapshot = car("A", "suv");
        snapshot.status = CarStatus::Busy;
        let cars = vec![snapshot];

        let at_read = compute_dashboard(&cars, &[rental.clone()], 1, now());
        assert_eq!(at_read.fleet.busy, 1);

        let later = now() + Duration::days(30);
        let metrics = compute_dashboard(&cars, &[rental], 1, later);
        assert_eq!(metrics.fleet.busy, 0);
        assert_eq!(metrics.fleet.available, 1);
        assert_eq!(metrics.contracts.active, 0);

        // A stale busy flag with no contracts at all counts as available.
        assert_eq!(compute_dashboard(&cars, &[], 1, later).fleet.busy, 0);
    }
}
