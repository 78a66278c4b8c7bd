use car_rental_api::{
    availability::{BookingRecord, project_availability},
    models::{Car, CarWithStatus, RentalWindow},
    pipeline::{PipelineQuery, SortDirection, SortState, view_pipeline},
    status::{CarStatus, RentalStatus},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap()
}

fn car(manufacturer: &str, plate: &str, mileage: i32, rentals: Vec<RentalWindow>) -> CarWithStatus {
    let created = now() - Duration::days(30);
    CarWithStatus::new(
        Car {
            id: Uuid::new_v4(),
            license_plate: plate.to_string(),
            chassis_number: format!("CH-{plate}"),
            manufacturer: manufacturer.to_string(),
            model: "Base".to_string(),
            year: 2020,
            color: "White".to_string(),
            category: "sedan".to_string(),
            transmission: "automatic".to_string(),
            fuel_type: "petrol".to_string(),
            seats: 5,
            doors: 4,
            mileage,
            engine_power: 150,
            price_per_day: 40_000,
            image_url: None,
            created_at: created,
            updated_at: created,
        },
        rentals,
        now(),
    )
}

fn fleet(count: usize) -> Vec<CarWithStatus> {
    (0..count)
        .map(|i| {
            // Odd cars are out on a rental spanning `now`.
            let rentals = if i % 2 == 0 {
                Vec::new()
            } else {
                vec![RentalWindow {
                    start: now() - Duration::days(1),
                    end: now() + Duration::days(1),
                }]
            };
            car("Toyota", &format!("01T{i:03}AA"), (i as i32 + 1) * 1_000, rentals)
        })
        .collect()
}

fn booking(name: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> BookingRecord {
    BookingRecord {
        contract_id: Uuid::new_v4(),
        start,
        end,
        customer_name: name.to_string(),
        passport: None,
        phone: None,
        total_amount: None,
    }
}

#[test]
fn active_booking_is_titled_after_customer() {
    let start = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let events = project_availability(&[booking("Ana", start, end)], now());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, RentalStatus::Active);
    assert!(events[0].title.contains("Ana"));
}

#[test]
fn projection_keeps_length_and_order() {
    let bookings = vec![
        booking("Late", now() + Duration::days(5), now() + Duration::days(6)),
        booking("Past", now() - Duration::days(6), now() - Duration::days(5)),
        booking("Now", now() - Duration::hours(1), now() + Duration::hours(1)),
    ];
    let events = project_availability(&bookings, now());

    let ids: Vec<Uuid> = events.iter().map(|e| e.contract_id).collect();
    let expected: Vec<Uuid> = bookings.iter().map(|b| b.contract_id).collect();
    assert_eq!(ids, expected);
    let statuses: Vec<RentalStatus> = events.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![RentalStatus::Confirmed, RentalStatus::Completed, RentalStatus::Active]
    );
}

#[test]
fn empty_query_returns_everything() {
    let cars = fleet(7);
    let query = PipelineQuery {
        page_size: 100,
        ..PipelineQuery::default()
    };
    let view = view_pipeline(&cars, &query, now());
    assert_eq!(view.total_count, 7);
    assert_eq!(view.items, cars);
}

#[test]
fn twenty_five_records_make_three_pages() {
    let cars = fleet(25);
    let mut query = PipelineQuery {
        page_size: 10,
        ..PipelineQuery::default()
    };

    let first = view_pipeline(&cars, &query, now());
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_pages, 3);

    query.page = 3;
    let last = view_pipeline(&cars, &query, now());
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.items[0], cars[20]);
}

#[test]
fn search_is_case_insensitive_substring() {
    let cars = vec![
        car("Toyota", "01A001AA", 1_000, Vec::new()),
        car("Ford", "01A002AA", 2_000, Vec::new()),
    ];

    let query = PipelineQuery {
        search: "for".into(),
        ..PipelineQuery::default()
    };
    let view = view_pipeline(&cars, &query, now());
    assert_eq!(view.items, vec![cars[1].clone()]);

    let query = PipelineQuery {
        search: "toyota".into(),
        ..PipelineQuery::default()
    };
    let view = view_pipeline(&cars, &query, now());
    assert_eq!(view.items, vec![cars[0].clone()]);
}

#[test]
fn status_filter_narrows_before_paging() {
    let cars = fleet(25);
    let query = PipelineQuery {
        status_filter: Some(CarStatus::Busy),
        ..PipelineQuery::default()
    };
    let view = view_pipeline(&cars, &query, now());
    assert_eq!(view.total_count, 12);
    assert!(view.items.iter().all(|c| c.status == CarStatus::Busy));

    // Once the rentals are over, nothing is busy any more.
    let view = view_pipeline(&cars, &query, now() + Duration::days(7));
    assert_eq!(view.total_count, 0);
}

#[test]
fn descending_reverses_ascending_for_distinct_values() {
    let mut cars = fleet(9);
    cars.reverse();
    let mut query = PipelineQuery {
        sort: SortState::by("mileage", SortDirection::Asc),
        page_size: 100,
        ..PipelineQuery::default()
    };

    let asc = view_pipeline(&cars, &query, now()).items;
    query.sort = SortState::by("mileage", SortDirection::Desc);
    let mut desc = view_pipeline(&cars, &query, now()).items;
    desc.reverse();

    assert_eq!(asc, desc);
    assert!(asc.windows(2).all(|w| w[0].car.mileage < w[1].car.mileage));
}

#[test]
fn repeated_calls_are_identical_and_leave_input_alone() {
    let cars = fleet(25);
    let before = cars.clone();
    let query = PipelineQuery {
        search: "01T".into(),
        sort: SortState::by("mileage", SortDirection::Desc),
        page: 2,
        ..PipelineQuery::default()
    };

    let first = view_pipeline(&cars, &query, now());
    let second = view_pipeline(&cars, &query, now());
    assert_eq!(first, second);
    assert_eq!(cars, before);
}
