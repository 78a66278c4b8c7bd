use std::borrow::Cow;

use chrono::{DateTime, Utc};

use super::{SortValue, TableRecord};
use crate::{
    models::{CarWithStatus, ContractDetail, Customer},
    status::{CarStatus, RentalStatus},
};

impl TableRecord for CarWithStatus {
    type Status = CarStatus;
    const SORT_KEYS: &'static [&'static str] = &[
        "manufacturer",
        "model",
        "license_plate",
        "year",
        "category",
        "mileage",
        "price_per_day",
        "created_at",
    ];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.car.manufacturer.as_str().into(),
            self.car.model.as_str().into(),
            self.car.license_plate.as_str().into(),
        ]
    }

    fn status_at(&self, now: DateTime<Utc>) -> CarStatus {
        self.derived_status(now)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        let car = &self.car;
        let value: SortValue = match key {
            "manufacturer" => car.manufacturer.as_str().into(),
            "model" => car.model.as_str().into(),
            "license_plate" => car.license_plate.as_str().into(),
            "year" => car.year.into(),
            "category" => car.category.as_str().into(),
            "mileage" => car.mileage.into(),
            "price_per_day" => car.price_per_day.into(),
            "created_at" => car.created_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

impl TableRecord for ContractDetail {
    type Status = RentalStatus;
    const SORT_KEYS: &'static [&'static str] = &[
        "customer",
        "car",
        "license_plate",
        "start_date",
        "end_date",
        "total_amount",
        "created_at",
    ];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            self.customer.full_name().into(),
            self.customer.passport_number.as_str().into(),
            self.car.model.as_str().into(),
            self.car.license_plate.as_str().into(),
        ]
    }

    fn status_at(&self, now: DateTime<Utc>) -> RentalStatus {
        self.contract.status_at(now)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        let value: SortValue = match key {
            "customer" => self.customer.full_name().into(),
            "car" => format!("{} {}", self.car.manufacturer, self.car.model).into(),
            "license_plate" => self.car.license_plate.as_str().into(),
            "start_date" => self.contract.start_date.into(),
            "end_date" => self.contract.end_date.into(),
            "total_amount" => self.contract.total_amount.into(),
            "created_at" => self.contract.created_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

impl TableRecord for Customer {
    type Status = ();
    const SORT_KEYS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "country",
        "created_at",
    ];

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields: Vec<Cow<'_, str>> = vec![
            self.full_name().into(),
            self.passport_number.as_str().into(),
            self.driver_license_number.as_str().into(),
            self.phone.as_str().into(),
        ];
        if let Some(email) = &self.email {
            fields.push(email.as_str().into());
        }
        fields
    }

    fn status_at(&self, _now: DateTime<Utc>) {}

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "first_name" => Some(self.first_name.as_str().into()),
            "last_name" => Some(self.last_name.as_str().into()),
            "country" => self.country.as_deref().map(SortValue::from),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}
