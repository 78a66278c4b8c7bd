//! Filter, sort and paginate an in-memory record list for a table view.
//!
//! Everything here is a pure function of the input slice and the query; the
//! slice is never reordered in place.

use std::{borrow::Cow, cmp::Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

mod records;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The single active sort column of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// Clicking the active column flips it; clicking another starts ascending.
    pub fn toggle(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Asc;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Time(_) => 1,
            SortValue::Text(_) => 2,
        }
    }
}

impl From<i32> for SortValue {
    fn from(value: i32) -> Self {
        SortValue::Number(f64::from(value))
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Number(value as f64)
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(value: DateTime<Utc>) -> Self {
        SortValue::Time(value)
    }
}

/// A row type that can be shown in a filterable, sortable table.
pub trait TableRecord {
    type Status: Copy + PartialEq;

    /// Column keys accepted by [`TableRecord::sort_value`].
    const SORT_KEYS: &'static [&'static str];

    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    fn status_at(&self, now: DateTime<Utc>) -> Self::Status;

    fn sort_value(&self, key: &str) -> Option<SortValue>;

    fn matches_search(&self, needle: &str) -> bool {
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineQuery<S> {
    pub search: String,
    /// `None` keeps every status.
    pub status_filter: Option<S>,
    pub sort: SortState,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl<S> Default for PipelineQuery<S> {
    fn default() -> Self {
        Self {
            search: String::new(),
            status_filter: None,
            sort: SortState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Filter by search term and derived status, sort on one key, then slice
/// out the requested page.
///
/// Pages outside `[1, total_pages]` are clamped to the nearest valid page.
/// Unknown sort keys leave the filtered records in input order.
pub fn view_pipeline<T>(
    records: &[T],
    query: &PipelineQuery<T::Status>,
    now: DateTime<Utc>,
) -> PageView<T>
where
    T: TableRecord + Clone,
{
    let needle = query.search.trim().to_lowercase();

    let filtered: Vec<&T> = records
        .iter()
        .filter(|record| needle.is_empty() || record.matches_search(&needle))
        .filter(|record| match query.status_filter {
            Some(wanted) => record.status_at(now) == wanted,
            None => true,
        })
        .collect();

    let sorted = sort_records(filtered, &query.sort);

    let total_count = sorted.len();
    let page_size = query.page_size.max(1);
    let total_pages = total_count.div_ceil(page_size);
    let page = query.page.clamp(1, total_pages.max(1));
    let items = sorted
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    PageView {
        items,
        page,
        page_size,
        total_pages,
        total_count,
    }
}

fn sort_records<'a, T: TableRecord>(records: Vec<&'a T>, sort: &SortState) -> Vec<&'a T> {
    let Some(key) = sort.key.as_deref() else {
        return records;
    };
    if !T::SORT_KEYS.contains(&key) {
        tracing::debug!(key, "ignoring unknown sort key");
        return records;
    }

    let mut keyed: Vec<(Option<SortValue>, &T)> = records
        .into_iter()
        .map(|record| (record.sort_value(key), record))
        .collect();

    // `sort_by` is stable, so ties keep their filtered order in both directions.
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = match (a, b) {
            (Some(a), Some(b)) => a.compare(b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        brand: &'static str,
        price: i64,
        open: bool,
    }

    impl TableRecord for Row {
        type Status = bool;
        const SORT_KEYS: &'static [&'static str] = &["name", "price"];

        fn search_fields(&self) -> Vec<Cow<'_, str>> {
            vec![self.name.into(), self.brand.into()]
        }

        fn status_at(&self, _now: DateTime<Utc>) -> bool {
            self.open
        }

        fn sort_value(&self, key: &str) -> Option<SortValue> {
            match key {
                "name" => Some(self.name.into()),
                "price" => Some(self.price.into()),
                _ => None,
            }
        }
    }

    fn row(name: &'static str, brand: &'static str, price: i64, open: bool) -> Row {
        Row {
            name,
            brand,
            price,
            open,
        }
    }

    fn rows(n: usize) -> Vec<Row> {
        (0..n).map(|i| row("car", "brand", i as i64, i % 2 == 0)).collect()
    }

    fn names(view: &PageView<Row>) -> Vec<&'static str> {
        view.items.iter().map(|r| r.name).collect()
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let mut sort = SortState::default();
        sort.toggle("price");
        assert_eq!(sort, SortState::by("price", SortDirection::Asc));
        sort.toggle("price");
        assert_eq!(sort, SortState::by("price", SortDirection::Desc));
        sort.toggle("name");
        assert_eq!(sort, SortState::by("name", SortDirection::Asc));
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let data = vec![row("Corolla", "Toyota", 1, true), row("Focus", "Ford", 2, true)];
        let query = PipelineQuery {
            search: "  TOY ".into(),
            ..PipelineQuery::default()
        };
        assert_eq!(names(&view_pipeline(&data, &query, Utc::now())), vec!["Corolla"]);
    }

    #[test]
    fn status_filter_uses_derived_status() {
        let query = PipelineQuery {
            status_filter: Some(false),
            page_size: 100,
            ..PipelineQuery::default()
        };
        let view = view_pipeline(&rows(6), &query, Utc::now());
        assert_eq!(view.total_count, 3);
        assert!(view.items.iter().all(|r| !r.open));
    }

    #[test]
    fn text_sort_ignores_case() {
        let data = vec![
            row("beta", "", 0, true),
            row("Alpha", "", 0, true),
            row("gamma", "", 0, true),
        ];
        let query = PipelineQuery {
            sort: SortState::by("name", SortDirection::Asc),
            ..PipelineQuery::default()
        };
        assert_eq!(
            names(&view_pipeline(&data, &query, Utc::now())),
            vec!["Alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let data = vec![
            row("first", "", 5, true),
            row("second", "", 5, true),
            row("cheap", "", 1, true),
        ];
        let mut query = PipelineQuery {
            sort: SortState::by("price", SortDirection::Asc),
            ..PipelineQuery::default()
        };
        let now = Utc::now();
        assert_eq!(names(&view_pipeline(&data, &query, now)), vec!["cheap", "first", "second"]);
        query.sort.direction = SortDirection::Desc;
        assert_eq!(names(&view_pipeline(&data, &query, now)), vec!["first", "second", "cheap"]);
    }

    #[test]
    fn unknown_sort_key_keeps_input_order() {
        let data = vec![row("b", "", 2, true), row("a", "", 1, true)];
        let query = PipelineQuery {
            sort: SortState::by("horsepower", SortDirection::Desc),
            ..PipelineQuery::default()
        };
        assert_eq!(names(&view_pipeline(&data, &query, Utc::now())), vec!["b", "a"]);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let data = rows(25);
        let now = Utc::now();
        let mut query = PipelineQuery::<bool> {
            page: 9,
            ..PipelineQuery::default()
        };
        let view = view_pipeline(&data, &query, now);
        assert_eq!(view.page, 3);
        assert_eq!(view.items.len(), 5);

        query.page = 0;
        let view = view_pipeline(&data, &query, now);
        assert_eq!(view.page, 1);
        assert_eq!(view.items.len(), 10);
    }

    #[test]
    fn empty_input_yields_first_empty_page() {
        let query = PipelineQuery::<bool> {
            page: 4,
            page_size: 0,
            ..PipelineQuery::default()
        };
        let view = view_pipeline::<Row>(&[], &query, Utc::now());
        assert_eq!(view.page, 1);
        assert_eq!(view.page_size, 1);
        assert_eq!(view.total_pages, 0);
        assert!(view.items.is_empty());
    }
}
