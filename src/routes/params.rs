use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::pipeline::{PipelineQuery, SortDirection, SortState};

const MAX_PER_PAGE: i64 = 100;

/// Query string shared by the table endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery<S = ()> {
    pub q: Option<String>,
    pub status: Option<S>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortDirection>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            q: None,
            status: None,
            sort_by: None,
            sort_order: None,
            page: None,
            per_page: None,
        }
    }
}

impl<S> ListQuery<S> {
    /// Page numbers stay unbounded above here; the pipeline clamps them to the last page.
    pub fn into_pipeline(self, default_per_page: usize) -> PipelineQuery<S> {
        let page = self.page.unwrap_or(1).max(1) as usize;
        let page_size = self
            .per_page
            .unwrap_or(default_per_page as i64)
            .clamp(1, MAX_PER_PAGE) as usize;
        let sort = match self.sort_by.filter(|k| !k.trim().is_empty()) {
            Some(key) => SortState::by(key.trim(), self.sort_order.unwrap_or_default()),
            None => SortState::default(),
        };
        PipelineQuery {
            search: self.q.unwrap_or_default(),
            status_filter: self.status,
            sort,
            page,
            page_size,
        }
    }
}

/// Evaluate derived statuses at `at` instead of the current time.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AtQuery {
    pub at: Option<DateTime<Utc>>,
}

impl AtQuery {
    pub fn now(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::RentalStatus;

    #[test]
    fn defaults_to_first_page() {
        let query = ListQuery::<RentalStatus>::default().into_pipeline(10);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.sort, SortState::default());
        assert!(query.status_filter.is_none());
    }

    #[test]
    fn clamps_page_and_size() {
        let query = ListQuery::<()> {
            page: Some(-3),
            per_page: Some(10_000),
            ..ListQuery::default()
        }
        .into_pipeline(10);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 100);
    }

    #[test]
    fn blank_sort_key_means_unsorted() {
        let query = ListQuery::<()> {
            sort_by: Some("  ".into()),
            sort_order: Some(SortDirection::Desc),
            ..ListQuery::default()
        }
        .into_pipeline(10);
        assert!(query.sort.key.is_none());
    }

    #[test]
    fn parses_status_filter_and_sort() {
        let query: ListQuery<RentalStatus> =
            serde_json::from_value(serde_json::json!({ "status": "active", "sort_by": "total_amount" }))
                .unwrap();
        let pipeline = query.into_pipeline(10);
        assert_eq!(pipeline.status_filter, Some(RentalStatus::Active));
        assert_eq!(pipeline.sort, SortState::by("total_amount", SortDirection::Asc));
    }
}
