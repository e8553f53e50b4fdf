//! Page state containers.
//!
//! A page owns what it displays (`&mut self`, no locks). Loading replaces the
//! data wholesale; a failure leaves the previous data in place, records the
//! inline message and waits for an explicit retry. Nothing retries on its own.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use petalbox_core::filter::{Searchable, filter_by_query, filter_by_status, parse_status_filter};
use petalbox_core::report::{ExportError, ReportExport};
use petalbox_core::stats::StatusSummary;
use petalbox_core::{DashboardStats, HasStatus, NormalizedStatus as _, Report, ReportPeriod};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::ApiError;

/// Errors from writing a report export.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("No report is loaded")]
    NothingLoaded,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// =============================================================================
// List pages
// =============================================================================

/// A searchable, status-filterable list (customers, orders, deliveries).
#[derive(Debug, Clone)]
pub struct ListPage<T: HasStatus> {
    items: Vec<T>,
    query: String,
    status_filter: Option<T::Status>,
    loading: bool,
    error: Option<String>,
}

impl<T: HasStatus> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            query: String::new(),
            status_filter: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> ListPage<T>
where
    T: HasStatus + Searchable + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything loaded, unfiltered.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    #[must_use]
    pub fn status_filter(&self) -> Option<T::Status> {
        self.status_filter
    }

    pub fn set_status_filter(&mut self, status: Option<T::Status>) {
        self.status_filter = status;
    }

    /// Set the filter from a select-box value; `"all"` clears it.
    pub fn select_status(&mut self, raw: &str) {
        self.status_filter = parse_status_filter(raw);
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The inline error message, if the last load or mutation failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Await `fetch` and replace the items with its result.
    ///
    /// On failure the previous items stay and the error message is recorded.
    /// Returns whether the load succeeded.
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        self.loading = true;
        self.error = None;

        let ok = match fetch.await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "List loaded");
                self.items = items;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "List load failed");
                self.error = Some(e.user_message());
                false
            }
        };

        self.loading = false;
        ok
    }

    /// Explicit reload after a failure.
    pub async fn retry<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        self.load(fetch).await
    }

    /// Items after the status filter, then the search query.
    #[must_use]
    pub fn visible(&self) -> Vec<T> {
        let by_status = filter_by_status(&self.items, self.status_filter);
        filter_by_query(&by_status, &self.query)
    }

    /// Header statistics over the visible items.
    pub fn summary(&self, amount_of: impl Fn(&T) -> Decimal) -> StatusSummary<T::Status> {
        StatusSummary::compute(&self.visible(), amount_of)
    }

    /// Change one item's status optimistically.
    ///
    /// The new status shows immediately; `commit` is then awaited, and on
    /// failure the previous status is restored and the error recorded.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` without awaiting `commit` if no item has `id`, or
    /// the error `commit` returned.
    pub async fn update_status<F>(
        &mut self,
        id: &str,
        status: T::Status,
        commit: F,
    ) -> Result<(), ApiError>
    where
        F: Future<Output = Result<(), ApiError>>,
    {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            let err = ApiError::NotFound(id.to_string());
            self.error = Some(err.user_message());
            return Err(err);
        };
        let previous = item.status();
        item.set_status(status);
        self.error = None;

        match commit.await {
            Ok(()) => {
                tracing::info!(id, from = %previous.as_str(), to = %status.as_str(), "Status updated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Status update rejected; rolling back");
                if let Some(item) = self.items.iter_mut().find(|item| item.id() == id) {
                    item.set_status(previous);
                }
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

// =============================================================================
// Single-aggregate pages
// =============================================================================

/// One fetched aggregate with the same loading/error/retry shape as a list.
#[derive(Debug, Clone)]
pub struct AggregatePage<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for AggregatePage<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> AggregatePage<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Await `fetch` and replace the aggregate with its result.
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.loading = true;
        self.error = None;

        let ok = match fetch.await {
            Ok(data) => {
                self.data = Some(data);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Page load failed");
                self.error = Some(e.user_message());
                false
            }
        };

        self.loading = false;
        ok
    }

    /// Explicit reload after a failure.
    pub async fn retry<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.load(fetch).await
    }
}

/// Admin or staff dashboard.
pub type DashboardPage = AggregatePage<DashboardStats>;

/// The reports page: a period selector, the report, and export.
#[derive(Debug, Clone, Default)]
pub struct ReportPage {
    period: ReportPeriod,
    /// Period the displayed report was fetched for.
    shown: Option<ReportPeriod>,
    page: AggregatePage<Report>,
}

impl ReportPage {
    #[must_use]
    pub fn new(period: ReportPeriod) -> Self {
        Self {
            period,
            shown: None,
            page: AggregatePage::new(),
        }
    }

    #[must_use]
    pub const fn period(&self) -> ReportPeriod {
        self.period
    }

    /// Change the period. The caller reloads with the new period.
    pub const fn set_period(&mut self, period: ReportPeriod) {
        self.period = period;
    }

    /// Period of the displayed report, which lags [`Self::period`] until a
    /// reload succeeds.
    #[must_use]
    pub const fn shown_period(&self) -> Option<ReportPeriod> {
        self.shown
    }

    #[must_use]
    pub const fn report(&self) -> Option<&Report> {
        self.page.data()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.page.is_loading()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.page.error()
    }

    /// Await `fetch` (built for [`Self::period`]) and show its report.
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<Report, ApiError>>,
    {
        let period = self.period;
        let loaded = self.page.load(fetch).await;
        if loaded {
            self.shown = Some(period);
        }
        loaded
    }

    /// The export artifact for the displayed report, stamped `at`.
    ///
    /// # Errors
    ///
    /// Returns `NothingLoaded` if no report has been loaded.
    pub fn export(&self, at: DateTime<Utc>) -> Result<ReportExport, PageError> {
        let (Some(period), Some(report)) = (self.shown, self.report()) else {
            return Err(PageError::NothingLoaded);
        };
        Ok(ReportExport::new(period, report.clone(), at))
    }

    /// Write the export artifact into `dir` and return its path.
    ///
    /// # Errors
    ///
    /// Returns error if nothing is loaded or the file cannot be written.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, PageError> {
        self.export_at(dir, Utc::now())
    }

    /// [`Self::export_to`] with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns error if nothing is loaded or the file cannot be written.
    pub fn export_at(&self, dir: &Path, at: DateTime<Utc>) -> Result<PathBuf, PageError> {
        let export = self.export(at)?;
        let path = dir.join(export.filename());
        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, export.to_json()?)?;
        tracing::info!(path = %path.display(), period = %export.period, "Report exported");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use petalbox_core::report::parse_export;
    use petalbox_core::{DeliveryStatus, DeliveryView, normalize_delivery};
    use serde_json::json;

    use super::*;

    fn deliveries() -> Vec<DeliveryView> {
        [
            json!({"id": "d1", "customerName": "Lan", "status": "pending"}),
            json!({"id": "d2", "customerName": "Minh", "status": "out_for_delivery"}),
            json!({"id": "d3", "customerName": "Lan Anh", "status": "delivered"}),
        ]
        .iter()
        .map(normalize_delivery)
        .collect()
    }

    #[tokio::test]
    async fn test_load_replaces_items_and_failure_keeps_them() {
        let mut page = ListPage::new();
        assert!(page.load(async { Ok(deliveries()) }).await);
        assert_eq!(page.items().len(), 3);
        assert!(page.error().is_none());

        assert!(!page.load(async { Err(ApiError::Timeout) }).await);
        assert_eq!(page.items().len(), 3);
        assert!(page.error().is_some());
        assert!(!page.is_loading());

        assert!(page.retry(async { Ok(deliveries()[..1].to_vec()) }).await);
        assert_eq!(page.items().len(), 1);
        assert!(page.error().is_none());
    }

    #[tokio::test]
    async fn test_visible_applies_status_then_query() {
        let mut page = ListPage::new();
        page.load(async { Ok(deliveries()) }).await;

        page.set_query("lan");
        assert_eq!(page.visible().len(), 2);

        page.select_status("delivered");
        let visible = page.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "d3");

        let summary = page.summary(|_| Decimal::ZERO);
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.count(DeliveryStatus::Completed), 1);

        page.select_status("all");
        assert_eq!(page.status_filter(), None);
    }

    #[tokio::test]
    async fn test_update_status_commits() {
        let mut page = ListPage::new();
        page.load(async { Ok(deliveries()) }).await;

        page.update_status("d1", DeliveryStatus::InProgress, async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(page.items()[0].status, DeliveryStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_status_rolls_back_on_failure() {
        let mut page = ListPage::new();
        page.load(async { Ok(deliveries()) }).await;

        let result = page
            .update_status("d1", DeliveryStatus::Cancelled, async {
                Err(ApiError::Status {
                    status: 422,
                    message: "Invalid transition".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(page.items()[0].status, DeliveryStatus::Pending);
        assert_eq!(page.error(), Some("Invalid transition"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_does_not_commit() {
        let mut page: ListPage<DeliveryView> = ListPage::new();
        let ran = std::cell::Cell::new(false);
        let result = page
            .update_status("nope", DeliveryStatus::Completed, async {
                ran.set(true);
                Ok::<(), ApiError>(())
            })
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(!ran.get());
    }

    #[tokio::test]
    async fn test_report_export_round_trip() {
        let mut page = ReportPage::new(ReportPeriod::Week);
        let at = Utc.with_ymd_and_hms(2024, 5, 8, 14, 30, 0).unwrap();
        assert!(matches!(page.export(at), Err(PageError::NothingLoaded)));

        let report = petalbox_core::report::normalize_report(&json!({
            "deliveries": {"total": 3, "completed": 2}
        }));
        page.load(async { Ok(report.clone()) }).await;

        let dir = std::env::temp_dir().join(format!("petalbox-export-{}", uuid::Uuid::new_v4()));
        let path = page.export_at(&dir, at).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, "petalbox-report-week-20240508-143000.json");

        let parsed = parse_export(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.report, report);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_export_labels_the_period_that_was_loaded() {
        let mut page = ReportPage::new(ReportPeriod::Week);
        let at = Utc.with_ymd_and_hms(2024, 5, 8, 14, 30, 0).unwrap();
        assert!(page.load(async { Ok(Report::default()) }).await);

        page.set_period(ReportPeriod::Year);
        assert_eq!(page.period(), ReportPeriod::Year);
        assert_eq!(page.shown_period(), Some(ReportPeriod::Week));
        assert_eq!(page.export(at).unwrap().period, ReportPeriod::Week);

        assert!(!page.load(async { Err(ApiError::Timeout) }).await);
        assert_eq!(page.export(at).unwrap().period, ReportPeriod::Week);

        assert!(page.load(async { Ok(Report::default()) }).await);
        assert_eq!(page.export(at).unwrap().period, ReportPeriod::Year);
    }
}
