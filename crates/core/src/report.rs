//! Reporting aggregate: normalization from the reports endpoint and export.
//!
//! The backend returns nested counts, a daily series, a status breakdown
//! and a driver leaderboard under a variety of field names. [`normalize_report`]
//! folds all of that into [`Report`]; missing percentages in the breakdown
//! and missing trend directions are derived locally.
//!
//! Export is pure formatting: [`ReportExport`] pairs the displayed report with
//! the selected period and a timestamp and serializes to pretty JSON.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::{PLACEHOLDER, Payload};

/// Errors from producing or reading an export artifact.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The artifact could not be (de)serialized.
    #[error("report serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

// =============================================================================
// Period
// =============================================================================

/// Reporting window selected on the reports page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    #[default]
    Week,
    Month,
    Quarter,
    Year,
}

impl ReportPeriod {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "today" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "quarter" | "quarterly" => Ok(Self::Quarter),
            "year" | "yearly" | "annual" => Ok(Self::Year),
            other => Err(format!("invalid report period: {other}")),
        }
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Period-over-period direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    /// Direction implied by a percentage change.
    #[must_use]
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Up
        } else if change < 0.0 {
            Self::Down
        } else {
            Self::Stable
        }
    }

    fn from_backend(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" | "increase" | "rising" => Some(Self::Up),
            "down" | "decrease" | "falling" => Some(Self::Down),
            "stable" | "flat" | "same" | "neutral" => Some(Self::Stable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeliveryCounts {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub cancelled: u32,
    /// Percent change against the previous period.
    pub change: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OrderCounts {
    pub total: u32,
    pub pending: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub revenue: Decimal,
    pub change: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CustomerCounts {
    pub total: u32,
    pub new: u32,
    pub active: u32,
    pub change: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Performance {
    /// Minutes from dispatch to hand-over.
    pub avg_delivery_time: f64,
    /// Percent.
    pub satisfaction_rate: f64,
    /// Percent.
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: String,
    pub deliveries: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub label: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStat {
    pub name: String,
    pub deliveries: u32,
    pub on_time_rate: f64,
    pub rating: f64,
}

/// Everything the reports page displays for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Report {
    pub deliveries: DeliveryCounts,
    pub orders: OrderCounts,
    pub customers: CustomerCounts,
    pub performance: Performance,
    pub daily: Vec<DailyPoint>,
    pub status_breakdown: Vec<StatusShare>,
    pub top_drivers: Vec<DriverStat>,
}

// =============================================================================
// Normalization
// =============================================================================

const DELIVERIES: &[&str] = &["deliveries", "deliveryStats", "delivery"];
const ORDERS: &[&str] = &["orders", "orderStats", "order"];
const CUSTOMERS: &[&str] = &["customers", "customerStats", "customer"];
const PERFORMANCE: &[&str] = &["performance", "metrics", "kpis"];
const DAILY: &[&str] = &["daily", "dailyStats", "dailyData", "chart", "timeline"];
const BREAKDOWN: &[&str] = &["statusBreakdown", "status_breakdown", "statuses", "byStatus"];
const DRIVERS: &[&str] = &["topDrivers", "top_drivers", "drivers", "leaderboard"];

const TOTAL: &[&str] = &["total", "count", "totalCount"];
const PENDING: &[&str] = &["pending"];
const IN_PROGRESS: &[&str] = &["inProgress", "in_progress", "processing", "delivering"];
const COMPLETED: &[&str] = &["completed", "delivered", "done"];
const CANCELLED: &[&str] = &["cancelled", "canceled", "failed"];
const CHANGE: &[&str] = &["change", "changePercent", "growth", "percentChange"];
const TREND: &[&str] = &["trend", "direction"];

/// Build a [`Report`] from a reports payload (bare or wrapped in `data`/`report`).
#[must_use]
pub fn normalize_report(raw: &Value) -> Report {
    let root = Payload::new(raw);
    let p = root.object(&["data", "report"]).unwrap_or(root);
    let empty = Value::Null;
    let section = |paths: &[&str]| p.object(paths).unwrap_or(Payload::new(&empty));

    let d = section(DELIVERIES);
    let deliveries = {
        let change = d.float(CHANGE).unwrap_or(0.0);
        DeliveryCounts {
            total: d.count(TOTAL).unwrap_or(0),
            pending: d.count(PENDING).unwrap_or(0),
            in_progress: d.count(IN_PROGRESS).unwrap_or(0),
            completed: d.count(COMPLETED).unwrap_or(0),
            cancelled: d.count(CANCELLED).unwrap_or(0),
            change,
            trend: trend_of(&d, change),
        }
    };

    let o = section(ORDERS);
    let orders = {
        let change = o.float(CHANGE).unwrap_or(0.0);
        OrderCounts {
            total: o.count(TOTAL).unwrap_or(0),
            pending: o.count(PENDING).unwrap_or(0),
            completed: o.count(COMPLETED).unwrap_or(0),
            cancelled: o.count(CANCELLED).unwrap_or(0),
            revenue: o
                .decimal(&["revenue", "totalRevenue", "amount"])
                .unwrap_or(Decimal::ZERO),
            change,
            trend: trend_of(&o, change),
        }
    };

    let c = section(CUSTOMERS);
    let customers = {
        let change = c.float(CHANGE).unwrap_or(0.0);
        CustomerCounts {
            total: c.count(TOTAL).unwrap_or(0),
            new: c.count(&["new", "newCustomers", "new_customers"]).unwrap_or(0),
            active: c.count(&["active", "activeCustomers"]).unwrap_or(0),
            change,
            trend: trend_of(&c, change),
        }
    };

    let perf = section(PERFORMANCE);
    let performance = Performance {
        avg_delivery_time: perf
            .float(&["avgDeliveryTime", "averageDeliveryTime", "avg_delivery_time"])
            .unwrap_or(0.0),
        satisfaction_rate: perf
            .float(&["satisfactionRate", "satisfaction", "satisfaction_rate"])
            .unwrap_or(0.0),
        on_time_rate: perf
            .float(&["onTimeRate", "onTimeDelivery", "on_time_rate"])
            .unwrap_or(0.0),
    };

    let daily = p
        .array(DAILY)
        .unwrap_or_default()
        .iter()
        .map(|v| {
            let point = Payload::new(v);
            DailyPoint {
                day: point.text_or_placeholder(&["day", "date", "label", "name"]),
                deliveries: point
                    .count(&["deliveries", "total", "count", "value"])
                    .unwrap_or(0),
                completed: point.count(&["completed", "delivered"]).unwrap_or(0),
            }
        })
        .collect();

    let breakdown = p.array(BREAKDOWN).unwrap_or_default();
    let status_breakdown = status_shares(breakdown);

    let top_drivers = p
        .array(DRIVERS)
        .unwrap_or_default()
        .iter()
        .map(|v| {
            let driver = Payload::new(v);
            DriverStat {
                name: driver.text_or_placeholder(&["name", "driverName", "driver.name"]),
                deliveries: driver
                    .count(&["deliveries", "totalDeliveries", "completed", "count"])
                    .unwrap_or(0),
                on_time_rate: driver.float(&["onTimeRate", "on_time_rate"]).unwrap_or(0.0),
                rating: driver.float(&["rating", "avgRating"]).unwrap_or(0.0),
            }
        })
        .collect();

    Report {
        deliveries,
        orders,
        customers,
        performance,
        daily,
        status_breakdown,
        top_drivers,
    }
}

fn trend_of(section: &Payload<'_>, change: f64) -> Trend {
    section
        .text(TREND)
        .and_then(|t| Trend::from_backend(&t))
        .unwrap_or_else(|| Trend::from_change(change))
}

/// Normalize the breakdown list, computing missing percentages from counts.
fn status_shares(items: &[Value]) -> Vec<StatusShare> {
    let rows: Vec<(String, u32, Option<f64>)> = items
        .iter()
        .map(|v| {
            let row = Payload::new(v);
            (
                row.text(&["label", "status", "name"])
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                row.count(&["count", "value", "total"]).unwrap_or(0),
                row.float(&["percentage", "percent", "pct"]),
            )
        })
        .collect();

    let total: u64 = rows.iter().map(|(_, count, _)| u64::from(*count)).sum();

    rows.into_iter()
        .map(|(label, count, percentage)| StatusShare {
            percentage: percentage.unwrap_or_else(|| percentage_of(count, total)),
            label,
            count,
        })
        .collect()
}

/// `count / total` as a percentage rounded to one decimal; zero when `total` is zero.
///
/// `total` is a sum of `u32` counts, hence the wider type.
#[must_use]
pub fn percentage_of(count: u32, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    (f64::from(count) * 1000.0 / total).round() / 10.0
}

// =============================================================================
// Export
// =============================================================================

/// The downloadable report artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportExport {
    pub period: ReportPeriod,
    pub generated_at: DateTime<Utc>,
    pub report: Report,
}

impl ReportExport {
    /// Pair a displayed report with its period, stamped `at`.
    #[must_use]
    pub fn new(period: ReportPeriod, report: Report, at: DateTime<Utc>) -> Self {
        Self {
            period,
            generated_at: at,
            report,
        }
    }

    /// Artifact file name, e.g. `petalbox-report-week-20240508-143000.json`.
    #[must_use]
    pub fn filename(&self) -> String {
        export_filename(self.period, self.generated_at)
    }

    /// Pretty-printed JSON content of the artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// File name for a report export of `period` generated at `at`.
#[must_use]
pub fn export_filename(period: ReportPeriod, at: DateTime<Utc>) -> String {
    format!(
        "petalbox-report-{}-{}.json",
        period.as_str(),
        at.format("%Y%m%d-%H%M%S")
    )
}

/// Read an export artifact back.
///
/// # Errors
///
/// Returns an error if `content` is not a report export.
pub fn parse_export(content: &str) -> Result<ReportExport, ExportError> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample_payload() -> Value {
        json!({
            "success": true,
            "data": {
                "deliveries": {"total": 40, "pending": 5, "inProgress": 3, "completed": 30, "cancelled": 2, "change": 12.5},
                "orders": {"total": 44, "pending": 6, "completed": 35, "cancelled": 3, "revenue": "15750000", "change": -4.2, "trend": "down"},
                "customers": {"total": 120, "newCustomers": 9, "active": 101},
                "performance": {"avgDeliveryTime": 42.5, "satisfactionRate": 96.1, "onTimeRate": 91.0},
                "daily": [
                    {"date": "Mon", "deliveries": 6, "completed": 5},
                    {"date": "Tue", "deliveries": "7", "completed": 7}
                ],
                "statusBreakdown": [
                    {"status": "Completed", "count": 30},
                    {"status": "Pending", "count": 5},
                    {"status": "In progress", "count": 3},
                    {"status": "Cancelled", "count": 2}
                ],
                "topDrivers": [{"name": "Quang", "deliveries": 18, "rating": 4.9, "onTimeRate": 97.0}]
            }
        })
    }

    #[test]
    fn test_normalize_full_report() {
        let report = normalize_report(&sample_payload());
        assert_eq!(report.deliveries.total, 40);
        assert_eq!(report.deliveries.in_progress, 3);
        assert_eq!(report.deliveries.trend, Trend::Up);
        assert_eq!(report.orders.trend, Trend::Down);
        assert_eq!(report.orders.revenue, Decimal::from(15_750_000));
        assert_eq!(report.customers.new, 9);
        assert_eq!(report.customers.trend, Trend::Stable);
        assert!((report.performance.avg_delivery_time - 42.5).abs() < f64::EPSILON);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.daily[1].deliveries, 7);
        assert_eq!(report.top_drivers[0].name, "Quang");
    }

    #[test]
    fn test_breakdown_percentages_computed_when_absent() {
        let report = normalize_report(&sample_payload());
        let pct: Vec<f64> = report
            .status_breakdown
            .iter()
            .map(|s| s.percentage)
            .collect();
        assert_eq!(pct, vec![75.0, 12.5, 7.5, 5.0]);
    }

    #[test]
    fn test_breakdown_keeps_backend_percentages() {
        let report = normalize_report(&json!({
            "statusBreakdown": [{"label": "Done", "count": 1, "percentage": 33.3}]
        }));
        assert!((report.status_breakdown[0].percentage - 33.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_payload_is_default() {
        assert_eq!(normalize_report(&json!({})), Report::default());
        assert_eq!(normalize_report(&Value::Null), Report::default());
    }

    #[test]
    fn test_percentage_of_zero_total() {
        assert!(percentage_of(3, 0).abs() < f64::EPSILON);
        assert!((percentage_of(1, 3) - 33.3).abs() < 1e-9);
    }

    #[test]
    fn test_week_export_filename_and_round_trip() {
        let report = normalize_report(&sample_payload());
        let at = Utc.with_ymd_and_hms(2024, 5, 8, 14, 30, 0).unwrap();
        let export = ReportExport::new(ReportPeriod::Week, report.clone(), at);

        let name = export.filename();
        assert!(name.contains("week"));
        assert!(name.contains("20240508-143000"));
        assert!(name.ends_with(".json"));

        let content = export.to_json().unwrap();
        let parsed = parse_export(&content).unwrap();
        assert_eq!(parsed.report, report);
        assert_eq!(parsed.period, ReportPeriod::Week);
        assert_eq!(parsed, export);
    }

    #[test]
    fn test_non_finite_values_fall_back_and_export_round_trips() {
        let report = normalize_report(&json!({
            "deliveries": {"total": 3, "change": "NaN"},
            "performance": {"onTimeRate": "infinity", "satisfactionRate": "-inf"},
            "statusBreakdown": [
                {"label": "Done", "count": 1, "percentage": "inf"},
                {"label": "Late", "count": 3}
            ]
        }));
        assert!(report.deliveries.change.abs() < f64::EPSILON);
        assert_eq!(report.deliveries.trend, Trend::Stable);
        assert!(report.performance.on_time_rate.abs() < f64::EPSILON);
        let pct: Vec<f64> = report
            .status_breakdown
            .iter()
            .map(|s| s.percentage)
            .collect();
        assert_eq!(pct, vec![25.0, 75.0]);

        let at = Utc.with_ymd_and_hms(2024, 5, 8, 14, 30, 0).unwrap();
        let export = ReportExport::new(ReportPeriod::Day, report, at);
        assert_eq!(parse_export(&export.to_json().unwrap()).unwrap(), export);
    }

    #[test]
    fn test_breakdown_with_huge_counts_does_not_overflow() {
        let report = normalize_report(&json!({
            "statusBreakdown": [
                {"label": "Completed", "count": 4_000_000_000_u64},
                {"label": "Pending", "count": 4_000_000_000_u64},
                {"label": "Beyond", "count": 1e300}
            ]
        }));
        let counts: Vec<u32> = report.status_breakdown.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![4_000_000_000, 4_000_000_000, u32::MAX]);
        let total: f64 = report.status_breakdown.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() < 0.2);
        assert!(report.status_breakdown.iter().all(|s| s.percentage.is_finite()));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("Weekly".parse::<ReportPeriod>(), Ok(ReportPeriod::Week));
        assert!("fortnight".parse::<ReportPeriod>().is_err());
    }
}
