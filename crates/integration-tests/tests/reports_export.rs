//! Admin reports: period query, normalization and JSON export.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use petalbox_client::{DashboardPage, ReportPage};
use petalbox_core::report::parse_export;
use petalbox_core::{ReportPeriod, Trend};
use petalbox_integration_tests::{StubBackend, admin_user, sign_in};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn report_for(period: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "period": period,
            "deliveryStats": {"total": 120, "pending": 10, "inProgress": 15, "completed": 90, "cancelled": 5, "change": 8.5},
            "orderStats": {"total": 130, "completed": 100, "totalRevenue": "45500000", "change": -2, "trend": "down"},
            "customerStats": {"total": 80, "newCustomers": 12, "active": 64},
            "performance": {"avgDeliveryTime": 42, "onTimeRate": 93.5, "satisfactionRate": 4.7},
            "dailyStats": [
                {"date": "2024-05-06", "deliveries": 18, "completed": 16},
                {"date": "2024-05-07", "deliveries": 21, "completed": 20}
            ],
            "statusBreakdown": [
                {"status": "Completed", "count": 90},
                {"status": "In progress", "count": 15},
                {"status": "Pending", "count": 10},
                {"status": "Cancelled", "count": 5}
            ],
            "topDrivers": [{"name": "Tuan", "deliveries": 40, "onTimeRate": 97.5, "rating": 4.9}]
        }
    })
}

fn report_routes() -> Router {
    Router::new()
        .route(
            "/admin/reports",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let period = params.get("period").cloned().unwrap_or_default();
                Json(report_for(&period))
            }),
        )
        .route(
            "/admin/dashboard/stats",
            get(|| async {
                Json(json!({"data": {
                    "totalOrders": 130,
                    "pendingOrders": 7,
                    "totalCustomers": 80,
                    "todayDeliveries": 9,
                    "totalRevenue": 45_500_000,
                    "recentOrders": [
                        {"id": "PB-9", "customerName": "Mai Pham", "totalAmount": 350_000, "status": "paid"}
                    ]
                }}))
            }),
        )
}

#[tokio::test]
async fn test_report_normalized_for_period() {
    let backend = StubBackend::spawn(report_routes()).await;
    let client = backend.client();
    sign_in(&client, "tok-admin", admin_user());

    let report = client.admin_report(ReportPeriod::Month).await.unwrap();

    let seen = backend.last_request("GET", "/admin/reports").unwrap();
    assert_eq!(seen.query.as_deref(), Some("period=month"));

    assert_eq!(report.deliveries.total, 120);
    assert_eq!(report.deliveries.in_progress, 15);
    assert_eq!(report.deliveries.trend, Trend::Up);
    assert_eq!(report.orders.revenue, Decimal::from(45_500_000));
    assert_eq!(report.orders.trend, Trend::Down);
    assert_eq!(report.customers.new, 12);
    assert_eq!(report.daily.len(), 2);

    let shares: Vec<f64> = report
        .status_breakdown
        .iter()
        .map(|s| s.percentage)
        .collect();
    assert_eq!(shares, vec![75.0, 12.5, 8.3, 4.2]);
}

#[tokio::test]
async fn test_export_round_trip() {
    let backend = StubBackend::spawn(report_routes()).await;
    let client = backend.client();
    sign_in(&client, "tok-admin", admin_user());

    let mut page = ReportPage::new(ReportPeriod::Week);
    assert!(page.load(client.admin_report(page.period())).await);

    let dir = std::env::temp_dir().join(format!("petalbox-reports-{}", uuid::Uuid::new_v4()));
    let at = Utc.with_ymd_and_hms(2024, 5, 8, 14, 30, 0).unwrap();
    let path = page.export_at(&dir, at).unwrap();

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("petalbox-report-week-20240508-143000.json")
    );
    let restored = parse_export(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored.period, ReportPeriod::Week);
    assert_eq!(&restored.report, page.report().unwrap());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_switching_period_reloads() {
    let backend = StubBackend::spawn(report_routes()).await;
    let client = backend.client();
    sign_in(&client, "tok-admin", admin_user());

    let mut page = ReportPage::new(ReportPeriod::Week);
    assert!(page.load(client.admin_report(page.period())).await);
    page.set_period(ReportPeriod::Year);
    assert!(page.load(client.admin_report(page.period())).await);

    let periods: Vec<Option<String>> = backend
        .requests()
        .into_iter()
        .filter(|r| r.path == "/api/admin/reports")
        .map(|r| r.query)
        .collect();
    assert_eq!(
        periods,
        vec![Some("period=week".to_string()), Some("period=year".to_string())]
    );
}

#[tokio::test]
async fn test_dashboard_page() {
    let backend = StubBackend::spawn(report_routes()).await;
    let client = backend.client();
    sign_in(&client, "tok-admin", admin_user());

    let mut page = DashboardPage::new();
    assert!(page.load(client.admin_dashboard()).await);

    let stats = page.data().unwrap();
    assert_eq!(stats.total_orders, 130);
    assert_eq!(stats.pending_orders, 7);
    assert_eq!(stats.total_revenue, Decimal::from(45_500_000));
    assert_eq!(stats.recent.len(), 1);
}
