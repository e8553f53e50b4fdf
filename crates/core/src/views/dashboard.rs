//! Dashboard headline numbers and the recent-activity feed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::{PLACEHOLDER, Payload};
use crate::types::{DashboardStatus, NormalizedStatus};

const TOTAL_ORDERS: &[&str] = &[
    "totalOrders",
    "total_orders",
    "orders.total",
    "orderCount",
    "stats.totalOrders",
];
const PENDING_ORDERS: &[&str] = &[
    "pendingOrders",
    "pending_orders",
    "orders.pending",
    "stats.pendingOrders",
];
const TOTAL_CUSTOMERS: &[&str] = &[
    "totalCustomers",
    "total_customers",
    "customers.total",
    "customerCount",
    "totalUsers",
    "stats.totalCustomers",
];
const TODAY_DELIVERIES: &[&str] = &[
    "todayDeliveries",
    "today_deliveries",
    "deliveries.today",
    "deliveriesToday",
    "stats.todayDeliveries",
];
const ACTIVE_SUBSCRIPTIONS: &[&str] = &[
    "activeSubscriptions",
    "active_subscriptions",
    "subscriptions.active",
    "stats.activeSubscriptions",
];
const REVENUE: &[&str] = &[
    "totalRevenue",
    "total_revenue",
    "revenue.total",
    "revenue",
    "stats.totalRevenue",
];
const RECENT: &[&str] = &[
    "recentOrders",
    "recent_orders",
    "recentActivities",
    "recentActivity",
    "recent",
];

const ACTIVITY_ID: &[&str] = &["orderCode", "code", "id", "_id"];
const ACTIVITY_CUSTOMER: &[&str] = &[
    "customerName",
    "customer_name",
    "customer.name",
    "user.name",
    "name",
];
const ACTIVITY_AMOUNT: &[&str] = &["totalAmount", "amount", "total", "price"];
const ACTIVITY_STATUS: &[&str] = &["status", "state"];
const ACTIVITY_DATE: &[&str] = &["createdAt", "created_at", "date", "orderDate"];

/// Headline numbers shown at the top of the admin and staff dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardStats {
    pub total_orders: u32,
    pub pending_orders: u32,
    pub total_customers: u32,
    pub today_deliveries: u32,
    pub active_subscriptions: u32,
    pub total_revenue: Decimal,
    pub recent: Vec<RecentActivity>,
}

/// One line of the dashboard's recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    pub customer: String,
    pub amount: Decimal,
    pub status: DashboardStatus,
    pub date: String,
}

/// Build [`DashboardStats`] from an admin or staff stats payload.
///
/// Accepts the stats at the top level or under `data`/`stats`.
#[must_use]
pub fn normalize_dashboard(raw: &Value) -> DashboardStats {
    let root = Payload::new(raw);
    let p = root.object(&["data"]).unwrap_or(root);

    let recent = p
        .array(RECENT)
        .unwrap_or_default()
        .iter()
        .map(normalize_activity)
        .collect();

    DashboardStats {
        total_orders: p.count(TOTAL_ORDERS).unwrap_or(0),
        pending_orders: p.count(PENDING_ORDERS).unwrap_or(0),
        total_customers: p.count(TOTAL_CUSTOMERS).unwrap_or(0),
        today_deliveries: p.count(TODAY_DELIVERIES).unwrap_or(0),
        active_subscriptions: p.count(ACTIVE_SUBSCRIPTIONS).unwrap_or(0),
        total_revenue: p.decimal(REVENUE).unwrap_or(Decimal::ZERO),
        recent,
    }
}

fn normalize_activity(raw: &Value) -> RecentActivity {
    let p = Payload::new(raw);
    RecentActivity {
        id: p.text_or_placeholder(ACTIVITY_ID),
        customer: p.text_or_placeholder(ACTIVITY_CUSTOMER),
        amount: p.decimal(ACTIVITY_AMOUNT).unwrap_or(Decimal::ZERO),
        status: DashboardStatus::from_backend(&p.text(ACTIVITY_STATUS).unwrap_or_default()),
        date: p
            .date(ACTIVITY_DATE)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}
