//! Customer view-model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Searchable;
use crate::payload::{PLACEHOLDER, Payload};
use crate::types::{CustomerStatus, NormalizedStatus};

use super::{HasStatus, address_text};

// Candidate paths, in coalescing order.
const ID: &[&str] = &["id", "_id", "customerId", "customer_id", "userId", "user_id"];
const NAME: &[&str] = &[
    "name",
    "fullName",
    "full_name",
    "displayName",
    "username",
    "user.name",
    "user.fullName",
];
const EMAIL: &[&str] = &["email", "user.email", "contact.email"];
const PHONE: &[&str] = &[
    "phone",
    "phoneNumber",
    "phone_number",
    "user.phone",
    "contact.phone",
];
const ADDRESS: &[&str] = &[
    "address",
    "deliveryAddress",
    "delivery_address",
    "shippingAddress",
    "user.address",
];
const JOIN_DATE: &[&str] = &[
    "joinDate",
    "join_date",
    "createdAt",
    "created_at",
    "registeredAt",
    "user.createdAt",
];
const ORDER_COUNT: &[&str] = &[
    "orderCount",
    "order_count",
    "totalOrders",
    "total_orders",
    "ordersCount",
    "orders",
];
const TOTAL_SPENT: &[&str] = &[
    "totalSpent",
    "total_spent",
    "totalSpend",
    "lifetimeValue",
    "stats.totalSpent",
];
const STATUS: &[&str] = &["status", "accountStatus", "account_status", "state"];
const ACTIVE_FLAG: &[&str] = &["isActive", "is_active", "active"];
const TIER: &[&str] = &[
    "subscriptionTier",
    "subscription_tier",
    "subscription.package.name",
    "subscription.packageName",
    "subscription.name",
    "tier",
    "membership",
];
const DELIVERY_PREFERENCE: &[&str] = &[
    "deliveryPreference",
    "delivery_preference",
    "preferences.delivery",
    "preferredDeliveryTime",
];
const NOTES: &[&str] = &["notes", "note", "remarks"];

/// A customer row on the admin and staff customer pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// `YYYY-MM-DD`, or the placeholder.
    pub join_date: String,
    pub order_count: u32,
    pub total_spent: Decimal,
    pub status: CustomerStatus,
    pub subscription_tier: String,
    pub delivery_preference: String,
    pub notes: String,
}

/// Build a [`CustomerView`] from any customer payload shape.
#[must_use]
pub fn normalize_customer(raw: &Value) -> CustomerView {
    let p = Payload::new(raw);

    let status = p.text(STATUS).map_or_else(
        || match p.flag(ACTIVE_FLAG) {
            Some(false) => CustomerStatus::Inactive,
            _ => CustomerStatus::Active,
        },
        |s| CustomerStatus::from_backend(&s),
    );

    CustomerView {
        id: p.text_or_placeholder(ID),
        name: p.text_or_placeholder(NAME),
        email: p.text_or_placeholder(EMAIL),
        phone: p.text_or_placeholder(PHONE),
        address: address_text(&p, ADDRESS),
        join_date: p.date(JOIN_DATE).unwrap_or_else(|| PLACEHOLDER.to_string()),
        order_count: p.count(ORDER_COUNT).unwrap_or(0),
        total_spent: p.decimal(TOTAL_SPENT).unwrap_or(Decimal::ZERO),
        status,
        subscription_tier: p.text_or_placeholder(TIER),
        delivery_preference: p.text_or_placeholder(DELIVERY_PREFERENCE),
        notes: p.text_or_placeholder(NOTES),
    }
}

impl Searchable for CustomerView {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.address.as_str(),
        ]
    }
}

impl HasStatus for CustomerView {
    type Status = CustomerStatus;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> CustomerStatus {
        self.status
    }

    fn set_status(&mut self, status: CustomerStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_full_payload() {
        let raw = json!({
            "_id": "c-1",
            "fullName": "Nguyen Lan",
            "email": "lan@example.com",
            "phoneNumber": "0901 234 567",
            "address": {"street": "12 Hoa Sua", "district": "Q1", "city": "HCMC"},
            "createdAt": "2024-01-15T08:00:00Z",
            "orders": [{}, {}],
            "totalSpent": "1500000",
            "status": "ACTIVE",
            "subscription": {"package": {"name": "Weekly Bloom"}},
            "deliveryPreference": "Morning",
            "notes": "Leave at gate"
        });
        let c = normalize_customer(&raw);
        assert_eq!(c.id, "c-1");
        assert_eq!(c.name, "Nguyen Lan");
        assert_eq!(c.address, "12 Hoa Sua, Q1, HCMC");
        assert_eq!(c.join_date, "2024-01-15");
        assert_eq!(c.order_count, 2);
        assert_eq!(c.total_spent, Decimal::from(1_500_000));
        assert_eq!(c.status, CustomerStatus::Active);
        assert_eq!(c.subscription_tier, "Weekly Bloom");
        assert_eq!(c.delivery_preference, "Morning");
    }

    #[test]
    fn test_empty_payload_uses_fallbacks() {
        let c = normalize_customer(&json!({}));
        assert_eq!(c.id, PLACEHOLDER);
        assert_eq!(c.name, PLACEHOLDER);
        assert_eq!(c.email, PLACEHOLDER);
        assert_eq!(c.phone, PLACEHOLDER);
        assert_eq!(c.address, PLACEHOLDER);
        assert_eq!(c.join_date, PLACEHOLDER);
        assert_eq!(c.order_count, 0);
        assert_eq!(c.total_spent, Decimal::ZERO);
        assert_eq!(c.status, CustomerStatus::Active);
        assert_eq!(c.subscription_tier, PLACEHOLDER);
        assert_eq!(c.delivery_preference, PLACEHOLDER);
        assert_eq!(c.notes, PLACEHOLDER);
    }

    #[test]
    fn test_non_object_payload_does_not_panic() {
        for raw in [json!(null), json!(3), json!("x"), json!([1, 2])] {
            let c = normalize_customer(&raw);
            assert_eq!(c.name, PLACEHOLDER);
        }
    }

    #[test]
    fn test_active_flag_when_status_missing() {
        let c = normalize_customer(&json!({"isActive": false}));
        assert_eq!(c.status, CustomerStatus::Inactive);
    }

    #[test]
    fn test_user_nested_shape() {
        let raw = json!({"user": {"name": "Hoa", "email": "hoa@example.com"}, "totalOrders": 4});
        let c = normalize_customer(&raw);
        assert_eq!(c.name, "Hoa");
        assert_eq!(c.email, "hoa@example.com");
        assert_eq!(c.order_count, 4);
    }
}
