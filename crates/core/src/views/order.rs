//! Order view-model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Searchable;
use crate::payload::{PLACEHOLDER, Payload};
use crate::types::{NormalizedStatus, OrderStatus};

use super::{HasStatus, address_text};

const ID: &[&str] = &["id", "_id", "orderId", "order_id", "orderCode", "code"];
const CUSTOMER_NAME: &[&str] = &[
    "customerName",
    "customer_name",
    "customer.name",
    "customer.fullName",
    "user.name",
    "user.fullName",
    "recipientName",
];
const CUSTOMER_PHONE: &[&str] = &[
    "customerPhone",
    "customer_phone",
    "customer.phone",
    "user.phone",
    "recipientPhone",
];
const PACKAGE: &[&str] = &[
    "packageName",
    "package_name",
    "package.name",
    "subscription.package.name",
    "items.0.name",
    "productName",
];
const AMOUNT: &[&str] = &[
    "totalAmount",
    "total_amount",
    "amount",
    "total",
    "totalPrice",
    "price",
    "package.price",
];
const STATUS: &[&str] = &["status", "orderStatus", "order_status", "state"];
const ORDER_DATE: &[&str] = &["orderDate", "order_date", "createdAt", "created_at"];
const DELIVERY_ADDRESS: &[&str] = &[
    "deliveryAddress",
    "delivery_address",
    "shippingAddress",
    "address",
    "customer.address",
];
const DELIVERY_DATE: &[&str] = &[
    "deliveryDate",
    "delivery_date",
    "scheduledDate",
    "expectedDelivery",
];
const NOTES: &[&str] = &["notes", "note", "message", "giftMessage"];

/// An order row on the admin and staff order pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub package_name: String,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub order_date: String,
    pub delivery_address: String,
    pub delivery_date: String,
    pub notes: String,
}

/// Build an [`OrderView`] from any order payload shape.
#[must_use]
pub fn normalize_order(raw: &Value) -> OrderView {
    let p = Payload::new(raw);

    OrderView {
        id: p.text_or_placeholder(ID),
        customer_name: p.text_or_placeholder(CUSTOMER_NAME),
        customer_phone: p.text_or_placeholder(CUSTOMER_PHONE),
        package_name: p.text_or_placeholder(PACKAGE),
        amount: p.decimal(AMOUNT).unwrap_or(Decimal::ZERO),
        status: OrderStatus::from_backend(&p.text(STATUS).unwrap_or_default()),
        order_date: p.date(ORDER_DATE).unwrap_or_else(|| PLACEHOLDER.to_string()),
        delivery_address: address_text(&p, DELIVERY_ADDRESS),
        delivery_date: p
            .date(DELIVERY_DATE)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        notes: p.text_or_placeholder(NOTES),
    }
}

impl Searchable for OrderView {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.customer_name.as_str(),
            self.customer_phone.as_str(),
            self.package_name.as_str(),
            self.delivery_address.as_str(),
        ]
    }
}

impl HasStatus for OrderView {
    type Status = OrderStatus;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}
