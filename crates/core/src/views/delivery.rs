//! Delivery view-model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Searchable;
use crate::payload::Payload;
use crate::types::{DeliveryStatus, NormalizedStatus};

use super::{HasStatus, address_text};

const ID: &[&str] = &["id", "_id", "deliveryId", "delivery_id"];
const ORDER_REF: &[&str] = &[
    "orderCode",
    "order_code",
    "orderNumber",
    "order_number",
    "orderId",
    "order_id",
    "order.code",
    "order.id",
    "order._id",
    "order",
];
const CUSTOMER_NAME: &[&str] = &[
    "customerName",
    "customer_name",
    "customer.name",
    "customer.fullName",
    "recipientName",
    "recipient.name",
    "order.customer.name",
];
const CUSTOMER_PHONE: &[&str] = &[
    "customerPhone",
    "customer_phone",
    "customer.phone",
    "recipientPhone",
    "recipient.phone",
    "order.customer.phone",
];
const ADDRESS: &[&str] = &[
    "address",
    "deliveryAddress",
    "delivery_address",
    "shippingAddress",
    "order.deliveryAddress",
    "customer.address",
];
const PACKAGE: &[&str] = &[
    "packageName",
    "package_name",
    "package.name",
    "order.package.name",
    "order.packageName",
    "product.name",
];
const SCHEDULED_DATE: &[&str] = &[
    "scheduledDate",
    "scheduled_date",
    "deliveryDate",
    "delivery_date",
    "date",
];
const SCHEDULED_TIME: &[&str] = &[
    "scheduledTime",
    "scheduled_time",
    "timeSlot",
    "time_slot",
    "deliveryTime",
];
const STATUS: &[&str] = &["status", "deliveryStatus", "delivery_status", "state"];
const DRIVER_NAME: &[&str] = &[
    "driverName",
    "driver_name",
    "driver.name",
    "shipper.name",
    "assignedTo.name",
];
const DRIVER_PHONE: &[&str] = &[
    "driverPhone",
    "driver_phone",
    "driver.phone",
    "shipper.phone",
    "assignedTo.phone",
];
const NOTES: &[&str] = &["notes", "note", "instructions", "deliveryNotes"];

/// A delivery row on the staff delivery board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryView {
    pub id: String,
    pub order_ref: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub package_name: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub status: DeliveryStatus,
    pub driver_name: String,
    pub driver_phone: String,
    pub notes: String,
}

/// Build a [`DeliveryView`] from any delivery payload shape.
#[must_use]
pub fn normalize_delivery(raw: &Value) -> DeliveryView {
    let p = Payload::new(raw);

    DeliveryView {
        id: p.text_or_placeholder(ID),
        order_ref: p.text_or_placeholder(ORDER_REF),
        customer_name: p.text_or_placeholder(CUSTOMER_NAME),
        customer_phone: p.text_or_placeholder(CUSTOMER_PHONE),
        address: address_text(&p, ADDRESS),
        package_name: p.text_or_placeholder(PACKAGE),
        scheduled_date: p
            .date(SCHEDULED_DATE)
            .unwrap_or_else(|| crate::payload::PLACEHOLDER.to_string()),
        scheduled_time: p.text_or_placeholder(SCHEDULED_TIME),
        status: DeliveryStatus::from_backend(&p.text(STATUS).unwrap_or_default()),
        driver_name: p.text_or_placeholder(DRIVER_NAME),
        driver_phone: p.text_or_placeholder(DRIVER_PHONE),
        notes: p.text_or_placeholder(NOTES),
    }
}

impl Searchable for DeliveryView {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.order_ref.as_str(),
            self.customer_name.as_str(),
            self.customer_phone.as_str(),
            self.address.as_str(),
            self.driver_name.as_str(),
        ]
    }
}

impl HasStatus for DeliveryView {
    type Status = DeliveryStatus;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> DeliveryStatus {
        self.status
    }

    fn set_status(&mut self, status: DeliveryStatus) {
        self.status = status;
    }
}
