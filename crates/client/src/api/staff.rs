//! Staff surface: dashboard, order handling, customer contact, deliveries.

use chrono::{DateTime, Utc};
use petalbox_core::{
    CustomerView, DashboardStats, DeliveryStatus, DeliveryView, NormalizedStatus, OrderStatus,
    OrderView, PackageView, Report, ReportPeriod, normalize_customer, normalize_dashboard,
    normalize_delivery, normalize_order, normalize_package, report::normalize_report,
};
use serde::Serialize;
use tracing::instrument;

use super::{StatusBody, list_of, one_of, segment};
use crate::error::ApiError;
use crate::http::{ApiClient, RequestOptions};

const ORDERS: &[&str] = &["orders"];
const ORDER: &[&str] = &["order"];
const CUSTOMERS: &[&str] = &["customers"];
const CUSTOMER: &[&str] = &["customer"];
const DELIVERIES: &[&str] = &["deliveries"];
const DELIVERY: &[&str] = &["delivery"];
const PACKAGES: &[&str] = &["packages"];

/// A note of a call, message or visit to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLog {
    /// `phone`, `email`, `sms`, `visit`, ...
    pub method: String,
    pub notes: String,
    pub contacted_at: DateTime<Utc>,
}

impl ApiClient {
    /// Headline numbers for the staff dashboard.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn staff_dashboard(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .get("/staff/dashboard/stats", RequestOptions::default())
            .await?;
        Ok(normalize_dashboard(&response))
    }

    /// Orders in the staff queue.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn staff_orders(&self) -> Result<Vec<OrderView>, ApiError> {
        let response = self.get("/staff/orders", RequestOptions::default()).await?;
        list_of(response, ORDERS, normalize_order)
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn staff_order(&self, id: &str) -> Result<OrderView, ApiError> {
        let path = format!("/staff/orders/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(one_of(response, ORDER, normalize_order))
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is rejected or the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_staff_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/staff/orders/{}/status", segment(id));
        let body = StatusBody {
            status: status.as_str(),
        };
        self.patch(&path, &body, RequestOptions::default()).await?;
        Ok(())
    }

    /// Customers visible to staff.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn staff_customers(&self) -> Result<Vec<CustomerView>, ApiError> {
        let response = self
            .get("/staff/customers", RequestOptions::default())
            .await?;
        list_of(response, CUSTOMERS, normalize_customer)
    }

    /// One customer.
    ///
    /// # Errors
    ///
    /// Returns error if the customer is not found or the API request fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn staff_customer(&self, id: &str) -> Result<CustomerView, ApiError> {
        let path = format!("/staff/customers/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(one_of(response, CUSTOMER, normalize_customer))
    }

    /// Record a contact with a customer.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, log), fields(customer_id = %id, method = %log.method))]
    pub async fn log_customer_contact(&self, id: &str, log: &ContactLog) -> Result<(), ApiError> {
        let path = format!("/staff/customers/{}/contacts", segment(id));
        self.post(&path, log, RequestOptions::default()).await?;
        Ok(())
    }

    /// The delivery board.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn staff_deliveries(&self) -> Result<Vec<DeliveryView>, ApiError> {
        let response = self
            .get("/staff/deliveries", RequestOptions::default())
            .await?;
        list_of(response, DELIVERIES, normalize_delivery)
    }

    /// One delivery.
    ///
    /// # Errors
    ///
    /// Returns error if the delivery is not found or the API request fails.
    #[instrument(skip(self), fields(delivery_id = %id))]
    pub async fn staff_delivery(&self, id: &str) -> Result<DeliveryView, ApiError> {
        let path = format!("/staff/deliveries/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(one_of(response, DELIVERY, normalize_delivery))
    }

    /// Move a delivery to `status`.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is rejected or the API request fails.
    #[instrument(skip(self), fields(delivery_id = %id, status = %status))]
    pub async fn update_delivery_status(
        &self,
        id: &str,
        status: DeliveryStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/staff/deliveries/{}/status", segment(id));
        let body = StatusBody {
            status: status.as_str(),
        };
        self.patch(&path, &body, RequestOptions::default()).await?;
        Ok(())
    }

    /// Packages as staff see them.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn staff_packages(&self) -> Result<Vec<PackageView>, ApiError> {
        let response = self
            .get("/staff/packages", RequestOptions::default())
            .await?;
        list_of(response, PACKAGES, normalize_package)
    }

    /// Delivery report for `period`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn staff_report(&self, period: ReportPeriod) -> Result<Report, ApiError> {
        let query = [("period", period.to_string())];
        let response = self
            .get_query("/staff/reports", &query, RequestOptions::default())
            .await?;
        Ok(normalize_report(&response))
    }
}
