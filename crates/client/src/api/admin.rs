//! Admin surface: dashboard, analytics, reports, catalogue, orders, customers.

use petalbox_core::{
    CustomerStatus, CustomerView, DashboardStats, NormalizedStatus, OrderStatus, OrderView,
    PackageView, Report, ReportPeriod, extract_object, normalize_customer,
    normalize_dashboard, normalize_order, normalize_package, report::normalize_report,
};
use serde_json::Value;
use tracing::instrument;

use super::{StatusBody, items_of, list_of, one_of, segment};
use crate::error::ApiError;
use crate::http::{ApiClient, RequestOptions};

const ORDERS: &[&str] = &["orders"];
const ORDER: &[&str] = &["order"];
const CUSTOMERS: &[&str] = &["customers", "users"];
const CUSTOMER: &[&str] = &["customer", "user"];

/// Catalogue collections managed from the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogResource {
    Packages,
    Flowers,
    Bouquets,
}

impl CatalogResource {
    /// Collection path segment, also the list envelope key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Packages => "packages",
            Self::Flowers => "flowers",
            Self::Bouquets => "bouquets",
        }
    }

    const fn singular(self) -> &'static str {
        match self {
            Self::Packages => "package",
            Self::Flowers => "flower",
            Self::Bouquets => "bouquet",
        }
    }

    fn collection_path(self) -> String {
        format!("/admin/{}", self.as_str())
    }

    fn item_path(self, id: &str) -> String {
        format!("/admin/{}/{}", self.as_str(), segment(id))
    }
}

impl std::fmt::Display for CatalogResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiClient {
    // =========================================================================
    // Dashboard, analytics and reports
    // =========================================================================

    /// Headline numbers for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .get("/admin/dashboard/stats", RequestOptions::default())
            .await?;
        Ok(normalize_dashboard(&response))
    }

    /// Revenue series for the analytics page.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn revenue_analytics(&self, period: ReportPeriod) -> Result<Value, ApiError> {
        let query = [("period", period.to_string())];
        let response = self
            .get_query("/admin/analytics/revenue", &query, RequestOptions::default())
            .await?;
        Ok(extract_object(response, &["analytics", "revenue"]))
    }

    /// Report aggregate for `period`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn admin_report(&self, period: ReportPeriod) -> Result<Report, ApiError> {
        let query = [("period", period.to_string())];
        let response = self
            .get_query("/admin/reports", &query, RequestOptions::default())
            .await?;
        Ok(normalize_report(&response))
    }

    /// Ask the backend to produce its own export of the report.
    ///
    /// Local export (see `ReportPage::export_to`) needs no network call;
    /// this is the server-rendered variant.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn export_report_remote(&self, period: ReportPeriod) -> Result<Value, ApiError> {
        let query = [("period", period.to_string())];
        self.get_query("/admin/reports/export", &query, RequestOptions::default())
            .await
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    /// Packages as the admin sees them, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_packages(&self) -> Result<Vec<PackageView>, ApiError> {
        let response = self
            .get(
                &CatalogResource::Packages.collection_path(),
                RequestOptions::default(),
            )
            .await?;
        list_of(response, &["packages"], normalize_package)
    }

    /// List raw items of a catalogue collection.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(resource = %resource))]
    pub async fn catalog_list(&self, resource: CatalogResource) -> Result<Vec<Value>, ApiError> {
        let response = self
            .get(&resource.collection_path(), RequestOptions::default())
            .await?;
        items_of(response, &[resource.as_str()])
    }

    /// Create a catalogue item.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the item.
    #[instrument(skip(self, item), fields(resource = %resource))]
    pub async fn catalog_create(
        &self,
        resource: CatalogResource,
        item: &Value,
    ) -> Result<Value, ApiError> {
        let response = self
            .post(&resource.collection_path(), item, RequestOptions::default())
            .await?;
        tracing::info!(%resource, "Catalogue item created");
        Ok(extract_object(response, &[resource.singular()]))
    }

    /// Replace a catalogue item's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the item is not found or the backend rejects it.
    #[instrument(skip(self, item), fields(resource = %resource, id = %id))]
    pub async fn catalog_update(
        &self,
        resource: CatalogResource,
        id: &str,
        item: &Value,
    ) -> Result<Value, ApiError> {
        let response = self
            .put(&resource.item_path(id), item, RequestOptions::default())
            .await?;
        Ok(extract_object(response, &[resource.singular()]))
    }

    /// Delete a catalogue item.
    ///
    /// # Errors
    ///
    /// Returns error if the item is not found or the API request fails.
    #[instrument(skip(self), fields(resource = %resource, id = %id))]
    pub async fn catalog_delete(&self, resource: CatalogResource, id: &str) -> Result<(), ApiError> {
        self.delete(&resource.item_path(id), RequestOptions::default())
            .await?;
        tracing::info!(%resource, id, "Catalogue item deleted");
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// All orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<OrderView>, ApiError> {
        let response = self.get("/admin/orders", RequestOptions::default()).await?;
        list_of(response, ORDERS, normalize_order)
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn admin_order(&self, id: &str) -> Result<OrderView, ApiError> {
        let path = format!("/admin/orders/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(one_of(response, ORDER, normalize_order))
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is rejected or the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_admin_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/admin/orders/{}/status", segment(id));
        let body = StatusBody {
            status: status.as_str(),
        };
        self.patch(&path, &body, RequestOptions::default()).await?;
        Ok(())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// All customers.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_customers(&self) -> Result<Vec<CustomerView>, ApiError> {
        let response = self
            .get("/admin/customers", RequestOptions::default())
            .await?;
        list_of(response, CUSTOMERS, normalize_customer)
    }

    /// One customer.
    ///
    /// # Errors
    ///
    /// Returns error if the customer is not found or the API request fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn admin_customer(&self, id: &str) -> Result<CustomerView, ApiError> {
        let path = format!("/admin/customers/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(one_of(response, CUSTOMER, normalize_customer))
    }

    /// Activate or deactivate a customer.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(customer_id = %id, status = %status))]
    pub async fn update_customer_status(
        &self,
        id: &str,
        status: CustomerStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/admin/customers/{}/status", segment(id));
        let body = StatusBody {
            status: status.as_str(),
        };
        self.patch(&path, &body, RequestOptions::default()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_paths() {
        assert_eq!(CatalogResource::Flowers.collection_path(), "/admin/flowers");
        assert_eq!(
            CatalogResource::Bouquets.item_path("b 1"),
            "/admin/bouquets/b%201"
        );
        assert_eq!(CatalogResource::Packages.singular(), "package");
    }
}
