//! Public package catalogue and customer subscriptions.

use chrono::NaiveDate;
use petalbox_core::{PackageView, extract_object, normalize_package};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{StatusBody, items_of, list_of, one_of, segment};
use crate::error::ApiError;
use crate::http::{ApiClient, RequestOptions};

const PACKAGES: &[&str] = &["packages"];
const PACKAGE: &[&str] = &["package"];
const SUBSCRIPTIONS: &[&str] = &["subscriptions"];
const SUBSCRIPTION: &[&str] = &["subscription"];

/// A subscription order for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub package_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApiClient {
    /// List the packages on sale. Public; no token is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_packages(&self) -> Result<Vec<PackageView>, ApiError> {
        let response = self.get("/packages", RequestOptions::public()).await?;
        let packages = list_of(response, PACKAGES, normalize_package)?;
        tracing::debug!(count = packages.len(), "Fetched packages");
        Ok(packages)
    }

    /// Get one package. Public; no token is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the package is not found or the API request fails.
    #[instrument(skip(self), fields(package_id = %id))]
    pub async fn get_package(&self, id: &str) -> Result<PackageView, ApiError> {
        let path = format!("/packages/{}", segment(id));
        let response = self.get(&path, RequestOptions::public()).await?;
        Ok(one_of(response, PACKAGE, normalize_package))
    }

    /// List the signed-in customer's subscriptions.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_subscriptions(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.get("/subscriptions", RequestOptions::default()).await?;
        items_of(response, SUBSCRIPTIONS)
    }

    /// Get one subscription.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription is not found or the API request fails.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn get_subscription(&self, id: &str) -> Result<Value, ApiError> {
        let path = format!("/subscriptions/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(extract_object(response, SUBSCRIPTION))
    }

    /// Subscribe to a package.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, subscription), fields(package_id = %subscription.package_id))]
    pub async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Value, ApiError> {
        let response = self
            .post("/subscriptions", subscription, RequestOptions::default())
            .await?;
        Ok(extract_object(response, SUBSCRIPTION))
    }

    /// Pause, resume or cancel a subscription.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is rejected or the API request fails.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn update_subscription_status(&self, id: &str, status: &str) -> Result<(), ApiError> {
        let path = format!("/subscriptions/{}/status", segment(id));
        self.patch(&path, &StatusBody { status }, RequestOptions::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_subscription_body() {
        let body = NewSubscription {
            package_id: "p1".into(),
            quantity: 2,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            delivery_address: None,
            notes: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"packageId": "p1", "quantity": 2, "startDate": "2024-06-01"})
        );
    }
}
