//! Payment creation and return-URL verification.
//!
//! The backend brokers the payment gateway; the client only asks for a
//! payment URL and later forwards the gateway's return parameters for
//! verification.

use petalbox_core::{Payload, extract_object};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestOptions};

const PAYMENT_URL: &[&str] = &["paymentUrl", "payment_url", "url", "redirectUrl", "data.paymentUrl"];
const SUCCESS: &[&str] = &["success", "verified", "isSuccess", "valid"];
const MESSAGE: &[&str] = &["message", "status", "responseMessage"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePayment<'a> {
    amount: Decimal,
    order_info: &'a str,
}

/// Where to send the customer to pay.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRedirect {
    pub payment_url: Option<String>,
    pub raw: Value,
}

/// Result of checking a gateway return.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentVerification {
    pub success: bool,
    pub message: Option<String>,
    pub raw: Value,
}

impl ApiClient {
    /// Start a payment of `amount` described by `order_info`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn create_payment(
        &self,
        amount: Decimal,
        order_info: &str,
    ) -> Result<PaymentRedirect, ApiError> {
        let body = CreatePayment { amount, order_info };
        let response = self
            .post("/payments/create", &body, RequestOptions::default())
            .await?;
        let payment_url = Payload::new(&response).text(PAYMENT_URL);
        if payment_url.is_none() {
            tracing::warn!("Payment created without a payment URL");
        }
        Ok(PaymentRedirect {
            payment_url,
            raw: response,
        })
    }

    /// Forward the gateway's return query parameters for verification.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    pub async fn verify_payment(
        &self,
        params: &[(String, String)],
    ) -> Result<PaymentVerification, ApiError> {
        let query: Vec<(&str, String)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        let response = self
            .get_query("/payments/verify", &query, RequestOptions::default())
            .await?;
        Ok(verification_of(response))
    }
}

fn verification_of(response: Value) -> PaymentVerification {
    let body = extract_object(response, &["payment"]);
    let p = Payload::new(&body);
    let success = p.flag(SUCCESS).unwrap_or(false)
        || p.text(&["code", "responseCode", "vnp_ResponseCode"])
            .is_some_and(|code| code == "00");
    PaymentVerification {
        success,
        message: p.text(MESSAGE),
        raw: body,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_verification_shapes() {
        let ok = verification_of(json!({"success": true, "message": "Paid"}));
        assert!(ok.success);
        assert_eq!(ok.message.as_deref(), Some("Paid"));

        let by_code = verification_of(json!({"data": {"code": "00"}}));
        assert!(by_code.success);

        let failed = verification_of(json!({"success": false, "code": "24"}));
        assert!(!failed.success);
    }
}
