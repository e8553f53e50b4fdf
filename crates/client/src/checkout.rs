//! Turning the local cart into subscriptions and a payment.

use petalbox_core::{Cart, Payload};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::api::{NewSubscription, PaymentRedirect};
use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("The cart is empty")]
    EmptyCart,

    /// A line failed after `created` subscriptions were already placed.
    #[error("Checkout failed after {created} subscription(s): {source}")]
    Partial {
        created: usize,
        #[source]
        source: ApiError,
    },
}

impl CheckoutError {
    /// The inline message a page shows.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::Partial { source, .. } => source.user_message(),
        }
    }
}

/// What checkout placed.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub subscriptions: Vec<Value>,
    pub payment: PaymentRedirect,
}

impl CheckoutOutcome {
    /// Backend ids of the created subscriptions.
    #[must_use]
    pub fn subscription_ids(&self) -> Vec<String> {
        self.subscriptions
            .iter()
            .filter_map(|s| Payload::new(s).text(&["id", "_id", "subscriptionId"]))
            .collect()
    }
}

impl ApiClient {
    /// Create one subscription per cart line, then a payment for the subtotal.
    ///
    /// Stops at the first failure. The cart itself is not modified; the
    /// caller clears it once the outcome is in hand.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` for an empty cart, or `Partial` with the number of
    /// subscriptions already created when a call fails.
    #[instrument(skip(self, cart), fields(lines = cart.lines().len(), subtotal = %cart.subtotal()))]
    pub async fn checkout(
        &self,
        cart: &Cart,
        delivery_address: Option<&str>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut subscriptions = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let request = NewSubscription {
                package_id: line.package_id.clone(),
                quantity: line.quantity,
                start_date: None,
                delivery_address: delivery_address.map(str::to_string),
                notes: None,
            };
            let created = self
                .create_subscription(&request)
                .await
                .map_err(|source| CheckoutError::Partial {
                    created: subscriptions.len(),
                    source,
                })?;
            subscriptions.push(created);
        }

        let order_info = order_info(cart);
        let payment = self
            .create_payment(cart.subtotal(), &order_info)
            .await
            .map_err(|source| CheckoutError::Partial {
                created: subscriptions.len(),
                source,
            })?;

        tracing::info!(subscriptions = subscriptions.len(), "Checkout placed");
        Ok(CheckoutOutcome {
            subscriptions,
            payment,
        })
    }
}

fn order_info(cart: &Cart) -> String {
    let names: Vec<String> = cart
        .lines()
        .iter()
        .map(|l| format!("{} x{}", l.name, l.quantity))
        .collect();
    format!("Petalbox order: {}", names.join(", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petalbox_core::normalize_package;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_info_lists_lines() {
        let mut cart = Cart::new();
        cart.add(&normalize_package(&json!({"id": "a", "name": "Weekly Bloom", "price": 1})), 2)
            .unwrap();
        cart.add(&normalize_package(&json!({"id": "b", "name": "Rose Box", "price": 1})), 1)
            .unwrap();
        assert_eq!(
            order_info(&cart),
            "Petalbox order: Weekly Bloom x2, Rose Box x1"
        );
    }

    #[test]
    fn test_subscription_ids() {
        let outcome = CheckoutOutcome {
            subscriptions: vec![json!({"id": 1}), json!({"_id": "s2"}), json!({})],
            payment: PaymentRedirect {
                payment_url: None,
                raw: json!({}),
            },
        };
        assert_eq!(outcome.subscription_ids(), vec!["1", "s2"]);
    }
}
