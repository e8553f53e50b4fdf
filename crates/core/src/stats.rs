//! Summary statistics over the visible rows of a list page.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{CustomerStatus, NormalizedStatus};
use crate::views::{CustomerView, DeliveryView, HasStatus, OrderView};

/// Per-status counts plus a summed amount.
///
/// Every variant of `S` has an entry (possibly zero), in `S::ALL` order.
/// Because status normalization is total, each row lands in exactly one
/// bucket and the counts always add up to `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary<S: NormalizedStatus> {
    counts: Vec<(S, usize)>,
    total: usize,
    amount: Decimal,
}

impl<S: NormalizedStatus> StatusSummary<S> {
    /// Summarize `items`, summing `amount_of` per row.
    ///
    /// The amount saturates at the `Decimal` bounds instead of overflowing.
    pub fn compute<T>(items: &[T], amount_of: impl Fn(&T) -> Decimal) -> Self
    where
        T: HasStatus<Status = S>,
    {
        let mut counts: Vec<(S, usize)> = S::ALL.iter().map(|s| (*s, 0)).collect();
        let mut amount = Decimal::ZERO;

        for item in items {
            let status = item.status();
            if let Some(slot) = counts.iter_mut().find(|(s, _)| *s == status) {
                slot.1 += 1;
            }
            amount = amount.saturating_add(amount_of(item));
        }

        Self {
            counts,
            total: items.len(),
            amount,
        }
    }

    /// Count for one status.
    #[must_use]
    pub fn count(&self, status: S) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }

    /// All `(status, count)` pairs in display order.
    #[must_use]
    pub fn counts(&self) -> &[(S, usize)] {
        &self.counts
    }

    /// Number of rows summarized.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Sum of the amount field.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Customer page header.
pub type CustomerSummary = StatusSummary<CustomerStatus>;

impl CustomerSummary {
    #[must_use]
    pub fn active(&self) -> usize {
        self.count(CustomerStatus::Active)
    }

    #[must_use]
    pub fn inactive(&self) -> usize {
        self.count(CustomerStatus::Inactive)
    }

    /// Lifetime spend across the summarized customers.
    #[must_use]
    pub const fn total_spent(&self) -> Decimal {
        self.amount
    }
}

/// Customer page header: counts by standing plus lifetime spend.
#[must_use]
pub fn customer_summary(items: &[CustomerView]) -> CustomerSummary {
    StatusSummary::compute(items, |c| c.total_spent)
}

/// Order page header: counts by status plus revenue.
#[must_use]
pub fn order_summary(items: &[OrderView]) -> StatusSummary<crate::types::OrderStatus> {
    StatusSummary::compute(items, |o| o.amount)
}

/// Delivery board header: counts by status.
#[must_use]
pub fn delivery_summary(items: &[DeliveryView]) -> StatusSummary<crate::types::DeliveryStatus> {
    StatusSummary::compute(items, |_| Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{DeliveryStatus, OrderStatus};
    use crate::views::{normalize_customer, normalize_delivery, normalize_order};

    #[test]
    fn test_counts_sum_to_length_including_unknown_statuses() {
        let deliveries: Vec<_> = [
            "pending",
            "out_for_delivery",
            "delivered",
            "canceled",
            "teleported",
            "",
        ]
        .iter()
        .map(|s| normalize_delivery(&json!({"status": s})))
        .collect();

        let summary = delivery_summary(&deliveries);
        let sum: usize = summary.counts().iter().map(|(_, n)| n).sum();
        assert_eq!(sum, deliveries.len());
        assert_eq!(summary.total(), 6);
        assert_eq!(summary.count(DeliveryStatus::Pending), 3);
        assert_eq!(summary.count(DeliveryStatus::InProgress), 1);
        assert_eq!(summary.count(DeliveryStatus::Completed), 1);
        assert_eq!(summary.count(DeliveryStatus::Cancelled), 1);
    }

    #[test]
    fn test_order_revenue() {
        let orders: Vec<_> = [
            json!({"amount": 100_000, "status": "paid"}),
            json!({"amount": "250000", "status": "delivered"}),
            json!({"status": "cancelled"}),
        ]
        .iter()
        .map(normalize_order)
        .collect();

        let summary = order_summary(&orders);
        assert_eq!(summary.amount(), Decimal::from(350_000));
        assert_eq!(summary.count(OrderStatus::Confirmed), 1);
        assert_eq!(summary.count(OrderStatus::Delivered), 1);
        assert_eq!(summary.count(OrderStatus::Cancelled), 1);
        assert_eq!(summary.count(OrderStatus::Shipping), 0);
    }

    #[test]
    fn test_customer_spend_and_standing() {
        let customers: Vec<_> = [
            json!({"totalSpent": 1_000, "status": "active"}),
            json!({"totalSpent": 500, "status": "inactive"}),
            json!({}),
        ]
        .iter()
        .map(normalize_customer)
        .collect();

        let summary = customer_summary(&customers);
        assert_eq!(summary.active(), 2);
        assert_eq!(summary.inactive(), 1);
        assert_eq!(summary.total_spent(), Decimal::from(1_500));
    }

    #[test]
    fn test_spend_near_decimal_max_saturates() {
        let customers: Vec<_> = [
            json!({"totalSpent": "79228162514264337593543950335"}),
            json!({"totalSpent": "79228162514264337593543950335"}),
            json!({"totalSpent": 12}),
        ]
        .iter()
        .map(normalize_customer)
        .collect();

        let summary = customer_summary(&customers);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.total_spent(), Decimal::MAX);
    }

    #[test]
    fn test_empty_list() {
        let summary = order_summary(&[]);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.counts().len(), OrderStatus::ALL.len());
        assert_eq!(summary.amount(), Decimal::ZERO);
    }
}
