//! Status enums for deliveries, orders, dashboard activity and customers.
//!
//! The backend speaks several status vocabularies depending on the endpoint
//! ("out_for_delivery", "Shipped", "in-progress", ...). Each enum here is a
//! small closed set, and [`NormalizedStatus::from_backend`] is total: every
//! input string maps to exactly one variant, unknown input to the default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A closed status enumeration fed from loosely-typed backend strings.
pub trait NormalizedStatus: Copy + Eq + Default + fmt::Debug + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Map a backend status string onto the enumeration.
    ///
    /// Case-insensitive. `-` and spaces are treated as `_`. Unknown or empty
    /// input yields `Self::default()`.
    fn from_backend(raw: &str) -> Self;

    /// Canonical snake_case wire value.
    fn as_str(self) -> &'static str;

    /// Human readable label.
    fn label(self) -> &'static str;
}

/// Canonicalize a raw status token: trim, lowercase, unify separators.
fn canonical(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

// =============================================================================
// Delivery
// =============================================================================

/// Delivery lifecycle state shown on the staff delivery board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl NormalizedStatus for DeliveryStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    fn from_backend(raw: &str) -> Self {
        match canonical(raw).as_str() {
            "in_progress" | "inprogress" | "processing" | "out_for_delivery" | "delivering"
            | "shipping" | "shipped" | "in_transit" | "on_the_way" | "picked_up" => {
                Self::InProgress
            }
            "completed" | "complete" | "delivered" | "done" | "success" | "succeeded" => {
                Self::Completed
            }
            "cancelled" | "canceled" | "failed" | "rejected" | "returned" => Self::Cancelled,
            // pending, scheduled, assigned, new, waiting and anything unknown
            _ => Self::Pending,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipping,
    Delivered,
    Cancelled,
}

impl NormalizedStatus for OrderStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipping,
        Self::Delivered,
        Self::Cancelled,
    ];

    fn from_backend(raw: &str) -> Self {
        match canonical(raw).as_str() {
            "confirmed" | "paid" | "accepted" | "approved" => Self::Confirmed,
            "processing" | "preparing" | "in_progress" | "packing" => Self::Processing,
            "shipping" | "shipped" | "out_for_delivery" | "delivering" | "in_transit" => {
                Self::Shipping
            }
            "delivered" | "completed" | "complete" | "done" => Self::Delivered,
            "cancelled" | "canceled" | "refunded" | "failed" | "rejected" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipping => "Shipping",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

// =============================================================================
// Dashboard activity
// =============================================================================

/// Coarse status used by the dashboard "recent activity" feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl NormalizedStatus for DashboardStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    fn from_backend(raw: &str) -> Self {
        match canonical(raw).as_str() {
            "processing" | "in_progress" | "shipping" | "shipped" | "out_for_delivery"
            | "delivering" => Self::Processing,
            "completed" | "complete" | "delivered" | "done" | "paid" => Self::Completed,
            "cancelled" | "canceled" | "failed" | "refunded" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Customer account standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

impl NormalizedStatus for CustomerStatus {
    const ALL: &'static [Self] = &[Self::Active, Self::Inactive];

    fn from_backend(raw: &str) -> Self {
        match canonical(raw).as_str() {
            "inactive" | "disabled" | "suspended" | "banned" | "blocked" | "cancelled"
            | "canceled" | "false" => Self::Inactive,
            _ => Self::Active,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

macro_rules! impl_status_display {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl std::str::FromStr for $name {
                type Err = std::convert::Infallible;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Ok(Self::from_backend(s))
                }
            }
        )+
    };
}

impl_status_display!(DeliveryStatus, OrderStatus, DashboardStatus, CustomerStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_vocabulary() {
        let cases = [
            ("pending", DeliveryStatus::Pending),
            ("Scheduled", DeliveryStatus::Pending),
            ("assigned", DeliveryStatus::Pending),
            ("out_for_delivery", DeliveryStatus::InProgress),
            ("Out for delivery", DeliveryStatus::InProgress),
            ("in-progress", DeliveryStatus::InProgress),
            ("SHIPPED", DeliveryStatus::InProgress),
            ("delivered", DeliveryStatus::Completed),
            ("completed", DeliveryStatus::Completed),
            ("canceled", DeliveryStatus::Cancelled),
            ("failed", DeliveryStatus::Cancelled),
        ];
        for (raw, expected) in cases {
            assert_eq!(DeliveryStatus::from_backend(raw), expected, "input {raw:?}");
        }
    }

    #[test]
    fn test_order_vocabulary() {
        let cases = [
            ("new", OrderStatus::Pending),
            ("paid", OrderStatus::Confirmed),
            ("Confirmed", OrderStatus::Confirmed),
            ("preparing", OrderStatus::Processing),
            ("in_transit", OrderStatus::Shipping),
            ("completed", OrderStatus::Delivered),
            ("refunded", OrderStatus::Cancelled),
        ];
        for (raw, expected) in cases {
            assert_eq!(OrderStatus::from_backend(raw), expected, "input {raw:?}");
        }
    }

    #[test]
    fn test_unknown_and_empty_map_to_default() {
        for raw in ["", "   ", "???", "archived", "null"] {
            assert_eq!(DeliveryStatus::from_backend(raw), DeliveryStatus::Pending);
            assert_eq!(OrderStatus::from_backend(raw), OrderStatus::Pending);
            assert_eq!(DashboardStatus::from_backend(raw), DashboardStatus::Pending);
            assert_eq!(CustomerStatus::from_backend(raw), CustomerStatus::Active);
        }
    }

    #[test]
    fn test_canonical_values_round_trip() {
        for status in DeliveryStatus::ALL {
            assert_eq!(DeliveryStatus::from_backend(status.as_str()), *status);
        }
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_backend(status.as_str()), *status);
        }
        for status in DashboardStatus::ALL {
            assert_eq!(DashboardStatus::from_backend(status.as_str()), *status);
        }
        for status in CustomerStatus::ALL {
            assert_eq!(CustomerStatus::from_backend(status.as_str()), *status);
        }
    }

    #[test]
    fn test_customer_inactive_markers() {
        assert_eq!(CustomerStatus::from_backend("Disabled"), CustomerStatus::Inactive);
        assert_eq!(CustomerStatus::from_backend("false"), CustomerStatus::Inactive);
        assert_eq!(CustomerStatus::from_backend("vip"), CustomerStatus::Active);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&DeliveryStatus::InProgress).unwrap_or_default();
        assert_eq!(json, "\"in_progress\"");
    }
}
