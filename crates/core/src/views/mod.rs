//! View-models: stable display shapes built from backend payloads.
//!
//! Each module declares the candidate field paths it reads, in coalescing
//! order, and a `normalize_*` function that never fails. Missing text falls
//! back to [`crate::payload::PLACEHOLDER`], missing numbers to zero.

pub mod customer;
pub mod dashboard;
pub mod delivery;
pub mod order;
pub mod package;

pub use customer::{CustomerView, normalize_customer};
pub use dashboard::{DashboardStats, RecentActivity, normalize_dashboard};
pub use delivery::{DeliveryView, normalize_delivery};
pub use order::{OrderView, normalize_order};
pub use package::{PackageView, normalize_package};

use serde_json::Value;

use crate::payload::{PLACEHOLDER, Payload};
use crate::types::NormalizedStatus;

/// A list row with an identifier and a mutable status.
///
/// Lets page state apply and roll back status edits generically.
pub trait HasStatus {
    type Status: NormalizedStatus;

    fn id(&self) -> &str;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
}

/// Normalize every element of a list payload.
#[must_use]
pub fn normalize_all<T>(items: &[Value], normalize: fn(&Value) -> T) -> Vec<T> {
    items.iter().map(normalize).collect()
}

/// Address parts joined in this order when the backend sends an object.
const ADDRESS_PARTS: &[&str] = &[
    "street",
    "line1",
    "address",
    "ward",
    "district",
    "city",
    "province",
];

/// Render an address that may be a plain string or a structured object.
pub(crate) fn address_text(p: &Payload<'_>, paths: &[&str]) -> String {
    if let Some(text) = p.text(paths) {
        return text;
    }

    p.object(paths)
        .map(|obj| {
            ADDRESS_PARTS
                .iter()
                .filter_map(|part| obj.text(&[*part]))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_address_text_string_and_object() {
        let v = json!({"a": "1 Le Loi", "b": {"street": "2 Pasteur", "city": "Da Nang"}, "c": {}});
        let p = Payload::new(&v);
        assert_eq!(address_text(&p, &["a"]), "1 Le Loi");
        assert_eq!(address_text(&p, &["b"]), "2 Pasteur, Da Nang");
        assert_eq!(address_text(&p, &["c"]), PLACEHOLDER);
        assert_eq!(address_text(&p, &["missing"]), PLACEHOLDER);
    }
}
