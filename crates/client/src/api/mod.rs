//! Domain façades over the Petalbox REST backend.
//!
//! Each submodule adds an `impl ApiClient` block for one area of the
//! backend. Every method is a single REST call; list and detail responses are
//! run through the core normalizers so callers only see view-models.
//!
//! | Module | Endpoints |
//! |--------|-----------|
//! | [`auth`] | `/auth/*` |
//! | [`user`] | `/users/*` |
//! | [`subscription`] | `/packages`, `/subscriptions` |
//! | [`admin`] | `/admin/*` |
//! | [`staff`] | `/staff/*` |
//! | [`payment`] | `/payments/*` |

pub mod admin;
pub mod auth;
pub mod payment;
pub mod staff;
pub mod subscription;
pub mod user;

pub use admin::CatalogResource;
pub use auth::RegisterRequest;
pub use payment::{PaymentRedirect, PaymentVerification};
pub use staff::ContactLog;
pub use subscription::NewSubscription;
pub use user::ProfileUpdate;

use petalbox_core::{extract_list, extract_object, normalize_all};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Body for every status-change endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct StatusBody<'a> {
    pub status: &'a str,
}

/// Percent-encode one path segment.
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Unwrap a list envelope.
///
/// A response with no list in it is a malformed payload, not an empty list.
pub(crate) fn items_of(value: Value, keys: &[&str]) -> Result<Vec<Value>, ApiError> {
    extract_list(value, keys).ok_or_else(|| {
        tracing::warn!(?keys, "Response carried no list");
        ApiError::Decode(format!("expected a list under one of {keys:?}"))
    })
}

/// Unwrap a list envelope and normalize each element.
pub(crate) fn list_of<T>(
    value: Value,
    keys: &[&str],
    normalize: fn(&Value) -> T,
) -> Result<Vec<T>, ApiError> {
    Ok(normalize_all(&items_of(value, keys)?, normalize))
}

/// Unwrap a single-object envelope and normalize it.
pub(crate) fn one_of<T>(value: Value, keys: &[&str], normalize: fn(&Value) -> T) -> T {
    normalize(&extract_object(value, keys))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petalbox_core::{OrderStatus, normalize_order};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("PB-1"), "PB-1");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_list_and_one_normalize() {
        let orders = list_of(
            json!({"data": {"orders": [{"id": 1, "status": "paid"}]}}),
            &["orders"],
            normalize_order,
        )
        .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders.first().unwrap().status, OrderStatus::Confirmed);

        let order = one_of(json!({"order": {"id": 9}}), &["order"], normalize_order);
        assert_eq!(order.id, "9");
    }

    #[test]
    fn test_list_without_items_is_decode_error() {
        let err = list_of(json!({"data": "oops"}), &["orders"], normalize_order).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(
            err.user_message(),
            "The server sent an unexpected response."
        );

        let empty = list_of(json!({"orders": []}), &["orders"], normalize_order).unwrap();
        assert!(empty.is_empty());
    }
}
