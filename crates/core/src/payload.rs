//! Coalescing reads over loosely-typed backend payloads.
//!
//! Different endpoints name the same attribute differently (`name`,
//! `fullName`, `customer.name`, ...). A [`Payload`] is read with an ordered
//! list of candidate dotted paths; the first candidate holding a usable value
//! wins. A path that walks through a missing node, `null`, or a non-object
//! simply yields nothing, so reads never fail.
//!
//! List responses come wrapped in a handful of envelope shapes; [`Envelope`]
//! models those as a sum type and [`extract_list`] unwraps them.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Display placeholder for missing text.
pub const PLACEHOLDER: &str = "—";

/// Borrowed view over a JSON payload with coalescing accessors.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a>(&'a Value);

impl<'a> Payload<'a> {
    /// Wrap a JSON value.
    #[must_use]
    pub const fn new(value: &'a Value) -> Self {
        Self(value)
    }

    /// The wrapped value.
    #[must_use]
    pub const fn value(&self) -> &'a Value {
        self.0
    }

    /// Resolve a dotted path (`"customer.address.street"`, `"items.0.name"`).
    ///
    /// Numeric segments index into arrays.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(self.0, |node, key| match node {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// First candidate that resolves to a non-null value.
    #[must_use]
    pub fn first(&self, paths: &[&str]) -> Option<&'a Value> {
        paths
            .iter()
            .filter_map(|p| self.get(p))
            .find(|v| !v.is_null())
    }

    /// First candidate rendering as non-empty text.
    ///
    /// Numbers and booleans are stringified so numeric ids are accepted.
    #[must_use]
    pub fn text(&self, paths: &[&str]) -> Option<String> {
        paths.iter().filter_map(|p| self.get(p)).find_map(as_text)
    }

    /// [`Self::text`] with the display placeholder as fallback.
    #[must_use]
    pub fn text_or_placeholder(&self, paths: &[&str]) -> String {
        self.text(paths).unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// First candidate parseable as a decimal (JSON number or numeric string).
    #[must_use]
    pub fn decimal(&self, paths: &[&str]) -> Option<Decimal> {
        paths.iter().filter_map(|p| self.get(p)).find_map(as_decimal)
    }

    /// First candidate parseable as a finite float.
    ///
    /// `"NaN"` and `"inf"` are rejected so aggregates stay serializable.
    #[must_use]
    pub fn float(&self, paths: &[&str]) -> Option<f64> {
        paths.iter().filter_map(|p| self.get(p)).find_map(as_float)
    }

    /// First candidate usable as a non-negative count.
    ///
    /// Arrays count as their length, so `orders: [...]` works as an order count.
    #[must_use]
    pub fn count(&self, paths: &[&str]) -> Option<u32> {
        paths.iter().filter_map(|p| self.get(p)).find_map(|v| match v {
            Value::Array(items) => u32::try_from(items.len()).ok(),
            other => as_float(other)
                .filter(|n| *n >= 0.0)
                .map(|n| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    // Finite and non-negative; saturates at u32::MAX.
                    let n = n.round().min(f64::from(u32::MAX)) as u32;
                    n
                }),
        })
    }

    /// First candidate that is a boolean (or a `"true"`/`"false"` string).
    #[must_use]
    pub fn flag(&self, paths: &[&str]) -> Option<bool> {
        paths.iter().filter_map(|p| self.get(p)).find_map(|v| match v {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    /// First candidate holding text, truncated to the `YYYY-MM-DD` day.
    #[must_use]
    pub fn date(&self, paths: &[&str]) -> Option<String> {
        self.text(paths).map(|s| day_of(&s))
    }

    /// First candidate that is an array.
    #[must_use]
    pub fn array(&self, paths: &[&str]) -> Option<&'a [Value]> {
        paths
            .iter()
            .filter_map(|p| self.get(p))
            .find_map(|v| v.as_array().map(Vec::as_slice))
    }

    /// Nested payload at the first candidate that is an object.
    #[must_use]
    pub fn object(&self, paths: &[&str]) -> Option<Self> {
        paths
            .iter()
            .filter_map(|p| self.get(p))
            .find(|v| v.is_object())
            .map(Self)
    }
}

/// Truncate an ISO-8601 timestamp to its calendar day.
///
/// Strings that do not start with a `YYYY-MM-DD` prefix are returned trimmed.
#[must_use]
pub fn day_of(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.get(..10) {
        Some(day) if chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok() => {
            day.to_string()
        }
        _ => trimmed.to_string(),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_u64().map(Decimal::from))
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

// =============================================================================
// List envelopes
// =============================================================================

/// The list envelope shapes the backend is known to return.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    /// `[ ... ]`
    Bare(Vec<Value>),
    /// `{ "data": [ ... ] }`
    Data { data: Vec<Value> },
    /// `{ "data": { "<key>": [ ... ], ... } }`
    NestedData { data: Map<String, Value> },
    /// `{ "<key>": [ ... ] }`, `{ "items": [...] }`, `{ "results": [...] }`
    Keyed(Map<String, Value>),
}

impl Envelope {
    /// Unwrap the item list, looking for `keys` (then `items`/`results`/`rows`)
    /// in keyed shapes. `None` when no candidate key holds an array.
    #[must_use]
    pub fn into_items(self, keys: &[&str]) -> Option<Vec<Value>> {
        match self {
            Self::Bare(items) | Self::Data { data: items } => Some(items),
            Self::NestedData { data: map } | Self::Keyed(map) => take_keyed(map, keys),
        }
    }
}

fn take_keyed(mut map: Map<String, Value>, keys: &[&str]) -> Option<Vec<Value>> {
    keys.iter()
        .chain(["items", "results", "rows"].iter())
        .find_map(|key| match map.remove(*key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        })
}

/// Extract the item list from any supported envelope.
///
/// Returns `None` for shapes that carry no list (`"oops"`, `{"data": 3}`,
/// `{"orders": "none"}`), so callers can report a malformed response instead
/// of showing an empty one.
#[must_use]
pub fn extract_list(value: Value, keys: &[&str]) -> Option<Vec<Value>> {
    Envelope::deserialize(value)
        .ok()
        .and_then(|env| env.into_items(keys))
}

/// Unwrap a single-object response (`{ "data": {...} }`, `{ "<key>": {...} }` or bare).
#[must_use]
pub fn extract_object(value: Value, keys: &[&str]) -> Value {
    match value {
        Value::Object(mut map) => {
            for key in keys.iter().chain(["data"].iter()) {
                if matches!(map.get(*key), Some(Value::Object(_))) {
                    return map.remove(*key).unwrap_or(Value::Null);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_first_candidate_wins() {
        let v = json!({"fullName": "Lan", "name": "", "customer": {"name": "Hoa"}});
        let p = Payload::new(&v);
        assert_eq!(
            p.text(&["name", "fullName", "customer.name"]).as_deref(),
            Some("Lan")
        );
        assert_eq!(p.text(&["customer.name", "fullName"]).as_deref(), Some("Hoa"));
    }

    #[test]
    fn test_missing_nested_paths_are_none() {
        let v = json!({"customer": null, "driver": "Minh", "items": [1, 2]});
        let p = Payload::new(&v);
        assert!(p.text(&["customer.name"]).is_none());
        assert!(p.text(&["driver.name"]).is_none());
        assert!(p.text(&["items.5"]).is_none());
        assert_eq!(p.text(&["items.1"]).as_deref(), Some("2"));
        assert_eq!(p.text_or_placeholder(&["nope"]), PLACEHOLDER);
    }

    #[test]
    fn test_numbers_from_strings_and_numbers() {
        let v = json!({"a": "1,250,000", "b": 42.5, "c": "x", "d": 7});
        let p = Payload::new(&v);
        assert_eq!(p.decimal(&["a"]), Some(Decimal::new(1_250_000, 0)));
        assert_eq!(p.decimal(&["c", "d"]), Some(Decimal::from(7)));
        assert_eq!(p.float(&["b"]), Some(42.5));
        assert_eq!(p.count(&["b"]), Some(43));
    }

    #[test]
    fn test_count_accepts_arrays_and_rejects_negative() {
        let v = json!({"orders": [{}, {}, {}], "neg": -3});
        let p = Payload::new(&v);
        assert_eq!(p.count(&["orders"]), Some(3));
        assert_eq!(p.count(&["neg"]), None);
    }

    #[test]
    fn test_date_truncates_to_day() {
        let v = json!({"createdAt": "2024-03-08T09:15:00.000Z", "other": "soon"});
        let p = Payload::new(&v);
        assert_eq!(p.date(&["createdAt"]).as_deref(), Some("2024-03-08"));
        assert_eq!(p.date(&["other"]).as_deref(), Some("soon"));
    }

    #[test]
    fn test_flag_parsing() {
        let v = json!({"a": true, "b": "false", "c": "maybe"});
        let p = Payload::new(&v);
        assert_eq!(p.flag(&["a"]), Some(true));
        assert_eq!(p.flag(&["c", "b"]), Some(false));
    }

    #[test]
    fn test_envelope_shapes() {
        let bare = json!([{"id": 1}]);
        let data = json!({"data": [{"id": 1}]});
        let nested = json!({"success": true, "data": {"customers": [{"id": 1}], "total": 1}});
        let keyed = json!({"orders": [{"id": 1}]});
        let items = json!({"items": [{"id": 1}], "page": 1});

        assert_eq!(extract_list(bare, &[]).unwrap().len(), 1);
        assert_eq!(extract_list(data, &[]).unwrap().len(), 1);
        assert_eq!(extract_list(nested, &["customers"]).unwrap().len(), 1);
        assert_eq!(extract_list(keyed, &["orders"]).unwrap().len(), 1);
        assert_eq!(extract_list(items, &["orders"]).unwrap().len(), 1);
        assert_eq!(extract_list(json!({"data": []}), &[]), Some(Vec::new()));
    }

    #[test]
    fn test_envelope_unknown_shape_is_rejected() {
        assert_eq!(extract_list(json!("oops"), &["orders"]), None);
        assert_eq!(extract_list(json!({"data": "oops"}), &["orders"]), None);
        assert_eq!(extract_list(json!({"orders": "none"}), &["orders"]), None);
        assert_eq!(extract_list(Value::Null, &[]), None);
    }

    #[test]
    fn test_non_finite_numbers_are_ignored() {
        let v = json!({"nan": "NaN", "inf": "inf", "neg": "-infinity", "ok": "2.5"});
        let p = Payload::new(&v);
        assert_eq!(p.float(&["nan"]), None);
        assert_eq!(p.float(&["inf", "neg", "ok"]), Some(2.5));
        assert_eq!(p.count(&["nan", "inf"]), None);
    }

    #[test]
    fn test_extreme_numbers_saturate_or_parse() {
        let v = json!({
            "huge": 1e300,
            "big": 4_000_000_000_u64,
            "max": "79228162514264337593543950335"
        });
        let p = Payload::new(&v);
        assert_eq!(p.count(&["huge"]), Some(u32::MAX));
        assert_eq!(p.count(&["big"]), Some(4_000_000_000));
        assert_eq!(p.decimal(&["max"]), Some(Decimal::MAX));
    }

    #[test]
    fn test_extract_object() {
        let wrapped = json!({"success": true, "data": {"id": 5}});
        assert_eq!(extract_object(wrapped, &["user"]), json!({"id": 5}));
        let keyed = json!({"user": {"id": 6}, "token": "t"});
        assert_eq!(extract_object(keyed, &["user"]), json!({"id": 6}));
        let bare = json!({"id": 7});
        assert_eq!(extract_object(bare.clone(), &["user"]), bare);
    }
}
