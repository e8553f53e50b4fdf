//! Subscription package (catalogue) view-model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Searchable;
use crate::payload::{PLACEHOLDER, Payload};

const ID: &[&str] = &["id", "_id", "packageId", "package_id"];
const NAME: &[&str] = &["name", "title", "packageName"];
const DESCRIPTION: &[&str] = &["description", "desc", "summary"];
const PRICE: &[&str] = &["price", "amount", "monthlyPrice", "pricePerMonth"];
const DURATION: &[&str] = &[
    "durationLabel",
    "duration",
    "frequency",
    "deliveryFrequency",
    "period",
];
const IMAGE: &[&str] = &["imageUrl", "image_url", "image", "thumbnail", "images.0"];
const FLOWERS: &[&str] = &["flowers", "flowerTypes", "items"];
const FLOWER_NAME: &[&str] = &["name", "flower.name", "title"];
const ACTIVE: &[&str] = &["isActive", "is_active", "active", "available"];

/// A package card in the storefront catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_label: String,
    pub image_url: Option<String>,
    pub flowers: Vec<String>,
    pub active: bool,
}

/// Build a [`PackageView`] from any package payload shape.
#[must_use]
pub fn normalize_package(raw: &Value) -> PackageView {
    let p = Payload::new(raw);

    let flowers = p
        .array(FLOWERS)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            other => Payload::new(other).text(FLOWER_NAME),
        })
        .collect();

    PackageView {
        id: p.text_or_placeholder(ID),
        name: p.text_or_placeholder(NAME),
        description: p.text_or_placeholder(DESCRIPTION),
        price: p.decimal(PRICE).unwrap_or(Decimal::ZERO),
        duration_label: p.text_or_placeholder(DURATION),
        image_url: p.text(IMAGE),
        flowers,
        active: p.flag(ACTIVE).unwrap_or(true),
    }
}

impl PackageView {
    /// Whether the package has a usable id for cart and subscription calls.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.active && self.id != PLACEHOLDER
    }
}

impl Searchable for PackageView {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.flowers.iter().map(String::as_str));
        fields
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_package_with_flower_objects() {
        let pkg = normalize_package(&json!({
            "_id": "p1",
            "name": "Weekly Bloom",
            "price": "350000",
            "duration": "weekly",
            "images": ["https://cdn.example/bloom.jpg"],
            "flowers": [{"name": "Rose"}, "Tulip", {"flower": {"name": "Lily"}}, {}],
            "isActive": true
        }));
        assert_eq!(pkg.id, "p1");
        assert_eq!(pkg.price, Decimal::from(350_000));
        assert_eq!(pkg.image_url.as_deref(), Some("https://cdn.example/bloom.jpg"));
        assert_eq!(pkg.flowers, vec!["Rose", "Tulip", "Lily"]);
        assert!(pkg.is_orderable());
    }

    #[test]
    fn test_inactive_or_missing_id_not_orderable() {
        assert!(!normalize_package(&json!({"id": 1, "active": false})).is_orderable());
        assert!(!normalize_package(&json!({"name": "x"})).is_orderable());
    }
}
