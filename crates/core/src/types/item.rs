//! Catalog items and cart lines.
//!
//! Every field is optional on the wire: an absent field stays absent when the
//! record is stored and when it is served back, rather than turning into an
//! empty string or a zero price.

use serde::{Deserialize, Serialize};

use super::Price;

/// A product in the catalog.
///
/// The JSON shape is `{"brand", "price", "type", "category"}`; unknown fields
/// (such as a store-assigned `_id`) are ignored when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Brand name, the lookup key for most operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Product type (e.g. "filter", "menthol").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CatalogItem {
    /// Create an item with only a brand set.
    #[must_use]
    pub fn with_brand(brand: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            ..Self::default()
        }
    }
}

/// A line in the shared cart. Same shape as a catalog item.
pub type CartLine = CatalogItem;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_absent_fields_stay_absent() {
        let item = CatalogItem::with_brand("Camel");
        assert_eq!(serde_json::to_value(&item).unwrap(), json!({"brand": "Camel"}));
    }

    #[test]
    fn test_decodes_full_record_and_ignores_unknown_fields() {
        let item: CatalogItem = serde_json::from_value(json!({
            "_id": "65f0c0ffee",
            "brand": "Marlboro Gold",
            "price": 9.75,
            "type": "filter",
            "category": "premium"
        }))
        .unwrap();

        assert_eq!(item.brand.as_deref(), Some("Marlboro Gold"));
        assert_eq!(item.price.unwrap().amount(), Decimal::new(975, 2));
        assert_eq!(item.kind.as_deref(), Some("filter"));
        assert_eq!(item.category.as_deref(), Some("premium"));
    }

    #[test]
    fn test_null_fields_decode_as_absent() {
        let item: CatalogItem = serde_json::from_value(json!({"brand": null})).unwrap();
        assert_eq!(item, CatalogItem::default());
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        assert!(serde_json::from_value::<CatalogItem>(json!({"price": "cheap"})).is_err());
        assert!(serde_json::from_value::<CatalogItem>(json!({"brand": 42})).is_err());
    }
}
