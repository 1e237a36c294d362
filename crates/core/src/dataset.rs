//! Autofill datasets: the typed field-name-to-value payload submitted to
//! fill a brand template's placeholders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::product::Product;

/// Fields a template must expose for a product-based (promo) autofill.
pub const PROMO_REQUIRED_FIELDS: [&str; 3] = ["name", "image", "price"];

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Type of a brand template placeholder field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Image,
    Chart,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Chart => "chart",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template's dataset schema: field name to field type.
pub type DatasetSchema = BTreeMap<String, FieldType>;

/// A named field of a template, in the shape handed to form builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub field_name: String,
    pub field_type: FieldType,
}

/// Flatten a schema into a list of fields, ordered by name.
pub fn schema_fields(schema: &DatasetSchema) -> Vec<TemplateField> {
    schema
        .iter()
        .map(|(name, ty)| TemplateField {
            field_name: name.clone(),
            field_type: *ty,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dataset values
// ---------------------------------------------------------------------------

/// A single typed value in an autofill dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatasetValue {
    Text { text: String },
    Image { asset_id: String },
}

impl DatasetValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(asset_id: impl Into<String>) -> Self {
        Self::Image {
            asset_id: asset_id.into(),
        }
    }

    /// The schema type this value fills.
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text { .. } => FieldType::Text,
            Self::Image { .. } => FieldType::Image,
        }
    }
}

/// Field name to value, submitted with an autofill job. Never persisted.
pub type Dataset = BTreeMap<String, DatasetValue>;

// ---------------------------------------------------------------------------
// Promo datasets
// ---------------------------------------------------------------------------

/// Verify that a template's schema can take a product-based dataset.
///
/// On mismatch, the error lists the missing required fields and every
/// available field as `name (type)`.
pub fn check_promo_schema(schema: &DatasetSchema) -> Result<(), CoreError> {
    let missing: Vec<String> = PROMO_REQUIRED_FIELDS
        .iter()
        .filter(|key| !schema.contains_key(**key))
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let available = schema
        .iter()
        .map(|(name, ty)| format!("{name} ({ty})"))
        .collect();

    Err(CoreError::SchemaMismatch { missing, available })
}

/// Discount line as rendered on marketing material.
pub fn discount_text(discount: &str) -> String {
    format!("Save {discount}")
}

/// Build the fixed four-field promo dataset for a product whose image has
/// already been uploaded as `asset_id`.
pub fn promo_dataset(product: &Product, discount: &str, asset_id: &str) -> Dataset {
    Dataset::from([
        ("name".to_string(), DatasetValue::text(&product.name)),
        ("image".to_string(), DatasetValue::image(asset_id)),
        ("price".to_string(), DatasetValue::text(product.display_price())),
        ("discount".to_string(), DatasetValue::text(discount_text(discount))),
    ])
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn schema(fields: &[(&str, FieldType)]) -> DatasetSchema {
        fields
            .iter()
            .map(|(name, ty)| (name.to_string(), *ty))
            .collect()
    }

    #[test]
    fn promo_schema_accepts_required_fields() {
        let s = schema(&[
            ("name", FieldType::Text),
            ("image", FieldType::Image),
            ("price", FieldType::Text),
            ("extra", FieldType::Chart),
        ]);
        assert!(check_promo_schema(&s).is_ok());
    }

    #[test]
    fn promo_schema_reports_missing_and_available() {
        let s = schema(&[("name", FieldType::Text), ("headline", FieldType::Text)]);
        let err = check_promo_schema(&s).unwrap_err();
        assert_matches!(err, CoreError::SchemaMismatch { missing, available } => {
            assert_eq!(missing, vec!["image", "price"]);
            assert_eq!(available, vec!["headline (text)", "name (text)"]);
        });
    }

    #[test]
    fn promo_dataset_has_four_typed_fields() {
        let product = Product {
            id: 1,
            name: "Tote".into(),
            price: 24.9,
            image_url: "https://example.com/tote.png".into(),
        };
        let data = promo_dataset(&product, "20%", "asset-1");

        assert_eq!(data.len(), 4);
        assert_eq!(data["name"], DatasetValue::text("Tote"));
        assert_eq!(data["image"], DatasetValue::image("asset-1"));
        assert_eq!(data["price"], DatasetValue::text("$24.90"));
        assert_eq!(data["discount"], DatasetValue::text("Save 20%"));
    }

    #[test]
    fn dataset_value_wire_shape() {
        let json = serde_json::to_value(DatasetValue::image("a1")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "image", "asset_id": "a1" }));
    }

    #[test]
    fn unknown_field_type_deserializes() {
        let ty: FieldType = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(ty, FieldType::Unknown);
    }
}
