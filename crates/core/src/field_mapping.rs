//! Field mappings: how each template field gets its value, and the
//! conversion of a mapping list into an autofill [`Dataset`].

use serde::{Deserialize, Serialize};

use crate::dataset::{discount_text, Dataset, DatasetValue, FieldType, TemplateField};
use crate::error::CoreError;
use crate::product::Product;

/// Where a mapped value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Product,
    Discount,
    Custom,
}

/// Which product attribute a product-sourced mapping reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Name,
    Price,
    Image,
}

/// A mapped value: plain text, or a reference to an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingValue {
    Text(String),
    Asset { asset_id: String },
}

impl MappingValue {
    /// The raw string carried by the value (text or asset id).
    fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Asset { asset_id } => asset_id,
        }
    }
}

/// One template field and the value it should be filled with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub template_field_name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MappingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MappingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_field: Option<ProductField>,
}

/// Convert a mapping list into a dataset.
///
/// Every mapping must carry a non-empty value. Image mappings always
/// produce an `asset_id`, whether the value was given as an asset
/// reference or a bare id. Chart and unknown field types are rejected.
/// Nothing here touches the network, so failures surface before any
/// job is submitted.
pub fn build_dataset(mappings: &[FieldMapping]) -> Result<Dataset, CoreError> {
    if mappings.is_empty() {
        return Err(CoreError::Validation(
            "At least one field mapping is required".into(),
        ));
    }

    let mut dataset = Dataset::new();

    for mapping in mappings {
        let name = &mapping.template_field_name;
        let raw = mapping
            .value
            .as_ref()
            .map(MappingValue::as_str)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::Validation(format!("Field \"{name}\" is missing a value")))?;

        let value = match mapping.field_type {
            FieldType::Text => DatasetValue::text(raw),
            FieldType::Image => DatasetValue::image(raw),
            other => {
                return Err(CoreError::UnsupportedFieldType {
                    field: name.clone(),
                    field_type: other.to_string(),
                })
            }
        };

        dataset.insert(name.clone(), value);
    }

    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Drafts (form state before values are resolved)
// ---------------------------------------------------------------------------

/// Form-level mapping choice for a single template field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDraft {
    pub template_field_name: String,
    pub field_type: FieldType,
    pub source: MappingSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_field: Option<ProductField>,
    #[serde(default)]
    pub custom_value: String,
}

impl MappingDraft {
    /// Whether resolving this draft needs the product image uploaded first.
    pub fn needs_product_image(&self) -> bool {
        self.source == MappingSource::Product && self.product_field == Some(ProductField::Image)
    }

    /// Resolve the draft into a concrete mapping.
    ///
    /// `image_asset_id` is the uploaded product image, if any. Returns
    /// `None` when the value cannot be produced (no product selected, or
    /// the image was not uploaded).
    pub fn resolve(
        &self,
        product: Option<&Product>,
        discount: &str,
        image_asset_id: Option<&str>,
    ) -> Option<FieldMapping> {
        let value = match self.source {
            MappingSource::Product => {
                let product = product?;
                match self.product_field? {
                    ProductField::Name => MappingValue::Text(product.name.clone()),
                    ProductField::Price => MappingValue::Text(product.display_price()),
                    ProductField::Image => MappingValue::Asset {
                        asset_id: image_asset_id?.to_string(),
                    },
                }
            }
            MappingSource::Discount => MappingValue::Text(discount_text(discount)),
            MappingSource::Custom => MappingValue::Text(self.custom_value.clone()),
        };

        Some(FieldMapping {
            template_field_name: self.template_field_name.clone(),
            field_type: self.field_type,
            value: Some(value),
            source: Some(self.source),
            product_field: self.product_field,
        })
    }
}

/// Guess a draft for a field from its name.
///
/// `name`/`title` map to the product name, `price`/`cost` to the price,
/// `image`/`photo`/`picture` to the product image and `discount`/`sale`
/// to the discount line. Anything else becomes an empty custom value.
pub fn suggest_mapping(field: &TemplateField) -> MappingDraft {
    let lower = field.field_name.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    let (source, product_field) = if has(&["name", "title"]) {
        (MappingSource::Product, Some(ProductField::Name))
    } else if has(&["price", "cost"]) {
        (MappingSource::Product, Some(ProductField::Price))
    } else if has(&["image", "photo", "picture"]) {
        (MappingSource::Product, Some(ProductField::Image))
    } else if has(&["discount", "sale"]) {
        (MappingSource::Discount, None)
    } else {
        (MappingSource::Custom, None)
    };

    MappingDraft {
        template_field_name: field.field_name.clone(),
        field_type: field.field_type,
        source,
        product_field,
        custom_value: String::new(),
    }
}

pub fn suggest_mappings(fields: &[TemplateField]) -> Vec<MappingDraft> {
    fields.iter().map(suggest_mapping).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn mapping(name: &str, ty: FieldType, value: Option<MappingValue>) -> FieldMapping {
        FieldMapping {
            template_field_name: name.into(),
            field_type: ty,
            value,
            source: Some(MappingSource::Custom),
            product_field: None,
        }
    }

    fn text(v: &str) -> Option<MappingValue> {
        Some(MappingValue::Text(v.into()))
    }

    fn product() -> Product {
        Product {
            id: 3,
            name: "Headphones".into(),
            price: 129.0,
            image_url: "https://example.com/h.png".into(),
        }
    }

    #[test]
    fn dataset_types_follow_mapping_types() {
        let mappings = vec![
            mapping("headline", FieldType::Text, text("Big sale")),
            mapping(
                "hero",
                FieldType::Image,
                Some(MappingValue::Asset { asset_id: "A1".into() }),
            ),
            mapping("logo", FieldType::Image, text("A2")),
        ];

        let dataset = build_dataset(&mappings).unwrap();

        for m in &mappings {
            assert_eq!(dataset[&m.template_field_name].field_type(), m.field_type);
        }
        assert_eq!(dataset["hero"], DatasetValue::image("A1"));
        assert_eq!(dataset["logo"], DatasetValue::image("A2"));
        assert_eq!(dataset["headline"], DatasetValue::text("Big sale"));
    }

    #[test]
    fn empty_mapping_list_rejected() {
        assert_matches!(build_dataset(&[]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn missing_value_rejected_with_field_name() {
        let err = build_dataset(&[mapping("headline", FieldType::Text, None)]).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("headline"));

        let err = build_dataset(&[mapping("headline", FieldType::Text, text(""))]).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn whitespace_value_is_kept_verbatim() {
        let dataset = build_dataset(&[mapping("spacer", FieldType::Text, text("  "))]).unwrap();
        assert_eq!(dataset["spacer"], DatasetValue::text("  "));
    }

    #[test]
    fn chart_fields_unsupported() {
        let err = build_dataset(&[mapping("sales", FieldType::Chart, text("1,2,3"))]).unwrap_err();
        assert_matches!(err, CoreError::UnsupportedFieldType { field, field_type } => {
            assert_eq!(field, "sales");
            assert_eq!(field_type, "chart");
        });
    }

    #[test]
    fn mapping_value_deserializes_both_shapes() {
        let m: FieldMapping = serde_json::from_value(serde_json::json!({
            "templateFieldName": "hero",
            "fieldType": "image",
            "value": { "asset_id": "A9" }
        }))
        .unwrap();
        assert_eq!(m.value, Some(MappingValue::Asset { asset_id: "A9".into() }));

        let m: FieldMapping = serde_json::from_value(serde_json::json!({
            "templateFieldName": "title",
            "fieldType": "text",
            "value": "Hello"
        }))
        .unwrap();
        assert_eq!(m.value, text("Hello"));
    }

    #[test]
    fn suggestions_follow_field_names() {
        let field = |name: &str, ty| TemplateField {
            field_name: name.into(),
            field_type: ty,
        };

        let drafts = suggest_mappings(&[
            field("Product_Title", FieldType::Text),
            field("unit_cost", FieldType::Text),
            field("hero_photo", FieldType::Image),
            field("sale_badge", FieldType::Text),
            field("footer", FieldType::Text),
        ]);

        assert_eq!(drafts[0].product_field, Some(ProductField::Name));
        assert_eq!(drafts[1].product_field, Some(ProductField::Price));
        assert_eq!(drafts[2].product_field, Some(ProductField::Image));
        assert_eq!(drafts[3].source, MappingSource::Discount);
        assert_eq!(drafts[4].source, MappingSource::Custom);
    }

    #[test]
    fn drafts_resolve_to_values() {
        let p = product();
        let draft = |source, product_field, custom: &str| MappingDraft {
            template_field_name: "f".into(),
            field_type: FieldType::Text,
            source,
            product_field,
            custom_value: custom.into(),
        };

        let price = draft(MappingSource::Product, Some(ProductField::Price), "")
            .resolve(Some(&p), "10%", None)
            .unwrap();
        assert_eq!(price.value, text("$129.00"));

        let discount = draft(MappingSource::Discount, None, "")
            .resolve(None, "10%", None)
            .unwrap();
        assert_eq!(discount.value, text("Save 10%"));

        let custom = draft(MappingSource::Custom, None, "Hi")
            .resolve(None, "", None)
            .unwrap();
        assert_eq!(custom.value, text("Hi"));

        let image = draft(MappingSource::Product, Some(ProductField::Image), "");
        assert!(image.needs_product_image());
        assert!(image.resolve(Some(&p), "", None).is_none());
        assert_eq!(
            image.resolve(Some(&p), "", Some("A7")).unwrap().value,
            Some(MappingValue::Asset { asset_id: "A7".into() })
        );

        assert!(draft(MappingSource::Product, Some(ProductField::Name), "")
            .resolve(None, "", None)
            .is_none());
    }
}
