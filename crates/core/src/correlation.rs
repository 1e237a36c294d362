//! Correlation state carried through the external editor round trip.
//!
//! The application appends a base64-encoded JSON blob to the editor URL;
//! the platform hands the same blob back on the return-navigation
//! callback so the application can resume without server-side sessions.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Page the user left from when opening the external editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OriginPage {
    #[serde(rename = "/products")]
    Product,
    #[serde(rename = "/marketing/multiple-designs")]
    MarketingMulti,
    #[serde(rename = "/marketing/single-design")]
    MarketingSingle,
    #[serde(rename = "/brand-templates")]
    BrandTemplateCreator,
}

impl OriginPage {
    /// Front-end path of the page.
    pub fn path(self) -> &'static str {
        match self {
            Self::Product => "/products",
            Self::MarketingMulti => "/marketing/multiple-designs",
            Self::MarketingSingle => "/marketing/single-design",
            Self::BrandTemplateCreator => "/brand-templates",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationState {
    pub origin_page: OriginPage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_product_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_marketing_multi_design_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_templates: Option<Vec<String>>,
}

impl CorrelationState {
    pub fn new(origin_page: OriginPage) -> Self {
        Self {
            origin_page,
            origin_product_id: None,
            origin_marketing_multi_design_ids: None,
            selected_templates: None,
        }
    }

    /// Base64 (standard alphabet, padded) of the JSON representation.
    pub fn encode(&self) -> Result<String, CoreError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| CoreError::Internal(format!("Failed to encode correlation state: {e}")))?;
        Ok(STANDARD.encode(json))
    }

    pub fn decode(encoded: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CoreError::Validation(format!("Correlation state is not base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CoreError::Validation(format!("Correlation state is not valid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn encodes_camel_case_json() {
        let mut state = CorrelationState::new(OriginPage::MarketingMulti);
        state.selected_templates = Some(vec!["T1".into()]);

        let encoded = state.encode().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(&encoded).unwrap()).unwrap();

        assert_eq!(json["originPage"], "/marketing/multiple-designs");
        assert_eq!(json["selectedTemplates"][0], "T1");
        assert!(json.get("originProductId").is_none());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let mut state = CorrelationState::new(OriginPage::Product);
        state.origin_product_id = Some(4);
        let back = CorrelationState::decode(&state.encode().unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(CorrelationState::decode("%%%"), Err(CoreError::Validation(_)));
        let not_json = STANDARD.encode("hello");
        assert_matches!(CorrelationState::decode(&not_json), Err(CoreError::Validation(_)));
    }
}
