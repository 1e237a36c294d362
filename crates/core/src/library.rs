//! Records kept in the local content library and recent-uploads list.

use serde::{Deserialize, Serialize};

use crate::types::EpochMillis;

/// Title given to designs that come back without one.
pub const UNTITLED: &str = "Untitled";

/// A design created through the platform and remembered locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDesign {
    pub id: String,
    pub title: String,
    pub edit_url: String,
    pub created_at: EpochMillis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// An asset uploaded through the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAsset {
    pub id: String,
    pub name: String,
    pub uploaded_at: EpochMillis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}
