#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The brand template dataset lacks fields required for a
    /// product-based autofill.
    #[error(
        "Brand template is missing required data fields: {}; available fields: {}",
        join_or_none(.missing),
        join_or_none(.available)
    )]
    SchemaMismatch {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Field \"{field}\" has unsupported type \"{field_type}\"")]
    UnsupportedFieldType { field: String, field_type: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
