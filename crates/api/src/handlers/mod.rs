pub mod assets;
pub mod auth;
pub mod autofill;
pub mod brand_templates;
pub mod designs;
pub mod library;
pub mod navigation;
pub mod products;
