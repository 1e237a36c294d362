//! Domain types and pure logic for the storefront design integration.
//!
//! Nothing in this crate performs I/O: products, field mappings, autofill
//! datasets, correlation state and progress estimation are all plain data
//! plus the rules that validate and transform them.

pub mod correlation;
pub mod dataset;
pub mod error;
pub mod field_mapping;
pub mod library;
pub mod product;
pub mod progress;
pub mod types;
