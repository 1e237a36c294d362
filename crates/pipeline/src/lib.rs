//! Orchestration on top of the design platform client.
//!
//! - [`autofill`] builds datasets, submits autofill jobs and waits for them.
//! - [`batch`] fans one product out across several templates and reports
//!   per-template outcomes with live progress.
//! - [`templates`] is the brand template gateway and editor hand-off.
//! - [`designs`] covers blank and product-based design creation.
//! - [`assets`] uploads images and records them as recent uploads.

pub mod assets;
pub mod autofill;
pub mod batch;
pub mod designs;
pub mod error;
pub mod progress;
pub mod templates;

pub use error::AutofillError;
