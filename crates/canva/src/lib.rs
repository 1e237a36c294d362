//! Canva Connect REST client library.
//!
//! Provides typed request/response models, a [`reqwest`]-based HTTP
//! client, the [`platform::DesignPlatform`] seam used by orchestration
//! code, a generic job polling loop and the OAuth (PKCE) token flow.

pub mod api;
#[cfg(feature = "fake")]
pub mod fake;
pub mod models;
pub mod oauth;
pub mod platform;
pub mod poll;
