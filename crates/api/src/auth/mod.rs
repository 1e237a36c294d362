//! OAuth token lifecycle and per-request platform clients.

pub mod provider;
pub mod tokens;

pub use provider::{OAuthPlatformProvider, PlatformProvider, StaticPlatformProvider};
pub use tokens::TokenStore;
