//! OAuth 2.0 authorization-code flow with PKCE (`S256`).
//!
//! [`OAuthClient`] builds the authorization URL and talks to the token
//! and revocation endpoints using HTTP basic client authentication.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration as ChronoDuration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shopfront_core::types::Timestamp;

/// Production authorization page.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.canva.com/api/oauth/authorize";

/// Scopes requested by the storefront.
pub const DEFAULT_SCOPES: [&str; 8] = [
    "asset:read",
    "asset:write",
    "brandtemplate:content:read",
    "brandtemplate:meta:read",
    "design:content:read",
    "design:content:write",
    "design:meta:read",
    "profile:read",
];

/// Random bytes behind each PKCE verifier and state value.
const RANDOM_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    /// API root; the token endpoints live under `/v1/oauth`.
    pub api_base_url: String,
    /// Where the platform redirects after the user grants access.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Whether client credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    fn token_url(&self) -> String {
        format!("{}/v1/oauth/token", self.api_base_url.trim_end_matches('/'))
    }

    fn revoke_url(&self) -> String {
        format!("{}/v1/oauth/revoke", self.api_base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("OAuth client credentials are not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token or revocation endpoint returned a non-2xx status.
    #[error("OAuth endpoint returned HTTP {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Invalid authorize URL: {0}")]
    InvalidUrl(String),
}

// ---------------------------------------------------------------------------
// PKCE
// ---------------------------------------------------------------------------

/// A PKCE verifier and its `S256` challenge.
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

pub fn generate_pkce() -> Pkce {
    let verifier = random_token();
    let challenge = challenge_for(&verifier);
    Pkce { verifier, challenge }
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Random URL-safe token used for verifiers and `state`.
pub fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Everything needed to complete the flow once the user comes back.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub expires_at: Timestamp,
}

impl TokenSet {
    /// Whether the access token expires within `skew_secs` from now.
    pub fn is_expired(&self, skew_secs: i64) -> bool {
        Utc::now() + ChronoDuration::seconds(skew_secs) >= self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(r: TokenResponse) -> Self {
        Self {
            access_token: r.access_token,
            refresh_token: r.refresh_token,
            token_type: r.token_type,
            scope: r.scope,
            expires_at: Utc::now() + ChronoDuration::seconds(r.expires_in),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: OAuthConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL with a fresh PKCE pair and state.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest, OAuthError> {
        if !self.config.is_configured() {
            return Err(OAuthError::NotConfigured);
        }

        let pkce = generate_pkce();
        let state = random_token();
        let scope = self.config.scopes.join(" ");

        let url = reqwest::Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("code_challenge", pkce.challenge.as_str()),
                ("code_challenge_method", "s256"),
                ("scope", scope.as_str()),
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("state", state.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
            code_verifier: pkce.verifier,
        })
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, OAuthError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code_verifier", code_verifier),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    /// Obtain a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, OAuthError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    /// Revoke a token (access or refresh).
    pub async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        if !self.config.is_configured() {
            return Err(OAuthError::NotConfigured);
        }

        let response = self
            .http
            .post(self.config.revoke_url())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("token", token)])
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, OAuthError> {
        if !self.config.is_configured() {
            return Err(OAuthError::NotConfigured);
        }

        let response = self
            .http
            .post(self.config.token_url())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let token: TokenResponse = response.json().await?;
        Ok(token.into())
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::warn!(status = status.as_u16(), "OAuth endpoint rejected request");
        Err(OAuthError::Endpoint {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-1".into(),
            client_secret: "secret".into(),
            authorize_url: DEFAULT_AUTHORIZE_URL.into(),
            api_base_url: "https://api.canva.com/rest".into(),
            redirect_uri: "http://127.0.0.1:3001/oauth/redirect".into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn challenge_matches_rfc7636_example() {
        assert_eq!(
            challenge_for("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn random_tokens_differ() {
        let a = random_token();
        let b = random_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn authorization_url_carries_pkce_and_state() {
        let client = OAuthClient::new(config());
        let req = client.authorization_request().unwrap();
        let url = reqwest::Url::parse(&req.url).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["state"], req.state);
        assert_eq!(params["code_challenge"], challenge_for(&req.code_verifier));
        assert_eq!(params["code_challenge_method"], "s256");
        assert!(params["scope"].contains("design:content:write"));
    }

    #[test]
    fn unconfigured_client_refuses() {
        let mut cfg = config();
        cfg.client_secret.clear();
        let client = OAuthClient::new(cfg);
        assert_matches!(client.authorization_request(), Err(OAuthError::NotConfigured));
    }

    #[test]
    fn token_expiry_respects_skew() {
        let token = TokenSet {
            access_token: "a".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            scope: None,
            expires_at: Utc::now() + ChronoDuration::seconds(30),
        };
        assert!(!token.is_expired(0));
        assert!(token.is_expired(60));
    }
}
