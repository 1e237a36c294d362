//! Token storage for the single connected platform account.
//!
//! Tokens are kept in memory and mirrored to the key-value store so a
//! restart does not force the user through the OAuth flow again. Pending
//! authorization requests (state -> PKCE verifier) only live in memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use shopfront_canva::oauth::{OAuthClient, TokenSet};
use shopfront_core::error::CoreError;
use shopfront_library::KeyValueStore;

use crate::error::{AppError, AppResult};

/// Storage key of the persisted token set.
pub const TOKEN_KEY: &str = "oauth_token";

/// Refresh access tokens this many seconds before they expire.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Pending authorization requests kept at most.
const MAX_PENDING: usize = 32;

pub struct TokenStore {
    client: OAuthClient,
    store: Arc<dyn KeyValueStore>,
    current: Mutex<Option<TokenSet>>,
    pending: Mutex<HashMap<String, String>>,
    /// Serializes refreshes so concurrent requests refresh only once.
    refresh_lock: tokio::sync::Mutex<()>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl TokenStore {
    /// Create a token store, restoring any persisted tokens.
    pub fn load(client: OAuthClient, store: Arc<dyn KeyValueStore>) -> Self {
        let restored = match store.get(TOKEN_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<TokenSet>(&raw)
                .map_err(|e| tracing::warn!(error = %e, "Discarding unreadable stored token"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                None
            }
        };
        if restored.is_some() {
            tracing::info!("Restored OAuth token from storage");
        }

        Self {
            client,
            store,
            current: Mutex::new(restored),
            pending: Mutex::new(HashMap::new()),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn is_authorized(&self) -> bool {
        lock(&self.current).is_some()
    }

    /// Start an authorization; returns the URL to send the user to.
    pub fn authorization_url(&self) -> AppResult<String> {
        let request = self.client.authorization_request()?;

        let mut pending = lock(&self.pending);
        if pending.len() >= MAX_PENDING {
            tracing::warn!(count = pending.len(), "Dropping stale OAuth authorization requests");
            pending.clear();
        }
        pending.insert(request.state, request.code_verifier);

        Ok(request.url)
    }

    /// Finish an authorization started by [`Self::authorization_url`].
    pub async fn complete(&self, code: &str, state: &str) -> AppResult<()> {
        let verifier = lock(&self.pending).remove(state).ok_or_else(|| {
            CoreError::Unauthorized("Unknown or expired OAuth state".to_string())
        })?;

        let tokens = self.client.exchange_code(code, &verifier).await?;
        self.replace(Some(tokens))?;
        tracing::info!("OAuth authorization completed");
        Ok(())
    }

    /// A valid access token, refreshing it when close to expiry.
    pub async fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.fresh_token() {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another request may have refreshed while we waited.
        if let Some(token) = self.fresh_token() {
            return Ok(token);
        }

        let refresh_token = lock(&self.current)
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or_else(not_authorized)?;

        match self.client.refresh(&refresh_token).await {
            Ok(tokens) => {
                let access = tokens.access_token.clone();
                self.replace(Some(tokens))?;
                tracing::info!("Refreshed OAuth access token");
                Ok(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing stored token");
                self.replace(None)?;
                Err(e.into())
            }
        }
    }

    /// Revoke and forget the current tokens. Revocation failures are
    /// logged; local tokens are always removed.
    pub async fn revoke(&self) -> AppResult<()> {
        let current = lock(&self.current).clone();
        if let Some(tokens) = current {
            let token = tokens.refresh_token.as_deref().unwrap_or(&tokens.access_token);
            if let Err(e) = self.client.revoke(token).await {
                tracing::warn!(error = %e, "Token revocation failed");
            }
        }
        self.replace(None)?;
        tracing::info!("OAuth tokens revoked");
        Ok(())
    }

    fn fresh_token(&self) -> Option<String> {
        lock(&self.current)
            .as_ref()
            .filter(|t| !t.is_expired(EXPIRY_SKEW_SECS))
            .map(|t| t.access_token.clone())
    }

    fn replace(&self, tokens: Option<TokenSet>) -> AppResult<()> {
        match &tokens {
            Some(t) => self.store.set(TOKEN_KEY, &serde_json::to_string(t).map_err(|e| {
                AppError::InternalError(format!("Failed to encode token: {e}"))
            })?)?,
            None => self.store.remove(TOKEN_KEY)?,
        }
        *lock(&self.current) = tokens;
        Ok(())
    }
}

fn not_authorized() -> AppError {
    CoreError::Unauthorized("Connect a Canva account first".to_string()).into()
}
