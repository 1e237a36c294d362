//! Handlers for connecting and disconnecting the platform account.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub authorized: bool,
}

#[derive(Debug, Deserialize)]
pub struct OAuthRedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /auth/authorize
// ---------------------------------------------------------------------------

/// Build the authorization URL the browser should be sent to.
pub async fn authorize(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let url = state.tokens.authorization_url()?;
    tracing::info!("OAuth authorization started");
    Ok(Json(DataResponse {
        data: AuthorizeResponse { url },
    }))
}

// ---------------------------------------------------------------------------
// GET /oauth/redirect
// ---------------------------------------------------------------------------

/// Platform callback: exchange the code, then send the user back to the
/// front end with the outcome in `oauth`.
pub async fn oauth_redirect(
    State(state): State<AppState>,
    Query(params): Query<OAuthRedirectParams>,
) -> AppResult<Redirect> {
    let frontend = &state.config.frontend_url;

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth authorization denied");
        return Ok(Redirect::to(&format!("{frontend}/?oauth=denied")));
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return Err(AppError::BadRequest(
            "OAuth redirect requires code and state".to_string(),
        ));
    };

    state.tokens.complete(&code, &oauth_state).await?;
    Ok(Redirect::to(&format!("{frontend}/?oauth=success")))
}

// ---------------------------------------------------------------------------
// GET /auth/status
// ---------------------------------------------------------------------------

pub async fn status(State(state): State<AppState>) -> Json<DataResponse<AuthStatus>> {
    Json(DataResponse {
        data: AuthStatus {
            authorized: state.tokens.is_authorized(),
        },
    })
}

// ---------------------------------------------------------------------------
// POST /auth/revoke
// ---------------------------------------------------------------------------

pub async fn revoke(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.tokens.revoke().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /user/profile
// ---------------------------------------------------------------------------

pub async fn profile(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let platform = state.platform().await?;
    let profile = platform.get_user_profile().await?;
    Ok(Json(DataResponse { data: profile }))
}
