//! REST API client for the Canva Connect HTTP endpoints.
//!
//! Wraps brand templates, autofill jobs, asset uploads, designs and the
//! user profile using [`reqwest`]. Every call is authenticated with the
//! bearer token set through [`CanvaApi::with_access_token`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{
    AssetUploadJob, AutofillJob, BrandTemplate, BrandTemplateDataset, BrandTemplatePage,
    CreateAutofillJobRequest, CreateDesignRequest, Design, DesignPage, ListBrandTemplatesQuery,
    UserProfile,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.canva.com/rest";

/// HTTP client for the Canva Connect API.
#[derive(Clone)]
pub struct CanvaApi {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

/// Errors from the Canva REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum CanvaApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Canva returned a non-2xx status code with an error payload.
    #[error("Canva API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code, when the body carried one.
        code: Option<String>,
        /// Error message, or the raw body when it was not JSON.
        message: String,
    },

    /// A resource id or the configured base URL cannot form a request path.
    #[error("Invalid request path: {0}")]
    InvalidPath(String),
}

impl CanvaApiError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidPath(_) => None,
        }
    }
}

/// Error payload shape returned by Canva on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: String,
}

// Response envelopes.

#[derive(Deserialize)]
struct BrandTemplateEnvelope {
    brand_template: BrandTemplate,
}

#[derive(Deserialize)]
struct JobEnvelope<T> {
    job: T,
}

#[derive(Deserialize)]
struct DesignEnvelope {
    design: Design,
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    profile: UserProfile,
}

#[derive(Serialize)]
struct UrlAssetUploadRequest<'a> {
    name: &'a str,
    url: &'a str,
}

impl CanvaApi {
    /// Create a new API client.
    ///
    /// * `base_url` - API root, e.g. `https://api.canva.com/rest`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Return a copy of this client that authenticates as `token`.
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            access_token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- brand templates ----

    /// Fetch one page of brand templates (`GET /v1/brand-templates`).
    pub async fn list_brand_templates(
        &self,
        query: &ListBrandTemplatesQuery,
    ) -> Result<BrandTemplatePage, CanvaApiError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(q) = query.query.as_deref() {
            params.push(("query", q));
        }
        if let Some(dataset) = query.dataset {
            params.push(("dataset", dataset.as_str()));
        }
        if let Some(continuation) = query.continuation.as_deref() {
            params.push(("continuation", continuation));
        }

        let request = self.request(reqwest::Method::GET, &["v1", "brand-templates"])?.query(&params);
        Self::parse_response(request.send().await?).await
    }

    pub async fn get_brand_template(&self, id: &str) -> Result<BrandTemplate, CanvaApiError> {
        let request = self.request(reqwest::Method::GET, &["v1", "brand-templates", id])?;
        let envelope: BrandTemplateEnvelope = Self::parse_response(request.send().await?).await?;
        Ok(envelope.brand_template)
    }

    pub async fn get_brand_template_dataset(
        &self,
        id: &str,
    ) -> Result<BrandTemplateDataset, CanvaApiError> {
        let request = self.request(
            reqwest::Method::GET,
            &["v1", "brand-templates", id, "dataset"],
        )?;
        Self::parse_response(request.send().await?).await
    }

    // ---- autofill ----

    /// Queue an autofill job (`POST /v1/autofills`).
    pub async fn create_autofill_job(
        &self,
        body: &CreateAutofillJobRequest,
    ) -> Result<AutofillJob, CanvaApiError> {
        let request = self.request(reqwest::Method::POST, &["v1", "autofills"])?.json(body);
        let envelope: JobEnvelope<AutofillJob> =
            Self::parse_response(request.send().await?).await?;
        Ok(envelope.job)
    }

    pub async fn get_autofill_job(&self, job_id: &str) -> Result<AutofillJob, CanvaApiError> {
        let request = self.request(reqwest::Method::GET, &["v1", "autofills", job_id])?;
        let envelope: JobEnvelope<AutofillJob> =
            Self::parse_response(request.send().await?).await?;
        Ok(envelope.job)
    }

    // ---- assets ----

    /// Upload raw bytes as an asset (`POST /v1/asset-uploads`).
    ///
    /// The asset name travels base64-encoded in the
    /// `Asset-Upload-Metadata` header.
    pub async fn create_asset_upload_job(
        &self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        let metadata = serde_json::json!({ "name_base64": STANDARD.encode(name) }).to_string();
        let request = self
            .request(reqwest::Method::POST, &["v1", "asset-uploads"])?
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header("Asset-Upload-Metadata", metadata)
            .body(bytes);
        let envelope: JobEnvelope<AssetUploadJob> =
            Self::parse_response(request.send().await?).await?;
        Ok(envelope.job)
    }

    pub async fn get_asset_upload_job(
        &self,
        job_id: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        let request = self.request(reqwest::Method::GET, &["v1", "asset-uploads", job_id])?;
        let envelope: JobEnvelope<AssetUploadJob> =
            Self::parse_response(request.send().await?).await?;
        Ok(envelope.job)
    }

    /// Ask Canva to fetch and import an image by URL
    /// (`POST /v1/url-asset-uploads`).
    pub async fn create_url_asset_upload_job(
        &self,
        name: &str,
        url: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        let request = self
            .request(reqwest::Method::POST, &["v1", "url-asset-uploads"])?
            .json(&UrlAssetUploadRequest { name, url });
        let envelope: JobEnvelope<AssetUploadJob> =
            Self::parse_response(request.send().await?).await?;
        Ok(envelope.job)
    }

    pub async fn get_url_asset_upload_job(
        &self,
        job_id: &str,
    ) -> Result<AssetUploadJob, CanvaApiError> {
        let request = self.request(
            reqwest::Method::GET,
            &["v1", "url-asset-uploads", job_id],
        )?;
        let envelope: JobEnvelope<AssetUploadJob> =
            Self::parse_response(request.send().await?).await?;
        Ok(envelope.job)
    }

    // ---- designs ----

    pub async fn create_design(&self, body: &CreateDesignRequest) -> Result<Design, CanvaApiError> {
        let request = self.request(reqwest::Method::POST, &["v1", "designs"])?.json(body);
        let envelope: DesignEnvelope = Self::parse_response(request.send().await?).await?;
        Ok(envelope.design)
    }

    pub async fn get_design(&self, id: &str) -> Result<Design, CanvaApiError> {
        let request = self.request(reqwest::Method::GET, &["v1", "designs", id])?;
        let envelope: DesignEnvelope = Self::parse_response(request.send().await?).await?;
        Ok(envelope.design)
    }

    pub async fn list_designs(
        &self,
        continuation: Option<&str>,
    ) -> Result<DesignPage, CanvaApiError> {
        let mut request = self.request(reqwest::Method::GET, &["v1", "designs"])?;
        if let Some(c) = continuation {
            request = request.query(&[("continuation", c)]);
        }
        Self::parse_response(request.send().await?).await
    }

    // ---- users ----

    pub async fn get_user_profile(&self) -> Result<UserProfile, CanvaApiError> {
        let request = self.request(reqwest::Method::GET, &["v1", "users", "me", "profile"])?;
        let envelope: ProfileEnvelope = Self::parse_response(request.send().await?).await?;
        Ok(envelope.profile)
    }

    // ---- private helpers ----

    /// `base_url` plus `segments`, each percent-encoded as a single path
    /// segment so ids cannot climb into other endpoints.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CanvaApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(CanvaApiError::InvalidPath(format!(
                "{bad:?} is not a valid path segment"
            )));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CanvaApiError::InvalidPath(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| {
                CanvaApiError::InvalidPath(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request to `segments` with the bearer token attached.
    fn request(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, CanvaApiError> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Ensure the response has a success status code. On failure the
    /// body is decoded as a Canva error payload when possible.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CanvaApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.message),
            Err(_) => (None, body),
        };

        Err(CanvaApiError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CanvaApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let api = CanvaApi::new("http://localhost:9999/rest/");
        assert_eq!(api.base_url(), "http://localhost:9999/rest");
    }

    #[test]
    fn api_error_display_and_status() {
        let err = CanvaApiError::Api {
            status: 404,
            code: Some("not_found".into()),
            message: "Brand template not found".into(),
        };
        assert_eq!(err.to_string(), "Canva API error (404): Brand template not found");
        assert_eq!(err.status(), Some(404));
    }
}
