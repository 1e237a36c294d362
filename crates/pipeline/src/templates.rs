//! Brand template gateway and editor hand-off.
//!
//! Editing happens on the platform's own site. Before sending the user
//! there, [`BrandTemplateGateway::build_return_nav_url`] attaches our
//! return endpoint and an encoded [`CorrelationState`] so the round trip
//! can resume where it started without any server-side session.

use std::sync::Arc;

use futures::future::join_all;
use reqwest::Url;
use serde::Serialize;
use shopfront_canva::models::{
    BrandTemplate, CreateDesignRequest, DatasetFilter, DesignType, ListBrandTemplatesQuery,
    PresetName,
};
use shopfront_canva::platform::DesignPlatform;
use shopfront_core::correlation::CorrelationState;
use shopfront_core::error::CoreError;

use crate::error::AutofillError;

/// Path of the return-navigation endpoint on the backend.
pub const RETURN_NAV_PATH: &str = "/return-nav";

/// Upper bound on pages fetched by one [`BrandTemplateGateway::list`].
const MAX_PAGES: usize = 100;

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// Opens a URL for the user.
pub trait Launcher: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs in the system browser.
pub struct BrowserLauncher;

impl Launcher for BrowserLauncher {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// Does nothing; the URL is handed back to the HTTP caller instead.
pub struct NoopLauncher;

impl Launcher for NoopLauncher {
    fn open(&self, url: &str) -> std::io::Result<()> {
        tracing::debug!(url, "Launcher disabled, returning URL to caller");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub query: Option<String>,
    /// Defaults to templates that expose a dataset.
    pub dataset_filter: Option<DatasetFilter>,
}

/// Editor URL built for one template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLaunch {
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct BrandTemplateGateway {
    platform: Arc<dyn DesignPlatform>,
    return_nav_url: String,
    launcher: Arc<dyn Launcher>,
}

impl BrandTemplateGateway {
    /// `backend_url` is the public root of this service.
    pub fn new(
        platform: Arc<dyn DesignPlatform>,
        backend_url: &str,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            platform,
            return_nav_url: format!("{}{RETURN_NAV_PATH}", backend_url.trim_end_matches('/')),
            launcher,
        }
    }

    /// Every matching template, following continuation tokens.
    pub async fn list(&self, options: &ListOptions) -> Result<Vec<BrandTemplate>, AutofillError> {
        let mut query = ListBrandTemplatesQuery {
            query: options.query.clone(),
            dataset: Some(options.dataset_filter.unwrap_or_default()),
            continuation: None,
        };
        let mut templates = Vec::new();

        for page_number in 1..=MAX_PAGES {
            let page = self.platform.list_brand_templates(&query).await?;
            tracing::debug!(page = page_number, items = page.items.len(), "Fetched brand template page");
            templates.extend(page.items);

            match page.continuation {
                Some(token) => query.continuation = Some(token),
                None => return Ok(templates),
            }
        }

        tracing::warn!(pages = MAX_PAGES, "Brand template listing stopped at page limit");
        Ok(templates)
    }

    pub async fn get(&self, id: &str) -> Result<BrandTemplate, AutofillError> {
        Ok(self.platform.get_brand_template(id).await?)
    }

    /// Append `return_nav_url` and `correlation_state` to `url`.
    pub fn build_return_nav_url(
        &self,
        url: &str,
        state: &CorrelationState,
    ) -> Result<String, AutofillError> {
        let mut parsed = Url::parse(url)
            .map_err(|e| CoreError::Validation(format!("Invalid editor URL {url:?}: {e}")))?;
        let encoded = state.encode()?;
        parsed
            .query_pairs_mut()
            .append_pair("return_nav_url", &self.return_nav_url)
            .append_pair("correlation_state", &encoded);
        Ok(parsed.into())
    }

    /// Open `url` through the configured launcher and return it.
    pub fn open_in_new_window(&self, url: &str) -> Result<String, AutofillError> {
        self.launcher.open(url).map_err(AutofillError::Launch)?;
        tracing::info!(url, "Opened editor");
        Ok(url.to_string())
    }

    /// Create an empty presentation and open it in the editor.
    pub async fn create_design_for_editing(
        &self,
        state: &CorrelationState,
    ) -> Result<String, AutofillError> {
        let design = self
            .platform
            .create_design(&CreateDesignRequest {
                design_type: Some(DesignType::Preset {
                    name: PresetName::Presentation,
                }),
                ..Default::default()
            })
            .await?;
        let url = self.build_return_nav_url(&design.urls.edit_url, state)?;
        self.open_in_new_window(&url)
    }

    /// Open each template's create URL. Lookups run concurrently and a
    /// failed template does not prevent the others from opening.
    pub async fn open_templates_for_editing(
        &self,
        ids: &[String],
        state: &CorrelationState,
    ) -> Vec<TemplateLaunch> {
        let lookups = ids.iter().map(|id| async move {
            match self.open_template(id, state).await {
                Ok(url) => TemplateLaunch {
                    template_id: id.clone(),
                    url: Some(url),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(template_id = %id, error = %e, "Failed to open template");
                    TemplateLaunch {
                        template_id: id.clone(),
                        url: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        });
        join_all(lookups).await
    }

    async fn open_template(
        &self,
        id: &str,
        state: &CorrelationState,
    ) -> Result<String, AutofillError> {
        let template = self.get(id).await?;
        let url = self.build_return_nav_url(&template.create_url, state)?;
        self.open_in_new_window(&url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use shopfront_canva::fake::FakePlatform;
    use shopfront_core::correlation::OriginPage;

    use super::*;

    #[derive(Default)]
    struct RecordingLauncher {
        opened: Mutex<Vec<String>>,
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, url: &str) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn gateway(fake: Arc<FakePlatform>, launcher: Arc<dyn Launcher>) -> BrandTemplateGateway {
        BrandTemplateGateway::new(fake, "http://127.0.0.1:3001/", launcher)
    }

    fn query_param(url: &str, key: &str) -> Option<String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn list_concatenates_pages_in_order() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "One")
                .with_template("T2", "Two")
                .with_template("T3", "Three")
                .with_template("T4", "Four")
                .with_page_size(2),
        );
        let gw = gateway(fake.clone(), Arc::new(NoopLauncher));

        let all = gw
            .list(&ListOptions {
                dataset_filter: Some(DatasetFilter::Any),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<_> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["T1", "T2", "T3", "T4"]);
        assert_eq!(fake.list_calls(), 2);
    }

    #[tokio::test]
    async fn default_filter_only_lists_templates_with_datasets() {
        let fake = Arc::new(
            FakePlatform::new()
                .with_template("T1", "One")
                .with_template("T2", "Two")
                .with_promo_dataset("T2"),
        );

        let all = gateway(fake, Arc::new(NoopLauncher))
            .list(&ListOptions::default())
            .await
            .unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "T2");
    }

    #[test]
    fn return_nav_url_round_trips_state() {
        let gw = gateway(Arc::new(FakePlatform::new()), Arc::new(NoopLauncher));
        let mut state = CorrelationState::new(OriginPage::Product);
        state.origin_product_id = Some(3);

        let url = gw
            .build_return_nav_url("https://canva.test/design/D1/edit?x=1", &state)
            .unwrap();

        assert_eq!(query_param(&url, "x").as_deref(), Some("1"));
        assert_eq!(
            query_param(&url, "return_nav_url").as_deref(),
            Some("http://127.0.0.1:3001/return-nav")
        );
        let encoded = query_param(&url, "correlation_state").unwrap();
        assert_eq!(CorrelationState::decode(&encoded).unwrap(), state);
    }

    #[test]
    fn invalid_editor_url_is_rejected() {
        let gw = gateway(Arc::new(FakePlatform::new()), Arc::new(NoopLauncher));
        let state = CorrelationState::new(OriginPage::BrandTemplateCreator);
        assert!(gw.build_return_nav_url("not a url", &state).is_err());
    }

    #[tokio::test]
    async fn templates_open_independently() {
        let fake = Arc::new(FakePlatform::new().with_template("T1", "One"));
        let launcher = Arc::new(RecordingLauncher::default());
        let gw = gateway(fake, launcher.clone());
        let state = CorrelationState::new(OriginPage::BrandTemplateCreator);

        let launches = gw
            .open_templates_for_editing(&["T1".to_string(), "missing".to_string()], &state)
            .await;

        assert!(launches[0].url.as_deref().unwrap().starts_with("https://canva.test/brand-templates/T1/create?"));
        assert!(launches[1].error.is_some());
        assert_eq!(launcher.opened.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_design_opens_with_return_navigation() {
        let launcher = Arc::new(RecordingLauncher::default());
        let gw = gateway(Arc::new(FakePlatform::new()), launcher.clone());

        let url = gw
            .create_design_for_editing(&CorrelationState::new(OriginPage::MarketingSingle))
            .await
            .unwrap();

        assert!(query_param(&url, "correlation_state").is_some());
        assert_eq!(launcher.opened.lock().unwrap().as_slice(), [url]);
    }
}
