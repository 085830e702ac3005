use std::sync::Arc;

use tokio::sync::OnceCell;
use url::Url;

use crate::{AccessDescriptor, AnvatoStreamError, ManifestDescriptor, RenditionFormat, Transport};

/// Turns a station page into manifest urls.
///
/// The page is scraped once per resolver; the resulting metadata endpoint is
/// kept so that later calls only repeat the metadata POST.
pub struct Resolver {
    transport: Arc<dyn Transport>,
    page_url: String,
    api_host: String,
    api_url: OnceCell<String>,
}

impl Resolver {
    pub fn new(transport: Arc<dyn Transport>, page_url: &str, api_host: &str) -> Self {
        Self {
            transport,
            page_url: page_url.to_string(),
            api_host: api_host.to_string(),
            api_url: OnceCell::new(),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Metadata endpoint for this page, scraping the page on first use.
    pub async fn api_url(&self) -> Result<&str, AnvatoStreamError> {
        let api_url = self
            .api_url
            .get_or_try_init(|| async {
                log::debug!("Scraping access key from {}", self.page_url);
                let page = self.transport.get_text(&self.page_url).await?;
                let descriptor = AccessDescriptor::from_page(&page)?;
                let api_url = descriptor.api_url(&self.api_host);
                log::debug!("Metadata endpoint: {api_url}");
                Ok::<_, AnvatoStreamError>(api_url)
            })
            .await?;
        Ok(api_url.as_str())
    }

    /// Fetch the current manifest descriptor from the metadata API.
    pub async fn resolve(&self) -> Result<ManifestDescriptor, AnvatoStreamError> {
        let api_url = self.api_url().await?;
        let body = self.transport.post_text(api_url).await?;
        ManifestDescriptor::from_response(&body)
    }

    pub fn select_rendition(
        descriptor: &ManifestDescriptor,
        format: &RenditionFormat,
    ) -> Result<Url, AnvatoStreamError> {
        descriptor.rendition(format).cloned()
    }

    /// Resolve and pick the HLS master playlist.
    pub async fn hls_url(&self) -> Result<Url, AnvatoStreamError> {
        let descriptor = self.resolve().await?;
        Self::select_rendition(&descriptor, &RenditionFormat::M3u8Variant).inspect_err(|_| {
            log::error!("This page does not have a valid HLS stream");
        })
    }
}
