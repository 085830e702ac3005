use async_trait::async_trait;

use crate::{AnvatoStreamError, Config};

/// The two network calls the resolver needs: a page fetch and the metadata
/// API post. Variant playlists are fetched through `get_text` as well.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` following redirects and return the raw body.
    async fn get_text(&self, url: &str) -> Result<String, AnvatoStreamError>;

    /// POST to `url` with an empty body and return the raw body.
    async fn post_text(&self, url: &str) -> Result<String, AnvatoStreamError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self, AnvatoStreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(AnvatoStreamError::Network)?;

        Ok(Self { client })
    }

    async fn read_body(
        &self,
        response: reqwest::Response,
        url: &str,
    ) -> Result<String, AnvatoStreamError> {
        let status = response.status();
        if !status.is_success() {
            log::error!("Request failed: {url}: {status}");
            return Err(AnvatoStreamError::InvalidResponseStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_text(&self, url: &str) -> Result<String, AnvatoStreamError> {
        let response = self.client.get(url).send().await?;
        self.read_body(response, url).await
    }

    async fn post_text(&self, url: &str) -> Result<String, AnvatoStreamError> {
        let response = self.client.post(url).send().await?;
        self.read_body(response, url).await
    }
}
