use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::AnvatoStreamError;

/// Response body is either `anvatoVideoJSONLoaded({...})` or bare `{...}`.
static JSONP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:anvatoVideoJSONLoaded\()?(?P<json>\{.*\})")
        .expect("valid metadata payload pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RenditionFormat {
    /// HLS master playlist, the only format we can play
    M3u8Variant,
    Other(String),
}

impl RenditionFormat {
    pub fn as_str(&self) -> &str {
        match self {
            RenditionFormat::M3u8Variant => "m3u8-variant",
            RenditionFormat::Other(format) => format,
        }
    }
}

impl From<String> for RenditionFormat {
    fn from(value: String) -> Self {
        match value.as_str() {
            "m3u8-variant" => RenditionFormat::M3u8Variant,
            _ => RenditionFormat::Other(value),
        }
    }
}

impl fmt::Display for RenditionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublishedUrl {
    pub embed_url: Url,
    pub format: RenditionFormat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestDescriptor {
    #[serde(rename = "def_title")]
    pub title: String,
    pub published_urls: Vec<PublishedUrl>,
}

impl ManifestDescriptor {
    /// Parse a metadata API response body, JSONP wrapper or not.
    pub fn from_response(body: &str) -> Result<Self, AnvatoStreamError> {
        let json = JSONP_RE
            .captures(body)
            .and_then(|captures| captures.name("json"))
            .ok_or_else(|| {
                log::error!("The response does not have the expected data");
                AnvatoStreamError::Protocol("no JSON payload in metadata response".to_string())
            })?;

        Ok(serde_json::from_str(json.as_str())?)
    }

    /// First published url tagged with `format`.
    pub fn rendition(&self, format: &RenditionFormat) -> Result<&Url, AnvatoStreamError> {
        self.published_urls
            .iter()
            .find(|published| &published.format == format)
            .map(|published| &published.embed_url)
            .ok_or_else(|| AnvatoStreamError::NoRendition {
                format: format.to_string(),
            })
    }
}
