use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::AnvatoStreamError;

static LOAD_ANVATO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<script>window\.loadAnvato\((?P<json>\{.*\})\);</script>")
        .expect("valid loadAnvato pattern")
});

/// Player bootstrap data embedded in a station page:
/// `<script>window.loadAnvato({"video":"...","accessKey":"..."});</script>`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessDescriptor {
    #[serde(rename = "video")]
    pub video_id: String,
    #[serde(rename = "accessKey")]
    pub access_key: String,
}

impl AccessDescriptor {
    pub fn from_page(page: &str) -> Result<Self, AnvatoStreamError> {
        let json = LOAD_ANVATO_RE
            .captures(page)
            .and_then(|captures| captures.name("json"))
            .ok_or_else(|| {
                AnvatoStreamError::Scrape("window.loadAnvato script not found".to_string())
            })?;

        serde_json::from_str(json.as_str())
            .map_err(|e| AnvatoStreamError::Scrape(format!("invalid loadAnvato payload: {e}")))
    }

    /// `https://{api_host}/rest/v2/mcp/video/{video}?anvack={accessKey}`
    pub fn api_url(&self, api_host: &str) -> String {
        format!(
            "https://{}/rest/v2/mcp/video/{}?anvack={}",
            api_host, self.video_id, self.access_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_descriptor_from_page() {
        let page = r#"<html><body>
            <div id="player"></div>
            <script>window.loadAnvato({"video":"123","accessKey":"ABC","autoplay":true});</script>
            </body></html>"#;
        let descriptor = AccessDescriptor::from_page(page).unwrap();
        assert_eq!(descriptor.video_id, "123");
        assert_eq!(descriptor.access_key, "ABC");
        assert_eq!(
            descriptor.api_url("tkx.mp.lura.live"),
            "https://tkx.mp.lura.live/rest/v2/mcp/video/123?anvack=ABC"
        );
    }

    #[test]
    fn missing_script_is_scrape_error() {
        let err = AccessDescriptor::from_page("<html><script>window.other({});</script></html>")
            .unwrap_err();
        assert!(matches!(err, AnvatoStreamError::Scrape(_)));
    }

    #[test]
    fn non_string_fields_are_scrape_errors() {
        let page = r#"<script>window.loadAnvato({"video":123,"accessKey":"ABC"});</script>"#;
        assert!(matches!(
            AccessDescriptor::from_page(page),
            Err(AnvatoStreamError::Scrape(_))
        ));

        let page = r#"<script>window.loadAnvato({"video":"123"});</script>"#;
        assert!(matches!(
            AccessDescriptor::from_page(page),
            Err(AnvatoStreamError::Scrape(_))
        ));
    }
}
