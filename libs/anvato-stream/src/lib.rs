pub mod api;
pub mod config;
pub mod resolver;
pub mod scrape;
pub mod session;
pub mod splice;
pub mod stream;
pub mod transport;
pub mod variant;

use thiserror::Error;

// Re-export main types
pub use api::{ManifestDescriptor, PublishedUrl, RenditionFormat};
pub use config::Config;
pub use resolver::Resolver;
pub use scrape::AccessDescriptor;
pub use session::{get_streams, get_streams_with, LiveStreams};
pub use stream::RefreshingStream;
pub use transport::{ReqwestTransport, Transport};
pub use variant::{parse_variant_playlist, Rendition};

#[derive(Error, Debug)]
pub enum AnvatoStreamError {
    #[error("ScrapeError: {0}")]
    Scrape(String),
    #[error("ProtocolError: {0}")]
    Protocol(String),
    #[error("SchemaError: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("NoRenditionError: no rendition with format {format}")]
    NoRendition { format: String },
    #[error("QualityNotFound: {quality}")]
    QualityNotFound { quality: String },
    #[error("PlaylistError: {0}")]
    Playlist(String),
    #[error("NetworkError: {0}")]
    Network(#[from] reqwest::Error),
    #[error("InvalidResponseStatus: {status} for {url}")]
    InvalidResponseStatus {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("InvalidUrl: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("ConfigError: {0}")]
    Config(String),
}

impl AnvatoStreamError {
    /// Whether the page has nothing playable, as opposed to a transport or
    /// configuration failure. A page without a player, an unreadable metadata
    /// payload and a missing HLS rendition all mean "no stream available".
    pub fn is_no_stream(&self) -> bool {
        matches!(
            self,
            AnvatoStreamError::Scrape(_)
                | AnvatoStreamError::Protocol(_)
                | AnvatoStreamError::Schema(_)
                | AnvatoStreamError::NoRendition { .. }
                | AnvatoStreamError::QualityNotFound { .. }
        )
    }
}
