use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    parse_variant_playlist, AnvatoStreamError, Config, RefreshingStream, RenditionFormat,
    ReqwestTransport, Resolver, Transport,
};

/// Everything playable on a station page.
pub struct LiveStreams {
    pub title: String,
    /// Quality label -> stream
    pub streams: BTreeMap<String, RefreshingStream>,
}

/// Resolve `page_url` over HTTP and wrap every quality in a
/// [`RefreshingStream`].
pub async fn get_streams(
    config: &Config,
    page_url: &str,
) -> Result<LiveStreams, AnvatoStreamError> {
    let transport = Arc::new(ReqwestTransport::new(config)?);
    get_streams_with(transport, config, page_url).await
}

/// Same as [`get_streams`] over a caller supplied transport.
///
/// All streams share one resolver, so the page is scraped once no matter how
/// many qualities are refreshed later.
pub async fn get_streams_with(
    transport: Arc<dyn Transport>,
    config: &Config,
    page_url: &str,
) -> Result<LiveStreams, AnvatoStreamError> {
    let resolver = Arc::new(Resolver::new(transport, page_url, &config.api_host));

    let descriptor = resolver.resolve().await?;
    let manifest_url = Resolver::select_rendition(&descriptor, &RenditionFormat::M3u8Variant)
        .inspect_err(|_| log::error!("This page does not have a valid HLS stream"))?;
    let renditions = parse_variant_playlist(resolver.transport(), &manifest_url).await?;

    let streams: BTreeMap<String, RefreshingStream> = renditions
        .into_iter()
        .map(|(name, rendition)| {
            let stream = RefreshingStream::new(resolver.clone(), rendition.url, &name, config);
            (name, stream)
        })
        .collect();

    log::info!(
        "Found {} streams for \"{}\": {}",
        streams.len(),
        descriptor.title,
        streams.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    Ok(LiveStreams {
        title: descriptor.title,
        streams,
    })
}
