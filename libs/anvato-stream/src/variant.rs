use std::collections::BTreeMap;

use m3u8_rs::{parse_playlist_res, Playlist, VariantStream};
use url::Url;

use crate::{AnvatoStreamError, Transport};

/// Quality label used when the manifest is already a media playlist.
pub const SINGLE_RENDITION: &str = "live";

/// One variant of a master playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    pub name: String,
    pub url: Url,
    pub bandwidth: u64,
    /// (width, height)
    pub resolution: Option<(u64, u64)>,
}

fn variant_name(variant: &VariantStream) -> String {
    match &variant.resolution {
        Some(resolution) => match variant.frame_rate {
            Some(rate) if rate > 30.0 => {
                format!("{}p{}", resolution.height, rate.round() as u64)
            }
            _ => format!("{}p", resolution.height),
        },
        None => format!("{}k", variant.bandwidth / 1000),
    }
}

fn unique_name(name: String, renditions: &BTreeMap<String, Rendition>) -> String {
    if !renditions.contains_key(&name) {
        return name;
    }
    let alt = format!("{name}_alt");
    if !renditions.contains_key(&alt) {
        return alt;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name}_alt{n}");
        if !renditions.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Parse a playlist body fetched from `manifest_url` into quality label ->
/// rendition.
pub fn renditions_from_playlist(
    manifest_url: &Url,
    content: &[u8],
) -> Result<BTreeMap<String, Rendition>, AnvatoStreamError> {
    let mut renditions = BTreeMap::new();

    match parse_playlist_res(content) {
        Ok(Playlist::MasterPlaylist(playlist)) => {
            // Same-named variants get suffixes in bandwidth order, so a label
            // keeps pointing at the same variant when the playlist is reordered.
            let mut variants: Vec<&VariantStream> =
                playlist.variants.iter().filter(|v| !v.is_i_frame).collect();
            variants.sort_by_key(|v| v.bandwidth);
            for variant in variants {
                let url = manifest_url.join(&variant.uri)?;
                let name = unique_name(variant_name(variant), &renditions);
                renditions.insert(
                    name.clone(),
                    Rendition {
                        name,
                        url,
                        bandwidth: variant.bandwidth,
                        resolution: variant
                            .resolution
                            .as_ref()
                            .map(|resolution| (resolution.width, resolution.height)),
                    },
                );
            }
        }
        Ok(Playlist::MediaPlaylist(_)) => {
            renditions.insert(
                SINGLE_RENDITION.to_string(),
                Rendition {
                    name: SINGLE_RENDITION.to_string(),
                    url: manifest_url.clone(),
                    bandwidth: 0,
                    resolution: None,
                },
            );
        }
        Err(e) => {
            return Err(AnvatoStreamError::Playlist(format!(
                "M3U8 parse error: {}",
                e
            )));
        }
    }

    if renditions.is_empty() {
        return Err(AnvatoStreamError::Playlist("No variants found".to_string()));
    }

    log::debug!("Parsed {} renditions from {}", renditions.len(), manifest_url);
    Ok(renditions)
}

/// Fetch the master playlist at `manifest_url` and name its variants.
pub async fn parse_variant_playlist(
    transport: &dyn Transport,
    manifest_url: &Url,
) -> Result<BTreeMap<String, Rendition>, AnvatoStreamError> {
    let content = transport.get_text(manifest_url.as_str()).await?;
    renditions_from_playlist(manifest_url, content.as_bytes())
}
