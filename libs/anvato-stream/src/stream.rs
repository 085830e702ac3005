use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::splice::{param, raw_param, with_raw_param, TS_PARAM};
use crate::{parse_variant_playlist, AnvatoStreamError, Config, Resolver};

struct SessionState {
    /// Url last handed out, always carrying `original_ts`
    current_url: Url,
    /// Raw `ts` of the url the session started with
    original_ts: Option<String>,
    next_refresh_at: Instant,
}

impl SessionState {
    fn push_deadline(&mut self, deadline: Instant) {
        self.next_refresh_at = self.next_refresh_at.max(deadline);
    }
}

/// A live rendition url that re-resolves itself before the upstream token
/// expires.
///
/// Refresh is lazy: nothing happens until [`RefreshingStream::url`] is called
/// after the deadline. A successful refresh swaps in the freshly issued url
/// but keeps the session's first `ts`, because segment addressing downstream
/// is derived from it. A failed refresh keeps serving the previous url and
/// retries after the backoff delay.
pub struct RefreshingStream {
    resolver: Arc<Resolver>,
    quality: String,
    refresh_interval: Duration,
    backoff: Duration,
    state: Mutex<SessionState>,
}

impl RefreshingStream {
    pub fn new(resolver: Arc<Resolver>, url: Url, quality: &str, config: &Config) -> Self {
        let original_ts = raw_param(&url, TS_PARAM).map(str::to_string);
        if original_ts.is_none() {
            log::warn!("[{quality}] Stream url has no {TS_PARAM} parameter: {url}");
        }
        log::debug!("[{quality}] Url: {url}");

        Self {
            resolver,
            quality: quality.to_string(),
            refresh_interval: config.refresh_interval(),
            backoff: config.backoff(),
            state: Mutex::new(SessionState {
                current_url: url,
                original_ts,
                next_refresh_at: Instant::now() + config.refresh_interval(),
            }),
        }
    }

    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub async fn next_refresh_at(&self) -> Instant {
        self.state.lock().await.next_refresh_at
    }

    /// Log the next scheduled refresh and hand the url to the opener.
    pub async fn open(&self) -> String {
        {
            let state = self.state.lock().await;
            self.log_next_refresh(&state);
        }
        self.url().await
    }

    /// Current url of the stream, refreshed in place when due.
    ///
    /// Never fails: refresh errors are logged and the previous url is
    /// returned.
    pub async fn url(&self) -> String {
        let mut state = self.state.lock().await;
        if Instant::now() < state.next_refresh_at {
            return state.current_url.to_string();
        }

        log::debug!("[{}] Reloading HLS URL", self.quality);
        match self.fetch_rendition_url().await {
            Ok(fresh) => {
                log::debug!(
                    "[{}] HLS URL: {} (ts={:?})",
                    self.quality,
                    fresh,
                    param(&fresh, TS_PARAM)
                );
                let spliced = match &state.original_ts {
                    Some(ts) => with_raw_param(&fresh, TS_PARAM, ts),
                    None => fresh,
                };
                log::debug!("[{}] Replacing: {}", self.quality, state.current_url);
                log::debug!("[{}] with: {}", self.quality, spliced);
                state.current_url = spliced;
                state.push_deadline(Instant::now() + self.refresh_interval);
                self.log_next_refresh(&state);
            }
            Err(e) => {
                log::warn!(
                    "[{}] Failed to refresh stream url, retrying in {}s: {}",
                    self.quality,
                    self.backoff.as_secs(),
                    e
                );
                state.push_deadline(Instant::now() + self.backoff);
            }
        }

        state.current_url.to_string()
    }

    async fn fetch_rendition_url(&self) -> Result<Url, AnvatoStreamError> {
        let manifest_url = self.resolver.hls_url().await?;
        let mut renditions =
            parse_variant_playlist(self.resolver.transport(), &manifest_url).await?;
        renditions
            .remove(&self.quality)
            .map(|rendition| rendition.url)
            .ok_or_else(|| AnvatoStreamError::QualityNotFound {
                quality: self.quality.clone(),
            })
    }

    fn log_next_refresh(&self, state: &SessionState) {
        let remaining = state
            .next_refresh_at
            .saturating_duration_since(Instant::now());
        let at =
            chrono::Local::now() + TimeDelta::from_std(remaining).unwrap_or(TimeDelta::zero());
        log::debug!(
            "[{}] next refresh at {}",
            self.quality,
            at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}
