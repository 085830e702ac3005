//! Query parameter rewriting for access-token pinning.
//!
//! Upstream manifest urls look like
//! ```text
//! https://host/live/master_720.m3u8?ts=1719400000&sig=9f3a...&exp=1719400300
//! ```
//! A refresh rotates every parameter. We keep the fresh url but put the
//! session's first `ts` back, leaving every other pair byte-for-byte intact.

use url::form_urlencoded;
use url::Url;

/// Query key carrying the access timestamp.
pub const TS_PARAM: &str = "ts";

fn decoded_key(pair: &str) -> Option<String> {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
}

/// Raw (still percent-encoded) value of the first `key` pair in `url`.
pub fn raw_param<'a>(url: &'a Url, key: &str) -> Option<&'a str> {
    url.query()?
        .split('&')
        .find(|pair| decoded_key(pair).as_deref() == Some(key))
        .map(|pair| pair.split_once('=').map(|(_, value)| value).unwrap_or(""))
}

/// Decoded value of the first `key` pair in `url`.
pub fn param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.into_owned())
}

/// Copy of `url` where every `key` pair carries `raw_value`. The pair is
/// appended when `url` has none.
pub fn with_raw_param(url: &Url, key: &str, raw_value: &str) -> Url {
    let mut replaced = false;
    let mut pairs: Vec<String> = url
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            if decoded_key(pair).as_deref() == Some(key) {
                replaced = true;
                let raw_key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
                format!("{raw_key}={raw_value}")
            } else {
                pair.to_string()
            }
        })
        .collect();

    if !replaced {
        pairs.push(format!("{key}={raw_value}"));
    }

    let mut spliced = url.clone();
    spliced.set_query(Some(&pairs.join("&")));
    spliced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn reads_ts() {
        let u = url("https://x/m.m3u8?a=1&ts=100&b=2");
        assert_eq!(param(&u, TS_PARAM).as_deref(), Some("100"));
        assert_eq!(raw_param(&u, TS_PARAM), Some("100"));
        assert_eq!(param(&url("https://x/m.m3u8?lts=5"), TS_PARAM), None);
        assert_eq!(raw_param(&url("https://x/m.m3u8"), TS_PARAM), None);
    }

    #[test]
    fn replaces_only_the_ts_pair() {
        let fresh = url("https://cdn2.example/live/720.m3u8?sig=ab200cd&ts=200&exp=2000&lts=200");
        let spliced = with_raw_param(&fresh, TS_PARAM, "100");
        assert_eq!(
            spliced.as_str(),
            "https://cdn2.example/live/720.m3u8?sig=ab200cd&ts=100&exp=2000&lts=200"
        );
    }

    #[test]
    fn keeps_encoding_of_other_pairs() {
        let fresh = url("https://x/m.m3u8?fm=RFdx%3D%3D&ts=200&note=a+b");
        let spliced = with_raw_param(&fresh, TS_PARAM, "100");
        assert_eq!(spliced.as_str(), "https://x/m.m3u8?fm=RFdx%3D%3D&ts=100&note=a+b");
    }

    #[test]
    fn appends_missing_ts() {
        let fresh = url("https://x/m.m3u8?sig=1");
        assert_eq!(
            with_raw_param(&fresh, TS_PARAM, "100").as_str(),
            "https://x/m.m3u8?sig=1&ts=100"
        );
        let bare = url("https://x/m.m3u8");
        assert_eq!(
            with_raw_param(&bare, TS_PARAM, "100").as_str(),
            "https://x/m.m3u8?ts=100"
        );
    }
}
