//! Share-intent deep links
//!
//! The mobile shell turns an OS "share text" intent into
//! `qrscan://share?text=<encoded text>` so it reaches the app as a deep link.

use url::Url;

pub const SHARE_SCHEME: &str = "qrscan";
const SHARE_HOST: &str = "share";

/// Text carried by a share link, or `None` if `link` is not one or the text is blank.
pub fn shared_text(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    if url.scheme() != SHARE_SCHEME || url.host_str() != Some(SHARE_HOST) {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.into_owned())
        .filter(|text| !text.trim().is_empty())
}

/// Build the link the mobile shell emits for `text`.
pub fn share_link(text: &str) -> String {
    format!("{}://{}?text={}", SHARE_SCHEME, SHARE_HOST, urlencoding::encode(text))
}
