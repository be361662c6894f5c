//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters that survive unencoded in a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a site-relative URL
///
/// # Examples
/// ```ignore
/// url_for("blog", "my-post") // -> "/blog/my-post"
/// ```
pub fn url_for(section: &str, slug: &str) -> String {
    format!("/{}/{}", section, encode_path_segment(slug))
}

/// Generate a full URL including the configured domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    if path.is_empty() {
        format!("{}/", base)
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Percent-encode one path segment. Slugs are filename-derived and
/// usually pass through unchanged.
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
