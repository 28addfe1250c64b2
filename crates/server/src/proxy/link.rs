//! `Link` header cursor extraction.
//!
//! Shopify's REST Admin API paginates with an opaque `page_info` cursor
//! carried in the `Link` response header:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=50&page_info=abc>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=50&page_info=def>; rel="next"
//! ```

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

static NEXT_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]+)>;\s*rel="next""#).expect("Invalid regex"));

/// Extract the `page_info` cursor of the `rel="next"` link, if any.
///
/// Only the query of the link target is read, so relative targets work too.
/// Returns `None` when the header has no next link or the target carries no
/// non-empty `page_info` parameter.
#[must_use]
pub fn next_page_info(link_header: &str) -> Option<String> {
    if !link_header.contains(r#"rel="next""#) {
        return None;
    }

    let target = NEXT_LINK_RE.captures(link_header)?.get(1)?.as_str();
    let (_, query) = target.split_once('?')?;

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page_info")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
