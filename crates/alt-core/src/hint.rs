//! Asset id hints embedded in image markup
//!
//! Themes and the block editor leave the attachment id on the element as a
//! `wp-image-<id>` class or a `data-attachment-id` / `data-id` attribute.
//! Hints are a fast path only; the editor still checks them against the
//! resolution bridge before writing.

use crate::types::AssetId;
use alt_dom::Element;
use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_HINT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^wp-image-(\d+)$").ok());

/// Attributes checked for a numeric asset id, in priority order
const ATTR_HINTS: &[&str] = &["data-attachment-id", "data-id"];

/// Extract an asset id hint from an element
#[must_use]
pub fn sniff_asset_id(element: &Element) -> Option<AssetId> {
    from_class(element).or_else(|| from_attrs(element))
}

fn from_class(element: &Element) -> Option<AssetId> {
    let re = CLASS_HINT.as_ref()?;
    element.classes().find_map(|class| {
        re.captures(class)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn from_attrs(element: &Element) -> Option<AssetId> {
    ATTR_HINTS
        .iter()
        .filter_map(|name| element.attr(name))
        .find_map(|value| value.parse().ok())
}
