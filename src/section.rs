//! Section representation for the site's menu tree.
//!
//! A section is the atomic entity of the sitemap: a page with a stable numeric
//! id and a URL-slug `endpoint`. Parenthood is expressed by *endpoint
//! equality*, not by id: `child.parent` holds the parent's endpoint string.
//! Historical rows may carry a legacy path prefix on the parent value; it must
//! be stripped before any comparison or forest build.

use serde::{Deserialize, Serialize};

/// Path prefix found on parent values written by an older backend version.
pub const LEGACY_PARENT_PREFIX: &str = "/sidebar/";

#[derive(Clone, Debug, Deserialize, Serialize)]
/// A content/menu node as served by the backend.
pub struct Section {
    /// Backend-assigned identifier, immutable once created.
    pub id: i64,
    /// Display string.
    pub title: String,
    /// URL-slug acting as the relational key for parenthood.
    pub endpoint: String,
    /// Endpoint of the containing section, if any. May arrive with the
    /// legacy prefix still attached.
    #[serde(default)]
    pub parent: Option<String>,
    /// Sibling sort position; ties broken by title then endpoint.
    #[serde(default)]
    pub order: i64,
    /// Public URL for the page, when the backend supplies one.
    #[serde(default)]
    pub url: Option<String>,
}

/// Strip the legacy prefix and collapse empty strings to `None`.
#[must_use]
pub fn normalize_parent(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    let value = value.strip_prefix(LEGACY_PARENT_PREFIX).unwrap_or(value);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl crate::forest::TreeNode for Section {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parent_key(&self) -> Option<String> {
        self.normalized_parent()
    }
}

impl crate::forest::HasOrderTitle for Section {
    fn order(&self) -> i64 {
        self.order
    }

    fn title_lower(&self) -> String {
        self.title.to_lowercase()
    }
}

impl Section {
    #[must_use]
    /// The parent endpoint with legacy normalization applied.
    pub fn normalized_parent(&self) -> Option<String> {
        normalize_parent(self.parent.as_deref())
    }

    #[must_use]
    /// Public URL for display; falls back to the conventional sidebar path.
    pub fn page_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("/sidebar/{}", self.endpoint))
    }
}
