//! HTTP boundary to the backend that owns persistence and business rules.
//!
//! Every operation is one round-trip. Responses share a `{success, error?}`
//! envelope: transport failures and rejected requests both surface their
//! message to the operator verbatim, and neither is fatal - the in-memory
//! model stays at its last-known-good state and the action can be retried.

use crate::section::Section;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// What went wrong talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, bad JSON).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered `success: false`; the message is passed through
    /// verbatim.
    #[error("{0}")]
    Rejected(String),
}

/// Shorthand for client call results.
pub type ApiResult<T> = Result<T, ApiError>;

/// One entry of the batch order submission.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct OrderUpdate {
    /// Numeric section id.
    pub id: i64,
    /// New sibling position, sequential from zero.
    pub order: i64,
    /// New parent endpoint, `None` for root.
    pub parent: Option<String>,
}

/// Metadata row from the menu listing; keyed by endpoint, no numeric id.
#[derive(Clone, Debug, Deserialize)]
pub struct MenuSectionMeta {
    /// Endpoint slug, the row's identity.
    pub endpoint: String,
    /// Stored title override, if any.
    #[serde(default)]
    pub title: Option<String>,
    /// Content parent endpoint, possibly path-prefixed.
    #[serde(default)]
    pub parent: Option<String>,
    /// Menu placement parent, when it differs from the content parent.
    #[serde(default)]
    pub menu_parent: Option<String>,
    /// Explicit menu order, zero when unset.
    #[serde(default)]
    pub order: i64,
    /// Whether the section appears in the public menu.
    #[serde(default)]
    pub show_in_menu: bool,
}

/// Per-step content payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StepContent {
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Plain-text body.
    #[serde(default)]
    pub text: String,
    /// Structured blocks, kept as raw JSON until parsed.
    #[serde(default)]
    pub content_blocks: Vec<Value>,
    /// Schema-driven form payload, passed through opaquely.
    #[serde(default)]
    pub form_data: Option<Value>,
}

#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct SectionsResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Deserialize)]
struct MenuSectionsResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    sections: Vec<MenuSectionMeta>,
}

#[derive(Deserialize)]
struct RenameResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    section: Option<RenamedSection>,
}

#[derive(Deserialize)]
struct RenamedSection {
    title: String,
}

#[derive(Deserialize)]
struct StepContentResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    section: Option<StepContent>,
}

#[derive(Deserialize)]
struct CreateResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    section: Option<CreatedSection>,
}

/// What the backend reports after creating a subsection.
#[derive(Clone, Debug, Deserialize)]
pub struct CreatedSection {
    /// Endpoint the backend assigned.
    pub endpoint: String,
    /// Public URL of the new page, when the backend returns one.
    #[serde(default)]
    pub url: Option<String>,
}

/// Synchronous client against the admin and sidebar APIs.
pub struct ApiClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    /// Build a client against `base` (scheme + host, no trailing slash
    /// required).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new(base: &str) -> ApiResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn check(success: bool, error: Option<String>) -> ApiResult<()> {
        if success {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                error.unwrap_or_else(|| "request rejected".to_string()),
            ))
        }
    }

    /// `GET /admin/api/sections` - full flat list for the sitemap.
    pub fn fetch_sections(&self) -> ApiResult<Vec<Section>> {
        debug!("fetching sitemap sections");
        let resp: SectionsResponse = self
            .http
            .get(self.url("/admin/api/sections"))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)?;
        Ok(resp.sections)
    }

    /// `POST /admin/api/sections/order` - batch order/parent persistence,
    /// all-or-nothing on the backend side.
    pub fn save_order(&self, updates: &[OrderUpdate]) -> ApiResult<()> {
        debug!(count = updates.len(), "submitting section order");
        let resp: Envelope = self
            .http
            .post(self.url("/admin/api/sections/order"))
            .json(&serde_json::json!({ "updates": updates }))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)
    }

    /// `PATCH /admin/api/sections/{id}` - rename; returns the stored title.
    pub fn rename_section(&self, id: i64, title: &str) -> ApiResult<String> {
        let resp: RenameResponse = self
            .http
            .patch(self.url(&format!("/admin/api/sections/{id}")))
            .json(&serde_json::json!({ "title": title }))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)?;
        Ok(resp
            .section
            .map(|s| s.title)
            .unwrap_or_else(|| title.to_string()))
    }

    /// `POST /admin/api/sections/quick-create` - create a root section or,
    /// with `parent`, a subsection.
    pub fn quick_create(&self, title: &str, parent: Option<&str>) -> ApiResult<()> {
        let mut body = serde_json::json!({ "title": title });
        if let Some(parent) = parent {
            body["parent"] = Value::String(parent.to_string());
        }
        let resp: Envelope = self
            .http
            .post(self.url("/admin/api/sections/quick-create"))
            .json(&body)
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)
    }

    /// `DELETE /admin/api/sections/{id}`.
    pub fn delete_section(&self, id: i64) -> ApiResult<()> {
        let resp: Envelope = self
            .http
            .delete(self.url(&format!("/admin/api/sections/{id}")))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)
    }

    /// `GET /sidebar/get_all_sections` - menu metadata for the wizard.
    pub fn fetch_menu_sections(&self) -> ApiResult<Vec<MenuSectionMeta>> {
        debug!("fetching menu sections");
        let resp: MenuSectionsResponse = self
            .http
            .get(self.url("/sidebar/get_all_sections"))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)?;
        Ok(resp.sections)
    }

    /// `POST /sidebar/reorder_sections` - full sibling order for one parent.
    /// Parent travels as a bare endpoint, never path-prefixed.
    pub fn reorder_menu(&self, parent: Option<&str>, ordered: &[String]) -> ApiResult<()> {
        debug!(?parent, count = ordered.len(), "reordering menu siblings");
        let resp: Envelope = self
            .http
            .post(self.url("/sidebar/reorder_sections"))
            .json(&serde_json::json!({
                "parent": parent,
                "ordered_endpoints": ordered,
            }))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)
    }

    /// `POST /sidebar/delete_subsection`.
    pub fn delete_subsection(&self, endpoint: &str) -> ApiResult<()> {
        let resp: Envelope = self
            .http
            .post(self.url("/sidebar/delete_subsection"))
            .json(&serde_json::json!({ "endpoint": endpoint }))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)
    }

    /// `GET /sidebar/section/{endpoint}` - one step's content payload.
    pub fn fetch_step_content(&self, endpoint: &str) -> ApiResult<StepContent> {
        let resp: StepContentResponse = self
            .http
            .get(self.url(&format!("/sidebar/section/{endpoint}")))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)?;
        Ok(resp.section.unwrap_or_default())
    }

    /// `POST /sidebar/create` - create a wizard subsection.
    pub fn create_subsection(
        &self,
        title: &str,
        endpoint: &str,
        content: &str,
        parent: Option<&str>,
    ) -> ApiResult<CreatedSection> {
        let resp: CreateResponse = self
            .http
            .post(self.url("/sidebar/create"))
            .json(&serde_json::json!({
                "title": title,
                "endpoint": endpoint,
                "content": content,
                "parent": parent,
            }))
            .send()?
            .json()?;
        Self::check(resp.success, resp.error)?;
        resp.section
            .ok_or_else(|| ApiError::Rejected("backend returned no section".to_string()))
    }
}
