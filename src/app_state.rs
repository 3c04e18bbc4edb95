//! The application state bridging the backend section list and the editor.
//!
//! All mutable state lives in one `App` owned by the event loop: the sitemap
//! editor, the wizard model, the command buffer, and transient popups. There
//! are no globals; every handler receives the context explicitly. Backend
//! round-trips are synchronous, so exactly one writer touches the model at a
//! time and a failed call leaves it at last-known-good.

use crate::client::{ApiClient, ApiError};
use crate::config::Config;
use crate::sitemap::SitemapEditor;
use crate::wizard::WizardModel;
use ratatui::layout::Rect;
use tracing::{info, warn};

#[derive(Clone, Copy, PartialEq, Eq)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// The section tree with drag-and-drop.
    Sitemap,
    /// The step accordion with up/down reordering.
    Wizard,
    /// Move-to-parent selector popup over the sitemap.
    ParentSelect,
    /// Captures vim-style command input after ':'.
    Command,
}

/// State of the move-to-parent selector popup.
pub struct ParentSelect {
    /// Section being moved.
    pub section_id: i64,
    /// Candidate parents as (endpoint key, display title), root first.
    pub options: Vec<(Option<String>, String)>,
    /// Highlighted option index.
    pub cursor: usize,
}

/// Where one sitemap row was drawn last frame, for mouse hit-testing.
#[derive(Clone, Copy, Debug)]
pub struct RowHit {
    /// Section id of the row.
    pub id: i64,
    /// Terminal area the row occupied.
    pub area: Rect,
}

/// Bridges the backend and the interactive editors, maintaining session state.
pub struct App {
    /// Which screen is active.
    pub view: View,
    /// View to return to when command mode closes.
    pub command_return: View,
    /// The sitemap tree editor.
    pub sitemap: SitemapEditor,
    /// The wizard step model.
    pub wizard: WizardModel,
    /// Synchronous backend client.
    pub client: ApiClient,
    /// Loaded configuration.
    pub config: Config,
    /// Accumulates vim-style command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Cursor into the wizard accordion rows.
    pub wizard_cursor: usize,
    /// Open move-to-parent popup, if any.
    pub parent_select: Option<ParentSelect>,
    /// Row hit map refreshed by the renderer each frame.
    pub sitemap_hits: Vec<RowHit>,
    /// Set once the wizard has merged backend metadata this session.
    pub wizard_loaded: bool,
    /// Set by `:q`; the event loop exits at the top of its next pass.
    pub should_quit: bool,
}

impl App {
    /// Connect to the backend and load the sitemap.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the initial fetch
    /// fails; after startup, failures are surfaced as messages instead.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let client = ApiClient::new(&config.server_url)?;
        let sections = client.fetch_sections()?;
        info!(count = sections.len(), "loaded sitemap");
        let wizard = WizardModel::new(&config.protected_endpoints);
        Ok(Self {
            view: View::Sitemap,
            command_return: View::Sitemap,
            sitemap: SitemapEditor::new(sections),
            wizard,
            client,
            config,
            command_buffer: String::new(),
            message: None,
            wizard_cursor: 0,
            parent_select: None,
            sitemap_hits: Vec::new(),
            wizard_loaded: false,
            should_quit: false,
        })
    }

    /// Discard in-memory sitemap state and refetch. Unsaved edits are lost,
    /// which is exactly what reload is for.
    pub fn reload_sitemap(&mut self) {
        match self.client.fetch_sections() {
            Ok(sections) => {
                self.sitemap = SitemapEditor::new(sections);
                self.message = None;
            }
            Err(e) => self.fail("load", &e),
        }
    }

    /// Submit the full `{id, order, parent}` batch. Success reloads from the
    /// backend to confirm server state; failure leaves memory untouched.
    pub fn save_sitemap(&mut self) {
        let updates = self.sitemap.order_updates();
        match self.client.save_order(&updates) {
            Ok(()) => {
                self.message = Some("Saved".to_string());
                self.reload_sitemap();
            }
            Err(e) => self.fail("save", &e),
        }
    }

    /// First switch into the wizard fetches the menu metadata and merges it
    /// into the step catalog.
    pub fn open_wizard(&mut self) {
        self.view = View::Wizard;
        match self.client.fetch_menu_sections() {
            Ok(metas) => {
                self.wizard.merge_remote(&metas);
                self.wizard_loaded = true;
            }
            Err(e) => self.fail("load menu", &e),
        }
    }

    /// Select the accordion row under the wizard cursor, lazily fetching its
    /// content payload.
    pub fn select_wizard_row(&mut self) {
        let rows = self.wizard.accordion_rows();
        let Some(row) = rows.get(self.wizard_cursor) else {
            return;
        };
        let endpoint = row.endpoint.clone();
        self.wizard.select(&endpoint);
        let loaded = self
            .wizard
            .data
            .get(&endpoint)
            .is_some_and(|d| d.loaded);
        if !loaded {
            match self.client.fetch_step_content(&endpoint) {
                Ok(content) => self.wizard.set_step_data(&endpoint, &content),
                Err(e) => self.fail("load step", &e),
            }
        }
    }

    /// Move the step under the wizard cursor among its menu siblings and
    /// persist the order immediately. The render always reflects the swap,
    /// whatever the network outcome.
    pub fn move_wizard_step(&mut self, direction: i64) {
        let rows = self.wizard.accordion_rows();
        let Some(row) = rows.get(self.wizard_cursor) else {
            return;
        };
        let endpoint = row.endpoint.clone();
        if let Some(plan) = self.wizard.move_step(&endpoint, direction) {
            if let Err(e) = self
                .client
                .reorder_menu(plan.parent.as_deref(), &plan.ordered)
            {
                self.fail("reorder", &e);
            }
            // Keep the cursor on the step that moved.
            let rows = self.wizard.accordion_rows();
            if let Some(pos) = rows.iter().position(|r| r.endpoint == endpoint) {
                self.wizard_cursor = pos;
            }
        }
    }

    /// Open the move-to-parent selector for the sitemap cursor row.
    pub fn open_parent_select(&mut self) {
        let Some(row) = self.sitemap.cursor_row() else {
            return;
        };
        let id = row.id;
        let options = self.sitemap.parent_options(id);
        let current = self
            .sitemap
            .section_by_id(id)
            .and_then(crate::section::Section::normalized_parent);
        let cursor = options
            .iter()
            .position(|(key, _)| *key == current)
            .unwrap_or(0);
        self.parent_select = Some(ParentSelect {
            section_id: id,
            options,
            cursor,
        });
        self.view = View::ParentSelect;
    }

    /// Commit the parent selector: same cycle guard, renumber, and re-render
    /// as the drag path.
    pub fn commit_parent_select(&mut self) {
        if let Some(select) = self.parent_select.take() {
            if let Some((parent, _)) = select.options.get(select.cursor) {
                self.sitemap
                    .move_to_parent(select.section_id, parent.clone());
            }
        }
        self.view = View::Sitemap;
    }

    /// Execute a vim-style command from the buffer.
    pub fn run_command(&mut self, cmd: &str) {
        self.view = self.command_return;
        let (name, arg) = match cmd.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };
        match (name, self.view) {
            ("q" | "q!", _) => self.should_quit = true,
            ("w", View::Sitemap) => self.save_sitemap(),
            ("w", _) => self.message = Some("Nothing to save".to_string()),
            ("r", View::Sitemap) => self.reload_sitemap(),
            ("r", View::Wizard) => self.open_wizard(),
            ("new", View::Sitemap) if !arg.is_empty() => self.quick_create(arg, None),
            ("sub", View::Sitemap) if !arg.is_empty() => {
                let parent = self.sitemap.cursor_row().map(|r| r.endpoint.clone());
                self.quick_create(arg, parent);
            }
            ("sub", View::Wizard) if !arg.is_empty() => self.create_wizard_subsection(arg),
            ("rename", View::Sitemap) if !arg.is_empty() => self.rename_cursor(arg),
            ("del", View::Sitemap | View::Wizard) => {
                self.message = Some("Use :del! to confirm deletion".to_string());
            }
            ("del!", View::Sitemap) => self.delete_cursor(),
            ("del!", View::Wizard) => self.delete_wizard_step(),
            _ => self.message = Some(format!("Unknown command: {cmd}")),
        }
    }

    fn quick_create(&mut self, title: &str, parent: Option<String>) {
        match self.client.quick_create(title, parent.as_deref()) {
            Ok(()) => {
                self.message = Some(format!("Created \"{title}\""));
                self.reload_sitemap();
            }
            Err(e) => self.fail("create", &e),
        }
    }

    fn rename_cursor(&mut self, title: &str) {
        let Some(row) = self.sitemap.cursor_row() else {
            return;
        };
        let id = row.id;
        match self.client.rename_section(id, title) {
            Ok(stored) => {
                self.sitemap.set_title(id, stored);
                self.message = None;
            }
            Err(e) => self.fail("rename", &e),
        }
    }

    fn delete_cursor(&mut self) {
        let Some(row) = self.sitemap.cursor_row() else {
            return;
        };
        let id = row.id;
        match self.client.delete_section(id) {
            Ok(()) => {
                self.message = Some("Section deleted".to_string());
                self.reload_sitemap();
            }
            Err(e) => self.fail("delete", &e),
        }
    }

    /// Create a subsection under the selected step and inject it into the
    /// open wizard without a full reload.
    fn create_wizard_subsection(&mut self, title: &str) {
        let parent = self.wizard.selected.clone();
        let endpoint = slugify(title);
        if endpoint.is_empty() {
            self.message = Some("Title yields an empty endpoint".to_string());
            return;
        }
        match self
            .client
            .create_subsection(title, &endpoint, "", parent.as_deref())
        {
            Ok(created) => {
                self.wizard
                    .ensure_step(&created.endpoint, Some(title), parent);
                self.message = Some(format!("Created \"{title}\""));
            }
            Err(e) => self.fail("create", &e),
        }
    }

    fn delete_wizard_step(&mut self) {
        let rows = self.wizard.accordion_rows();
        let Some(row) = rows.get(self.wizard_cursor) else {
            return;
        };
        if !row.deletable {
            self.message = Some("This step cannot be deleted".to_string());
            return;
        }
        let endpoint = row.endpoint.clone();
        match self.client.delete_subsection(&endpoint) {
            Ok(()) => {
                self.wizard.remove_step(&endpoint);
                self.message = Some("Step deleted".to_string());
                let rows = self.wizard.accordion_rows();
                if self.wizard_cursor >= rows.len() {
                    self.wizard_cursor = rows.len().saturating_sub(1);
                }
            }
            Err(e) => self.fail("delete", &e),
        }
    }

    /// Surface a failure verbatim and keep the model as it was.
    fn fail(&mut self, action: &str, error: &ApiError) {
        warn!(action, %error, "backend call failed");
        self.message = Some(format!("Error ({action}): {error}"));
    }
}

/// URL-path-safe slug for a new subsection endpoint.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}
