//! The wizard step model: a static catalog merged with backend sections.
//!
//! Every step corresponds to one section's content form. Two parent relations
//! coexist and must never be collapsed: `parent` is page containment (drives
//! delete-eligibility and every cycle check), `menu_parent` is where the
//! step's button appears in the accordion and falls back to the content
//! parent when unset. The accordion is rebuilt from the step list on every
//! render; collapsed parents hide their subtree entirely.

use crate::blocks::{flatten_blocks, RawBlock};
use crate::client::{MenuSectionMeta, StepContent};
use crate::forest::{build_forest, menu_order, HasOrderTitle, TreeNode, MAX_DEPTH};
use crate::section::normalize_parent;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Input widget kind for a step form field.
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    TextArea,
    /// Boolean toggle.
    Checkbox,
    /// Choice from a fixed option list.
    Select,
    /// Image gallery upload.
    Images,
    /// Document list upload.
    Documents,
    /// Either an uploaded file or inline text.
    FileOrText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One entry of a step's field schema.
pub struct FieldSpec {
    /// Form key the backend stores the value under.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Widget kind.
    pub kind: FieldKind,
    /// Whether the form refuses to submit without it.
    pub required: bool,
}

fn field(name: &str, label: &str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        label: label.to_string(),
        kind,
        required,
    }
}

/// Schema given to sections discovered from the backend.
fn default_fields() -> Vec<FieldSpec> {
    vec![
        field("title", "Page title", FieldKind::Text, true),
        field("content", "Page content", FieldKind::TextArea, false),
        field("images", "Images", FieldKind::Images, false),
        field("documents", "Documents", FieldKind::Documents, false),
    ]
}

#[derive(Clone, Debug)]
/// A wizard-editable unit corresponding to one section's content form.
pub struct Step {
    /// Endpoint slug, the step's identity.
    pub endpoint: String,
    /// Display title.
    pub title: String,
    /// Content containment; cycle checks and delete-eligibility anchor here.
    pub parent: Option<String>,
    /// Menu placement only; never checked against content nesting.
    pub menu_parent: Option<String>,
    /// Explicit menu order, zero when unset.
    pub order: i64,
    /// Seed steps that are part of the page structure and cannot go away.
    pub is_static: bool,
    /// Explicit delete-eligibility, derived once from `is_static` plus the
    /// configured protected set.
    pub deletable: bool,
    /// Form schema for the step's content.
    pub fields: Vec<FieldSpec>,
}

impl TreeNode for Step {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parent_key(&self) -> Option<String> {
        normalize_parent(self.parent.as_deref())
    }
}

impl HasOrderTitle for Step {
    fn order(&self) -> i64 {
        self.order
    }

    fn title_lower(&self) -> String {
        self.title.to_lowercase()
    }
}

#[derive(Clone, Debug, Default)]
/// Loaded content for one step.
pub struct StepData {
    /// Title as stored on the backend.
    pub title: String,
    /// Plain-text body.
    pub text: String,
    /// Parsed content blocks, unknown kinds preserved opaquely.
    pub blocks: Vec<RawBlock>,
    /// Whether the section appears in the public menu.
    pub show_in_menu: bool,
    /// Per-step override of the menu placement, ahead of the catalog value.
    pub menu_parent: Option<String>,
    /// Whether the content round-trip has completed.
    pub loaded: bool,
}

/// One visible accordion row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccordionRow {
    /// Step endpoint the row stands for.
    pub endpoint: String,
    /// Display title.
    pub title: String,
    /// Hierarchical position, e.g. "2.1.3".
    pub number: String,
    /// Nesting depth, zero for roots.
    pub depth: usize,
    /// Whether the step has menu children.
    pub has_children: bool,
    /// Whether those children are currently shown.
    pub expanded: bool,
    /// Whether the row offers deletion.
    pub deletable: bool,
}

/// What a sibling move needs to persist: the resolved parent and the full
/// ordered sibling endpoint list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Parent whose sibling group was reordered, `None` for the root level.
    pub parent: Option<String>,
    /// Every sibling endpoint in its new order.
    pub ordered: Vec<String>,
}

/// Holds the step list, per-step data, and accordion state. One instance per
/// open wizard.
pub struct WizardModel {
    /// All known steps, catalog and discovered alike.
    pub steps: Vec<Step>,
    /// Loaded content keyed by endpoint.
    pub data: HashMap<String, StepData>,
    /// Endpoints whose accordion subtrees are open.
    pub expanded: HashSet<String>,
    /// Endpoint shown in the detail pane.
    pub selected: Option<String>,
    protected: HashSet<String>,
}

impl WizardModel {
    #[must_use]
    /// Seed the model with the static catalog. `protected` lists endpoints
    /// that must never be offered for deletion.
    pub fn new(protected: &[String]) -> Self {
        let protected: HashSet<String> = protected.iter().cloned().collect();
        let mut model = Self {
            steps: seed_catalog(),
            data: HashMap::new(),
            expanded: HashSet::new(),
            selected: None,
            protected,
        };
        for step in &mut model.steps {
            step.deletable = !step.is_static && !model.protected.contains(&step.endpoint);
        }
        model
    }

    #[must_use]
    /// Look a step up by endpoint.
    pub fn step(&self, endpoint: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.endpoint == endpoint)
    }

    #[must_use]
    /// Content parent: `step.parent`, normalized.
    pub fn content_parent(step: &Step) -> Option<String> {
        normalize_parent(step.parent.as_deref())
    }

    /// Menu parent: per-step data override, else the catalog value, else the
    /// content parent. Used only for building the accordion.
    #[must_use]
    pub fn menu_parent_of(&self, step: &Step) -> Option<String> {
        let data = self.data.get(&step.endpoint);
        data.and_then(|d| normalize_parent(d.menu_parent.as_deref()))
            .or_else(|| normalize_parent(step.menu_parent.as_deref()))
            .or_else(|| Self::content_parent(step))
    }

    /// Merge in metadata fetched from the backend: fill parent/menu_parent on
    /// catalog steps that lack them, carry order, and append steps for
    /// endpoints the catalog does not know, with the default schema. Then
    /// inject the menu fields and re-sort.
    pub fn merge_remote(&mut self, metas: &[MenuSectionMeta]) {
        for meta in metas {
            if let Some(pos) = self.steps.iter().position(|s| s.endpoint == meta.endpoint) {
                let step = &mut self.steps[pos];
                if step.parent.is_none() {
                    step.parent = normalize_parent(meta.parent.as_deref());
                }
                if step.menu_parent.is_none() {
                    step.menu_parent = normalize_parent(meta.menu_parent.as_deref());
                }
                step.order = meta.order;
            } else {
                let title = meta
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| title_from_endpoint(&meta.endpoint));
                let deletable = !self.protected.contains(&meta.endpoint);
                self.steps.push(Step {
                    endpoint: meta.endpoint.clone(),
                    title,
                    parent: normalize_parent(meta.parent.as_deref()),
                    menu_parent: normalize_parent(meta.menu_parent.as_deref()),
                    order: meta.order,
                    is_static: false,
                    deletable,
                    fields: default_fields(),
                });
            }
            let entry = self.data.entry(meta.endpoint.clone()).or_default();
            entry.show_in_menu = meta.show_in_menu;
        }
        self.inject_menu_fields();
        self.sort_steps();
    }

    /// Schema augmentation applied once per load: a "show in menu" checkbox
    /// at the front, a "menu parent" select second, and a guaranteed images
    /// field. Each insert is presence-checked, so the pass is idempotent.
    pub fn inject_menu_fields(&mut self) {
        for step in &mut self.steps {
            if !step
                .fields
                .iter()
                .any(|f| f.name == "show_in_menu" && f.kind == FieldKind::Checkbox)
            {
                step.fields
                    .insert(0, field("show_in_menu", "Show in side menu", FieldKind::Checkbox, false));
            }
            if !step
                .fields
                .iter()
                .any(|f| f.name == "menu_parent" && f.kind == FieldKind::Select)
            {
                let at = 1.min(step.fields.len());
                step.fields
                    .insert(at, field("menu_parent", "Place in side menu", FieldKind::Select, false));
            }
            if !step
                .fields
                .iter()
                .any(|f| f.name == "images" && f.kind == FieldKind::Images)
            {
                let images = field("images", "Images", FieldKind::Images, false);
                match step
                    .fields
                    .iter()
                    .position(|f| f.name == "documents" && f.kind == FieldKind::Documents)
                {
                    Some(at) => step.fields.insert(at + 1, images),
                    None => step.fields.push(images),
                }
            }
        }
    }

    /// Re-order the step list depth-first by content parent so the wizard's
    /// flow matches the menu: siblings by explicit order (0 sorts last), then
    /// title, then endpoint.
    pub fn sort_steps(&mut self) {
        let flat = crate::forest::flatten(&self.steps, Step::parent_key, menu_order);
        let mut reordered = Vec::with_capacity(self.steps.len());
        for row in flat {
            reordered.push(self.steps[row.index].clone());
        }
        self.steps = reordered;
    }

    /// Dynamic step injection: a subsection created while the wizard is open
    /// joins the list with a minimal data entry, without a full reload.
    /// Returns the step's index; an existing endpoint is left untouched.
    pub fn ensure_step(&mut self, endpoint: &str, title: Option<&str>, parent: Option<String>) -> usize {
        if let Some(index) = self.steps.iter().position(|s| s.endpoint == endpoint) {
            return index;
        }
        debug!(endpoint, "injecting dynamic step");
        let title = title
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| title_from_endpoint(endpoint));
        let deletable = !self.protected.contains(endpoint);
        self.steps.push(Step {
            endpoint: endpoint.to_string(),
            title,
            parent: normalize_parent(parent.as_deref()),
            menu_parent: None,
            order: 0,
            is_static: false,
            deletable,
            fields: default_fields(),
        });
        self.data.entry(endpoint.to_string()).or_default();
        self.inject_menu_fields();
        self.steps.len() - 1
    }

    /// Store a fetched content payload, flattening nested blocks.
    pub fn set_step_data(&mut self, endpoint: &str, content: &StepContent) {
        let mut data = StepData {
            title: content.title.clone(),
            text: content.text.clone(),
            blocks: flatten_blocks(&content.content_blocks),
            loaded: true,
            ..StepData::default()
        };
        if let Some(form) = &content.form_data {
            data.show_in_menu = truthy(form.get("show_in_menu"));
            data.menu_parent =
                normalize_parent(form.get("menu_parent").and_then(Value::as_str));
        }
        self.data.insert(endpoint.to_string(), data);
    }

    /// Open a collapsed subtree, or close an open one.
    pub fn toggle_expanded(&mut self, endpoint: &str) {
        if !self.expanded.remove(endpoint) {
            self.expanded.insert(endpoint.to_string());
        }
    }

    /// Select a step, making sure its menu parent is expanded so it stays
    /// visible.
    pub fn select(&mut self, endpoint: &str) {
        if let Some(step) = self.step(endpoint) {
            if let Some(parent) = self.menu_parent_of(step) {
                self.expanded.insert(parent);
            }
        }
        self.selected = Some(endpoint.to_string());
    }

    /// Drop a step after the backend confirmed its deletion.
    pub fn remove_step(&mut self, endpoint: &str) {
        self.steps.retain(|s| s.endpoint != endpoint);
        self.data.remove(endpoint);
        self.expanded.remove(endpoint);
        if self.selected.as_deref() == Some(endpoint) {
            self.selected = None;
        }
    }

    /// Options for the "place in side menu" select: top level plus every root
    /// step except the step itself.
    #[must_use]
    pub fn menu_parent_options(&self, endpoint: &str) -> Vec<(Option<String>, String)> {
        let mut options = vec![(None, "(top level)".to_string())];
        for step in &self.steps {
            if step.endpoint == endpoint || self.menu_parent_of(step).is_some() {
                continue;
            }
            options.push((Some(step.endpoint.clone()), step.title.clone()));
        }
        options
    }

    /// Siblings sharing one resolved menu parent, in accordion order.
    fn sibling_indices(&self, parent: &Option<String>) -> Vec<usize> {
        let mut siblings: Vec<usize> = self
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| self.menu_parent_of(s) == *parent)
            .map(|(i, _)| i)
            .collect();
        siblings.sort_by(|&a, &b| menu_order(&self.steps[a], &self.steps[b]));
        siblings
    }

    /// Swap a step with its adjacent sibling. Returns what to persist, or
    /// `None` at either boundary - a boundary move issues no network call.
    /// Sibling orders are renumbered from 1 so the optimistic render matches
    /// what the backend will store.
    pub fn move_step(&mut self, endpoint: &str, direction: i64) -> Option<ReorderPlan> {
        let step = self.step(endpoint)?;
        let parent = self.menu_parent_of(step);
        let mut siblings = self.sibling_indices(&parent);
        let pos = siblings
            .iter()
            .position(|&i| self.steps[i].endpoint == endpoint)?;
        let target = match direction.signum() {
            -1 => pos.checked_sub(1),
            1 if pos + 1 < siblings.len() => Some(pos + 1),
            _ => None,
        }?;
        siblings.swap(pos, target);
        for (&index, position) in siblings.iter().zip(1i64..) {
            self.steps[index].order = position;
        }
        Some(ReorderPlan {
            parent,
            ordered: siblings
                .iter()
                .map(|&i| self.steps[i].endpoint.clone())
                .collect(),
        })
    }

    /// Build the visible accordion: forest keyed by menu parent, hierarchical
    /// numbering by traversal position, collapsed parents hide their subtree.
    /// Steps unreachable from any root are appended at the end so nothing
    /// disappears.
    #[must_use]
    pub fn accordion_rows(&self) -> Vec<AccordionRow> {
        let endpoints: HashSet<&str> = self.steps.iter().map(|s| s.endpoint.as_str()).collect();
        let mut groups = build_forest(&self.steps, |step| {
            self.menu_parent_of(step)
                .filter(|p| endpoints.contains(p.as_str()))
        });
        for group in groups.values_mut() {
            group.sort_by(|&a, &b| menu_order(&self.steps[a], &self.steps[b]));
        }

        let mut rows = Vec::new();
        let mut visited = vec![false; self.steps.len()];
        let mut path = Vec::new();
        self.walk_group(&groups, &None, 0, &mut path, &mut visited, &mut rows);

        let mut leftover = rows.len();
        for (index, step) in self.steps.iter().enumerate() {
            if !visited[index] {
                leftover += 1;
                rows.push(AccordionRow {
                    endpoint: step.endpoint.clone(),
                    title: step.title.clone(),
                    number: leftover.to_string(),
                    depth: 0,
                    has_children: false,
                    expanded: false,
                    deletable: step.deletable,
                });
            }
        }
        rows
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_group(
        &self,
        groups: &HashMap<Option<String>, Vec<usize>>,
        key: &Option<String>,
        depth: usize,
        path: &mut Vec<usize>,
        visited: &mut Vec<bool>,
        rows: &mut Vec<AccordionRow>,
    ) {
        if depth >= MAX_DEPTH {
            return;
        }
        let Some(children) = groups.get(key) else {
            return;
        };
        let mut position = 0;
        for &index in children {
            if visited[index] {
                continue;
            }
            visited[index] = true;
            position += 1;
            path.push(position);
            let step = &self.steps[index];
            let child_key = Some(step.endpoint.clone());
            let has_children = groups.get(&child_key).is_some_and(|g| !g.is_empty());
            let expanded = self.expanded.contains(&step.endpoint);
            rows.push(AccordionRow {
                endpoint: step.endpoint.clone(),
                title: step.title.clone(),
                number: path
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("."),
                depth,
                has_children,
                expanded,
                deletable: step.deletable,
            });
            if has_children {
                if expanded {
                    self.walk_group(groups, &child_key, depth + 1, path, visited, rows);
                } else {
                    // The subtree must still be claimed, or the leftover pass
                    // would resurface hidden descendants at the root.
                    self.mark_subtree_visited(groups, &child_key, depth + 1, visited);
                }
            }
            path.pop();
        }
    }

    /// Mark every step reachable under `key` as visited without emitting
    /// rows, so a collapsed parent hides its whole subtree instead of leaking
    /// it into the leftover pass. Same depth cap as the visible walk.
    fn mark_subtree_visited(
        &self,
        groups: &HashMap<Option<String>, Vec<usize>>,
        key: &Option<String>,
        depth: usize,
        visited: &mut Vec<bool>,
    ) {
        if depth >= MAX_DEPTH {
            return;
        }
        let Some(children) = groups.get(key) else {
            return;
        };
        for &index in children {
            if visited[index] {
                continue;
            }
            visited[index] = true;
            let child_key = Some(self.steps[index].endpoint.clone());
            self.mark_subtree_visited(groups, &child_key, depth + 1, visited);
        }
    }
}

/// "my-page" -> "My Page", for sections the backend knows only by slug.
#[must_use]
pub fn title_from_endpoint(endpoint: &str) -> String {
    endpoint
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Loose truthiness matching what historical form saves stored: booleans,
/// numeric 1, and the strings "1"/"true".
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// The hard-coded catalog of known steps. Sections discovered from the
/// backend that are not listed here get the default schema instead.
fn seed_catalog() -> Vec<Step> {
    let seed = |endpoint: &str, title: &str, parent: Option<&str>, is_static: bool, fields: Vec<FieldSpec>| Step {
        endpoint: endpoint.to_string(),
        title: title.to_string(),
        parent: parent.map(ToString::to_string),
        menu_parent: None,
        order: 0,
        is_static,
        deletable: false,
        fields,
    };
    // Most pages share the plain title/content/documents form; the ones with
    // an extra file slot or photo gallery spell their schema out.
    let docs_page = |endpoint: &str, title: &str| {
        seed(
            endpoint,
            title,
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("documents", "Documents", FieldKind::Documents, false),
            ],
        )
    };
    let docs_images_page = |endpoint: &str, title: &str| {
        seed(
            endpoint,
            title,
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("documents", "Documents", FieldKind::Documents, false),
                field("images", "Images", FieldKind::Images, false),
            ],
        )
    };
    vec![
        docs_images_page("appeals", "Citizen appeals"),
        docs_images_page("anti-corruption", "Anti-corruption"),
        seed(
            "food",
            "School meals",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("menu_document", "Menu (document)", FieldKind::FileOrText, false),
                field("documents", "Additional documents", FieldKind::Documents, false),
                field("images", "Images", FieldKind::Images, false),
            ],
        ),
        seed(
            "nutrition-dishes-archive",
            "Daily menu archive",
            Some("food"),
            true,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, false),
                field("images", "Images", FieldKind::Images, false),
                field("documents", "Documents", FieldKind::Documents, false),
            ],
        ),
        seed(
            "admission-grade1",
            "First grade admission",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("rules_document", "Admission rules (document)", FieldKind::FileOrText, false),
                field("documents", "Documents", FieldKind::Documents, false),
            ],
        ),
        seed(
            "admission-grade10",
            "Tenth grade admission",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("rules_document", "Admission rules (document)", FieldKind::FileOrText, false),
                field("documents", "Documents", FieldKind::Documents, false),
            ],
        ),
        seed(
            "history",
            "History",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("images", "Historical photographs", FieldKind::Images, false),
            ],
        ),
        seed(
            "ushakov-festival",
            "Ushakov Festival",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("images", "Festival photographs", FieldKind::Images, false),
                field("documents", "Documents", FieldKind::Documents, false),
            ],
        ),
        seed(
            "schedule",
            "Schedule",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("schedule_document", "Schedule (document)", FieldKind::FileOrText, false),
                field("documents", "Additional documents", FieldKind::Documents, false),
            ],
        ),
        docs_page("for-parents", "For parents"),
        docs_page("gia-ege-oge", "State final exams"),
        docs_images_page("additional-info", "Additional information"),
        docs_page("class-leadership-payment", "Class leadership payments"),
        docs_page("electronic-environment", "Electronic learning environment"),
        docs_page("useful-info", "Useful information"),
        docs_page("information-security", "Information security"),
        docs_images_page("road-safety", "Road safety"),
        docs_page("targeted-training", "Targeted training"),
        docs_page("social-order-implementation", "Social order programmes"),
        seed(
            "recreation-organization",
            "Recreation",
            None,
            false,
            vec![
                field("title", "Page title", FieldKind::Text, true),
                field("content", "Page content", FieldKind::TextArea, true),
                field("images", "Photographs", FieldKind::Images, false),
                field("documents", "Documents", FieldKind::Documents, false),
            ],
        ),
        docs_page("parent-education", "Parent education"),
        docs_page("memos", "Memos"),
        docs_page("cbr-fraud-prevention", "Fraud prevention materials"),
        docs_page("financial-literacy", "Financial literacy"),
        docs_page("parental-control", "Parental control"),
        docs_page("inclusive-education", "Inclusive education"),
        docs_page("anti-terrorism", "Anti-terrorism"),
        docs_page("orkse", "Religious cultures and ethics"),
        docs_page("sanitary-shield", "Sanitary shield"),
    ]
}

#[cfg(test)]
#[path = "tests/wizard.rs"]
mod tests;
