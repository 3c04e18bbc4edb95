//! The sitemap editor: an explicit ordered tree model over the flat list.
//!
//! The rendered rows are always derived from the model, never the reverse.
//! Structural mutations (drop commits, the move-to-parent selector, keyboard
//! sibling moves) edit an ordered parent→children arrangement, then every
//! section's `order` and `parent` are re-derived from it: depth-first, each
//! sibling group numbered 0..n-1. Nothing reaches the backend until an
//! explicit save submits the whole batch.

use crate::client::OrderUpdate;
use crate::drag::{DragController, DropCommit, DropIntent};
use crate::forest::{descendant_endpoints, flatten, sitemap_order, would_create_cycle};
use crate::section::Section;
use ratatui::layout::Rect;
use tracing::debug;

/// One visible row of the tree.
#[derive(Clone, Debug)]
pub struct Row {
    /// Numeric section id.
    pub id: i64,
    /// Endpoint slug, for lookups keyed by endpoint.
    pub endpoint: String,
    /// Nesting depth, zero for roots.
    pub depth: usize,
}

/// Owns the section list and all transient sitemap interaction state.
/// One instance per open editor; handlers receive it explicitly.
pub struct SitemapEditor {
    sections: Vec<Section>,
    /// Visible rows, derived from the section list.
    pub rows: Vec<Row>,
    /// Cursor position as an index into `rows`.
    pub cursor: usize,
    /// Drag gesture state machine.
    pub drag: DragController,
    /// Structural edits not yet submitted with `:w`.
    pub dirty: bool,
}

impl SitemapEditor {
    #[must_use]
    /// Build an editor over a freshly fetched list. Legacy parent prefixes
    /// are normalized immediately, before any comparison.
    pub fn new(mut sections: Vec<Section>) -> Self {
        for section in &mut sections {
            section.parent = crate::section::normalize_parent(section.parent.as_deref());
        }
        let mut editor = Self {
            sections,
            rows: Vec::new(),
            cursor: 0,
            drag: DragController::default(),
            dirty: false,
        };
        editor.rebuild_rows();
        editor
    }

    #[must_use]
    /// The current section list, post-normalization.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    /// Look a section up by numeric id.
    pub fn section_by_id(&self, id: i64) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    #[must_use]
    /// The row under the cursor, if any rows exist.
    pub fn cursor_row(&self) -> Option<&Row> {
        self.rows.get(self.cursor)
    }

    /// Re-derive the visible rows from the model: roots first, children
    /// recursively, siblings sorted by order then title then endpoint.
    pub fn rebuild_rows(&mut self) {
        let flat = flatten(&self.sections, Section::normalized_parent, sitemap_order);
        self.rows = flat
            .iter()
            .map(|row| Row {
                id: self.sections[row.index].id,
                endpoint: self.sections[row.index].endpoint.clone(),
                depth: row.depth,
            })
            .collect();
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
    }

    /// The ordered arrangement as (parent key, child ids) groups, taken from
    /// the current row order.
    fn arrangement(&self) -> Vec<(Option<String>, Vec<i64>)> {
        let mut groups: Vec<(Option<String>, Vec<i64>)> = Vec::new();
        for row in &self.rows {
            let Some(section) = self.section_by_id(row.id) else {
                continue;
            };
            let key = section.normalized_parent();
            if let Some(pos) = groups.iter().position(|(k, _)| *k == key) {
                groups[pos].1.push(row.id);
            } else {
                groups.push((key, vec![row.id]));
            }
        }
        groups
    }

    /// Write an arrangement back onto the sections: depth-first sibling
    /// numbering from zero, parent set to the group key.
    fn apply_arrangement(&mut self, groups: Vec<(Option<String>, Vec<i64>)>) {
        for (parent, ids) in groups {
            for (id, position) in ids.iter().zip(0i64..) {
                if let Some(section) = self.sections.iter_mut().find(|s| s.id == *id) {
                    section.order = position;
                    section.parent = parent.clone();
                }
            }
        }
        self.rebuild_rows();
    }

    /// Feed a pointer position into the drag controller. Split out here so
    /// the controller can borrow the section list alongside itself.
    pub fn hover_drag(&mut self, target_id: i64, pointer_y: u16, target_area: Rect) {
        self.drag
            .hover(&self.sections, |s| s.id, target_id, pointer_y, target_area);
    }

    /// Apply a committed drop. Returns false when the cycle guard rejects it
    /// (the controller filters invalid hovers, but the commit is re-checked
    /// logically before any mutation).
    pub fn commit_drop(&mut self, commit: DropCommit) -> bool {
        let Some(dragged) = self.section_by_id(commit.dragged).cloned() else {
            return false;
        };
        let Some(target) = self.section_by_id(commit.target).cloned() else {
            return false;
        };
        if commit.dragged == commit.target
            || would_create_cycle(&dragged.endpoint, Some(&target.endpoint), &self.sections)
        {
            return false;
        }

        let mut groups = self.arrangement();
        for (_, ids) in &mut groups {
            ids.retain(|&id| id != commit.dragged);
        }

        match commit.intent {
            DropIntent::BecomeChild => {
                let key = Some(target.endpoint.clone());
                if let Some(pos) = groups.iter().position(|(k, _)| *k == key) {
                    groups[pos].1.push(commit.dragged);
                } else {
                    groups.push((key, vec![commit.dragged]));
                }
            }
            DropIntent::InsertBefore => {
                let key = target.normalized_parent();
                if let Some(pos) = groups.iter().position(|(k, _)| *k == key) {
                    let ids = &mut groups[pos].1;
                    let at = ids
                        .iter()
                        .position(|&id| id == commit.target)
                        .unwrap_or(ids.len());
                    ids.insert(at, commit.dragged);
                } else {
                    groups.push((key, vec![commit.dragged]));
                }
            }
        }

        debug!(
            dragged = commit.dragged,
            target = commit.target,
            intent = ?commit.intent,
            "drop committed"
        );
        self.apply_arrangement(groups);
        self.dirty = true;
        true
    }

    /// The move-to-parent selector's option list for one section: the root
    /// level plus every other section except the node itself and its full
    /// descendant set.
    #[must_use]
    pub fn parent_options(&self, id: i64) -> Vec<(Option<String>, String)> {
        let Some(section) = self.section_by_id(id) else {
            return Vec::new();
        };
        let excluded = descendant_endpoints(&self.sections, &section.endpoint);
        let mut options = vec![(None, "(root)".to_string())];
        for other in &self.sections {
            if other.id == id || excluded.contains(&other.endpoint) {
                continue;
            }
            options.push((Some(other.endpoint.clone()), other.title.clone()));
        }
        options
    }

    /// Alternate, non-drag reparenting path. Same cycle guard, same
    /// renumbering, same re-render.
    pub fn move_to_parent(&mut self, id: i64, new_parent: Option<String>) -> bool {
        let Some(section) = self.section_by_id(id).cloned() else {
            return false;
        };
        if would_create_cycle(&section.endpoint, new_parent.as_deref(), &self.sections) {
            return false;
        }
        if let Some(section) = self.sections.iter_mut().find(|s| s.id == id) {
            section.parent = new_parent;
        }
        self.rebuild_rows();
        let groups = self.arrangement();
        self.apply_arrangement(groups);
        self.dirty = true;
        true
    }

    /// Swap the section with its adjacent sibling (same parent). No-op at
    /// either boundary.
    pub fn move_among_siblings(&mut self, id: i64, delta: i64) -> bool {
        let mut groups = self.arrangement();
        let Some((_, ids)) = groups.iter_mut().find(|(_, ids)| ids.contains(&id)) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|&x| x == id) else {
            return false;
        };
        let target = match delta.signum() {
            -1 => pos.checked_sub(1),
            1 if pos + 1 < ids.len() => Some(pos + 1),
            _ => None,
        };
        let Some(target) = target else {
            return false;
        };
        ids.swap(pos, target);
        self.apply_arrangement(groups);
        self.dirty = true;
        true
    }

    /// The full `{id, order, parent}` batch for persistence, re-derived from
    /// the current arrangement first so the submitted state is exactly what
    /// is on screen.
    pub fn order_updates(&mut self) -> Vec<OrderUpdate> {
        let groups = self.arrangement();
        self.apply_arrangement(groups);
        self.sections
            .iter()
            .map(|s| OrderUpdate {
                id: s.id,
                order: s.order,
                parent: s.normalized_parent(),
            })
            .collect()
    }

    /// Record a backend-confirmed rename without reloading.
    pub fn set_title(&mut self, id: i64, title: String) {
        if let Some(section) = self.sections.iter_mut().find(|s| s.id == id) {
            section.title = title;
        }
        self.rebuild_rows();
    }
}

#[cfg(test)]
#[path = "tests/sitemap.rs"]
mod tests;
