//! The drag-and-drop interaction state machine for the sitemap tree.
//!
//! Owns only transient interaction state; committing a drop is the sitemap
//! editor's job. The machine is:
//!
//! ```text
//! Idle -> Dragging -> OverTarget -> Idle (commit on drop)
//!   ^________|____________|
//!        (cancel / invalid drop)
//! ```
//!
//! Hovering classifies the drop target's vertical half: above the midpoint
//! means "insert before the target", at or below it means "become a child of
//! the target". Sitemap rows render two terminal lines tall (title + URL), so
//! both halves are reachable with cell-granularity pointer events.

use crate::forest::{would_create_cycle, TreeNode};
use ratatui::layout::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Interpreted meaning of the gesture at the current pointer position.
pub enum DropIntent {
    /// Reorder: place the dragged node immediately before the target among
    /// the target's siblings.
    InsertBefore,
    /// Reparent: append the dragged node to the target's children.
    BecomeChild,
}

impl DropIntent {
    #[must_use]
    /// Classify a pointer row against a target row's vertical midpoint.
    /// The midpoint itself is inclusive toward `BecomeChild`.
    pub fn classify(pointer_y: u16, target: Rect) -> Self {
        let midpoint = target.y + target.height / 2;
        if pointer_y < midpoint {
            DropIntent::InsertBefore
        } else {
            DropIntent::BecomeChild
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Current phase of a drag gesture. Lives only between drag-start and
/// drag-end; cleared unconditionally on drag-end whether or not a drop
/// was committed.
pub enum DragState {
    /// No gesture in progress.
    Idle,
    /// Pointer is down on a row but not over a valid target.
    Dragging {
        /// Section id captured at drag start.
        dragged: i64,
    },
    /// Pointer is over a valid target; intent tracks its vertical half.
    OverTarget {
        /// Section id captured at drag start.
        dragged: i64,
        /// Section id under the pointer.
        target: i64,
        /// How the drop would be interpreted at this position.
        intent: DropIntent,
    },
}

/// A committed drop, ready to be applied to the section list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropCommit {
    /// Section that was dragged.
    pub dragged: i64,
    /// Section it was dropped on.
    pub target: i64,
    /// Whether the drop reorders or reparents.
    pub intent: DropIntent,
}

/// Drives [`DragState`] from pointer events.
#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
        }
    }
}

impl DragController {
    #[must_use]
    /// Current phase of the gesture.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    /// Id of the section being dragged, if a gesture is active.
    pub fn dragged(&self) -> Option<i64> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { dragged } | DragState::OverTarget { dragged, .. } => {
                Some(dragged)
            }
        }
    }

    #[must_use]
    /// Current hover target and intent, for the visual affordance. The two
    /// affordances are mutually exclusive because intent is a single value.
    pub fn over(&self) -> Option<(i64, DropIntent)> {
        match self.state {
            DragState::OverTarget { target, intent, .. } => Some((target, intent)),
            _ => None,
        }
    }

    /// Pointer went down on a row: capture its section id.
    pub fn begin(&mut self, section_id: i64) {
        self.state = DragState::Dragging {
            dragged: section_id,
        };
    }

    /// Pointer moved over a row while dragging. Recomputes intent
    /// continuously. The dragged row itself and anything inside the dragged
    /// subtree are not valid targets: no transition happens and any previous
    /// affordance is cleared.
    pub fn hover<N: TreeNode>(
        &mut self,
        nodes: &[N],
        id_of: impl Fn(&N) -> i64,
        target_id: i64,
        pointer_y: u16,
        target_area: Rect,
    ) {
        let Some(dragged) = self.dragged() else {
            return;
        };
        if target_id == dragged || !valid_target(nodes, &id_of, dragged, target_id) {
            self.state = DragState::Dragging { dragged };
            return;
        }
        self.state = DragState::OverTarget {
            dragged,
            target: target_id,
            intent: DropIntent::classify(pointer_y, target_area),
        };
    }

    /// Pointer released. Returns the commit if it happened over a valid
    /// target; either way the machine returns to `Idle`.
    pub fn drop(&mut self) -> Option<DropCommit> {
        let commit = match self.state {
            DragState::OverTarget {
                dragged,
                target,
                intent,
            } => Some(DropCommit {
                dragged,
                target,
                intent,
            }),
            _ => None,
        };
        self.state = DragState::Idle;
        commit
    }

    /// Abort without mutation.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// A target is valid when it exists and reparenting under it could not create
/// a cycle. The containment check is logical (via the cycle guard), not an
/// artifact of what happens to be rendered.
fn valid_target<N: TreeNode>(
    nodes: &[N],
    id_of: &impl Fn(&N) -> i64,
    dragged_id: i64,
    target_id: i64,
) -> bool {
    let dragged = nodes.iter().find(|n| id_of(n) == dragged_id);
    let target = nodes.iter().find(|n| id_of(n) == target_id);
    match (dragged, target) {
        (Some(dragged), Some(target)) => {
            !would_create_cycle(dragged.endpoint(), Some(target.endpoint()), nodes)
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/drag.rs"]
mod tests;
