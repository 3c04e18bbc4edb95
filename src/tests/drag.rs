use super::{DragController, DragState, DropIntent};
use crate::forest::TreeNode;
use ratatui::layout::Rect;

struct Node {
    id: i64,
    endpoint: String,
    parent: Option<String>,
}

fn node(id: i64, endpoint: &str, parent: Option<&str>) -> Node {
    Node {
        id,
        endpoint: endpoint.to_string(),
        parent: parent.map(ToString::to_string),
    }
}

impl TreeNode for Node {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parent_key(&self) -> Option<String> {
        self.parent.clone()
    }
}

// a(1) -> b(2) -> c(3), d(4) at root
fn nodes() -> Vec<Node> {
    vec![
        node(1, "a", None),
        node(2, "b", Some("a")),
        node(3, "c", Some("b")),
        node(4, "d", None),
    ]
}

fn row(y: u16) -> Rect {
    Rect {
        x: 0,
        y,
        width: 40,
        height: 2,
    }
}

#[test]
fn test_classify_above_midpoint_inserts_before() {
    assert_eq!(DropIntent::classify(10, row(10)), DropIntent::InsertBefore);
}

#[test]
fn test_classify_midpoint_is_inclusive_toward_child() {
    // height 2 at y=10: midpoint is row 11
    assert_eq!(DropIntent::classify(11, row(10)), DropIntent::BecomeChild);
}

#[test]
fn test_hover_over_valid_target_sets_intent() {
    let nodes = nodes();
    let mut drag = DragController::default();
    drag.begin(1);
    drag.hover(&nodes, |n| n.id, 4, 10, row(10));
    assert_eq!(drag.over(), Some((4, DropIntent::InsertBefore)));
    drag.hover(&nodes, |n| n.id, 4, 11, row(10));
    assert_eq!(drag.over(), Some((4, DropIntent::BecomeChild)));
}

#[test]
fn test_hover_over_self_shows_no_affordance() {
    let nodes = nodes();
    let mut drag = DragController::default();
    drag.begin(1);
    drag.hover(&nodes, |n| n.id, 1, 11, row(10));
    assert_eq!(drag.over(), None);
    assert_eq!(drag.dragged(), Some(1));
}

#[test]
fn test_hover_over_own_descendant_shows_no_affordance() {
    let nodes = nodes();
    let mut drag = DragController::default();
    drag.begin(1);
    // c is inside a's subtree
    drag.hover(&nodes, |n| n.id, 3, 11, row(10));
    assert_eq!(drag.over(), None);
    assert_eq!(drag.dragged(), Some(1));
}

#[test]
fn test_hover_clears_previous_affordance_on_invalid_target() {
    let nodes = nodes();
    let mut drag = DragController::default();
    drag.begin(1);
    drag.hover(&nodes, |n| n.id, 4, 11, row(10));
    assert!(drag.over().is_some());
    drag.hover(&nodes, |n| n.id, 3, 11, row(10));
    assert_eq!(drag.over(), None);
}

#[test]
fn test_drop_over_target_commits_and_clears() {
    let nodes = nodes();
    let mut drag = DragController::default();
    drag.begin(2);
    drag.hover(&nodes, |n| n.id, 4, 11, row(10));
    let commit = drag.drop().unwrap();
    assert_eq!(commit.dragged, 2);
    assert_eq!(commit.target, 4);
    assert_eq!(commit.intent, DropIntent::BecomeChild);
    assert_eq!(*drag.state(), DragState::Idle);
}

#[test]
fn test_drop_without_target_clears_without_commit() {
    let mut drag = DragController::default();
    drag.begin(2);
    assert_eq!(drag.drop(), None);
    assert_eq!(*drag.state(), DragState::Idle);
}

#[test]
fn test_cancel_clears_without_commit() {
    let nodes = nodes();
    let mut drag = DragController::default();
    drag.begin(2);
    drag.hover(&nodes, |n| n.id, 4, 11, row(10));
    drag.cancel();
    assert_eq!(*drag.state(), DragState::Idle);
    assert_eq!(drag.dragged(), None);
}
