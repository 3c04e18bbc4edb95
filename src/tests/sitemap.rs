use super::SitemapEditor;
use crate::drag::{DropCommit, DropIntent};
use crate::section::Section;

fn section(id: i64, endpoint: &str, parent: Option<&str>, order: i64) -> Section {
    Section {
        id,
        title: endpoint.to_string(),
        endpoint: endpoint.to_string(),
        parent: parent.map(ToString::to_string),
        order,
        url: None,
    }
}

// a(1), b(2) at root; c(3) under a
fn editor() -> SitemapEditor {
    SitemapEditor::new(vec![
        section(1, "a", None, 0),
        section(2, "b", None, 1),
        section(3, "c", Some("a"), 0),
    ])
}

fn row_endpoints(editor: &SitemapEditor) -> Vec<(String, usize)> {
    editor
        .rows
        .iter()
        .map(|r| (r.endpoint.clone(), r.depth))
        .collect()
}

#[test]
fn test_rows_derive_from_order_and_parent() {
    let editor = editor();
    assert_eq!(
        row_endpoints(&editor),
        vec![
            ("a".to_string(), 0),
            ("c".to_string(), 1),
            ("b".to_string(), 0),
        ]
    );
}

#[test]
fn test_legacy_parent_prefix_is_normalized_on_load() {
    let editor = SitemapEditor::new(vec![
        section(1, "a", None, 0),
        section(2, "b", Some("/sidebar/a"), 0),
    ]);
    assert_eq!(
        row_endpoints(&editor),
        vec![("a".to_string(), 0), ("b".to_string(), 1)]
    );
    assert_eq!(
        editor.section_by_id(2).unwrap().normalized_parent(),
        Some("a".to_string())
    );
}

#[test]
fn test_drop_as_child_reparents_and_renumbers() {
    let mut editor = editor();
    let applied = editor.commit_drop(DropCommit {
        dragged: 2,
        target: 1,
        intent: DropIntent::BecomeChild,
    });
    assert!(applied);
    assert!(editor.dirty);

    let updates = editor.order_updates();
    let b = updates.iter().find(|u| u.id == 2).unwrap();
    assert_eq!(b.parent, Some("a".to_string()));
    // appended after a's existing child
    assert_eq!(b.order, 1);
    let c = updates.iter().find(|u| u.id == 3).unwrap();
    assert_eq!(c.order, 0);
}

#[test]
fn test_drop_insert_before_places_among_target_siblings() {
    let mut editor = editor();
    let applied = editor.commit_drop(DropCommit {
        dragged: 2,
        target: 1,
        intent: DropIntent::InsertBefore,
    });
    assert!(applied);
    assert_eq!(
        row_endpoints(&editor),
        vec![
            ("b".to_string(), 0),
            ("a".to_string(), 0),
            ("c".to_string(), 1),
        ]
    );
    let updates = editor.order_updates();
    let b = updates.iter().find(|u| u.id == 2).unwrap();
    assert_eq!((b.order, b.parent.clone()), (0, None));
    let a = updates.iter().find(|u| u.id == 1).unwrap();
    assert_eq!(a.order, 1);
}

#[test]
fn test_commit_drop_rechecks_cycle_guard() {
    let mut editor = editor();
    let applied = editor.commit_drop(DropCommit {
        dragged: 1,
        target: 3,
        intent: DropIntent::BecomeChild,
    });
    assert!(!applied);
    assert!(!editor.dirty);
    assert_eq!(editor.section_by_id(1).unwrap().normalized_parent(), None);
}

#[test]
fn test_hover_over_descendant_never_arms_a_drop() {
    let mut editor = editor();
    editor.drag.begin(1);
    editor.hover_drag(3, 5, ratatui::layout::Rect::new(0, 4, 40, 2));
    assert_eq!(editor.drag.over(), None);
    assert_eq!(editor.drag.drop(), None);
}

#[test]
fn test_move_to_parent_applies_guard() {
    let mut editor = editor();
    assert!(!editor.move_to_parent(1, Some("c".to_string())));
    assert!(editor.move_to_parent(3, None));
    assert_eq!(editor.section_by_id(3).unwrap().normalized_parent(), None);
}

#[test]
fn test_parent_options_exclude_self_and_descendants() {
    let editor = editor();
    let options = editor.parent_options(1);
    assert_eq!(options[0], (None, "(root)".to_string()));
    let keys: Vec<Option<String>> = options.into_iter().map(|(k, _)| k).collect();
    assert!(keys.contains(&Some("b".to_string())));
    assert!(!keys.contains(&Some("a".to_string())));
    assert!(!keys.contains(&Some("c".to_string())));

    // a leaf may move anywhere but under itself
    let keys: Vec<Option<String>> = editor
        .parent_options(3)
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert!(keys.contains(&None));
    assert!(keys.contains(&Some("a".to_string())));
    assert!(keys.contains(&Some("b".to_string())));
    assert!(!keys.contains(&Some("c".to_string())));
}

#[test]
fn test_sibling_move_swaps_within_group() {
    let mut editor = editor();
    assert!(editor.move_among_siblings(2, -1));
    assert_eq!(editor.rows[0].endpoint, "b");
    let updates = editor.order_updates();
    let b = updates.iter().find(|u| u.id == 2).unwrap();
    assert_eq!(b.order, 0);
}

#[test]
fn test_sibling_move_at_boundary_is_a_noop() {
    let mut editor = editor();
    // a is already the first root; c has no siblings
    assert!(!editor.move_among_siblings(1, -1));
    assert!(!editor.move_among_siblings(3, 1));
    assert!(!editor.dirty);
    assert_eq!(
        row_endpoints(&editor),
        vec![
            ("a".to_string(), 0),
            ("c".to_string(), 1),
            ("b".to_string(), 0),
        ]
    );
}

#[test]
fn test_order_updates_cover_every_section() {
    let mut editor = editor();
    let updates = editor.order_updates();
    assert_eq!(updates.len(), 3);
}
