use super::{title_from_endpoint, FieldKind, WizardModel};
use crate::client::{MenuSectionMeta, StepContent};
use serde_json::json;

fn model() -> WizardModel {
    WizardModel::new(&["appeals".to_string()])
}

fn meta(endpoint: &str, order: i64) -> MenuSectionMeta {
    MenuSectionMeta {
        endpoint: endpoint.to_string(),
        title: None,
        parent: None,
        menu_parent: None,
        order,
        show_in_menu: true,
    }
}

#[test]
fn test_deletable_is_derived_from_static_and_protected() {
    let model = model();
    assert!(!model.step("appeals").unwrap().deletable);
    assert!(!model.step("nutrition-dishes-archive").unwrap().deletable);
    assert!(model.step("history").unwrap().deletable);
}

#[test]
fn test_seed_catalog_covers_known_site_sections() {
    let model = model();
    assert_eq!(model.steps.len(), 29);
    let kind_of = |endpoint: &str, name: &str| {
        model
            .step(endpoint)
            .unwrap()
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.kind)
    };
    // pages with a dedicated file slot keep it
    assert_eq!(kind_of("food", "menu_document"), Some(FieldKind::FileOrText));
    assert_eq!(
        kind_of("schedule", "schedule_document"),
        Some(FieldKind::FileOrText)
    );
    assert_eq!(
        kind_of("admission-grade1", "rules_document"),
        Some(FieldKind::FileOrText)
    );
    assert_eq!(
        kind_of("admission-grade10", "rules_document"),
        Some(FieldKind::FileOrText)
    );
    // plain document pages share the uniform schema
    for endpoint in ["memos", "financial-literacy", "anti-terrorism", "orkse"] {
        assert_eq!(kind_of(endpoint, "documents"), Some(FieldKind::Documents));
    }
    let archive = model.step("nutrition-dishes-archive").unwrap();
    assert!(archive.is_static);
    assert_eq!(archive.parent.as_deref(), Some("food"));
}

#[test]
fn test_menu_parent_falls_back_to_content_parent() {
    let model = model();
    let archive = model.step("nutrition-dishes-archive").unwrap();
    assert_eq!(archive.menu_parent, None);
    assert_eq!(model.menu_parent_of(archive), Some("food".to_string()));
}

#[test]
fn test_step_data_overrides_catalog_menu_parent() {
    let mut model = model();
    model
        .data
        .entry("food".to_string())
        .or_default()
        .menu_parent = Some("history".to_string());
    let food = model.step("food").unwrap();
    assert_eq!(model.menu_parent_of(food), Some("history".to_string()));
}

#[test]
fn test_merge_remote_appends_unknown_endpoints() {
    let mut model = model();
    model.merge_remote(&[meta("clubs", 3)]);
    let clubs = model.step("clubs").unwrap();
    assert_eq!(clubs.title, "Clubs");
    assert_eq!(clubs.order, 3);
    assert!(clubs.deletable);
    assert!(clubs.fields.iter().any(|f| f.name == "title"));
}

#[test]
fn test_merge_remote_keeps_catalog_schema() {
    let mut model = model();
    let before = model.step("food").unwrap().fields.len();
    model.merge_remote(&[meta("food", 1)]);
    let food = model.step("food").unwrap();
    assert_eq!(food.order, 1);
    assert!(food.fields.iter().any(|f| f.name == "menu_document"));
    // plus show_in_menu and menu_parent (images was already present)
    assert_eq!(food.fields.len(), before + 2);
}

#[test]
fn test_menu_field_injection_is_idempotent() {
    let mut model = model();
    model.inject_menu_fields();
    let once: Vec<usize> = model.steps.iter().map(|s| s.fields.len()).collect();
    model.inject_menu_fields();
    let twice: Vec<usize> = model.steps.iter().map(|s| s.fields.len()).collect();
    assert_eq!(once, twice);
    for step in &model.steps {
        assert_eq!(step.fields[0].name, "show_in_menu");
        assert_eq!(step.fields[0].kind, FieldKind::Checkbox);
        assert_eq!(step.fields[1].name, "menu_parent");
        assert_eq!(step.fields[1].kind, FieldKind::Select);
        assert!(step.fields.iter().any(|f| f.kind == FieldKind::Images));
    }
}

#[test]
fn test_merge_sorts_explicit_orders_first() {
    let mut model = model();
    model.merge_remote(&[meta("history", 2), meta("schedule", 1)]);
    let rows = model.accordion_rows();
    assert_eq!(rows[0].endpoint, "schedule");
    assert_eq!(rows[1].endpoint, "history");
    // unordered roots follow, alphabetically by title
    assert_eq!(rows[2].title, "Additional information");
}

#[test]
fn test_ensure_step_is_idempotent() {
    let mut model = model();
    let count = model.steps.len();
    let first = model.ensure_step("clubs", Some("Clubs"), None);
    let second = model.ensure_step("clubs", Some("Renamed"), None);
    assert_eq!(first, second);
    assert_eq!(model.steps.len(), count + 1);
    assert_eq!(model.step("clubs").unwrap().title, "Clubs");
    assert!(model.data.contains_key("clubs"));
}

#[test]
fn test_move_step_at_boundary_returns_no_plan() {
    let mut model = model();
    let rows = model.accordion_rows();
    let first = rows[0].endpoint.clone();
    let last = rows[rows.len() - 1].endpoint.clone();
    assert_eq!(model.move_step(&first, -1), None);
    assert_eq!(model.move_step(&last, 1), None);
}

#[test]
fn test_move_step_swaps_and_renumbers_siblings() {
    let mut model = model();
    model.ensure_step("h1", Some("H1"), Some("history".to_string()));
    model.ensure_step("h2", Some("H2"), Some("history".to_string()));

    let plan = model.move_step("h2", -1).unwrap();
    assert_eq!(plan.parent, Some("history".to_string()));
    assert_eq!(plan.ordered, vec!["h2".to_string(), "h1".to_string()]);
    // orders renumbered from 1 so the render matches the stored state
    assert_eq!(model.step("h2").unwrap().order, 1);
    assert_eq!(model.step("h1").unwrap().order, 2);
}

#[test]
fn test_collapsed_parent_hides_its_subtree() {
    let mut model = model();
    model.ensure_step("h1", Some("H1"), Some("history".to_string()));

    let rows = model.accordion_rows();
    assert!(!rows.iter().any(|r| r.endpoint == "h1"));
    let history = rows.iter().find(|r| r.endpoint == "history").unwrap();
    assert!(history.has_children);
    assert!(!history.expanded);

    model.toggle_expanded("history");
    let rows = model.accordion_rows();
    let history_pos = rows.iter().position(|r| r.endpoint == "history").unwrap();
    let h1 = rows.iter().find(|r| r.endpoint == "h1").unwrap();
    assert_eq!(h1.depth, 1);
    assert_eq!(h1.number, format!("{}.1", rows[history_pos].number));
}

#[test]
fn test_collapsed_subtree_never_resurfaces_as_leftovers() {
    let mut model = model();
    model.ensure_step("h1", Some("H1"), Some("history".to_string()));
    model.ensure_step("h1a", Some("H1a"), Some("h1".to_string()));

    // grandchildren stay hidden even though the middle node is expanded
    model.toggle_expanded("h1");
    let rows = model.accordion_rows();
    assert!(!rows.iter().any(|r| r.endpoint == "h1"));
    assert!(!rows.iter().any(|r| r.endpoint == "h1a"));

    // re-collapsing after a full expand hides the subtree again
    model.toggle_expanded("history");
    assert!(model
        .accordion_rows()
        .iter()
        .any(|r| r.endpoint == "h1a"));
    model.toggle_expanded("history");
    let rows = model.accordion_rows();
    assert!(!rows.iter().any(|r| r.endpoint == "h1" || r.endpoint == "h1a"));
    // hiding a subtree must not disturb root numbering
    assert!(rows.iter().all(|r| r.depth == 0));
    assert_eq!(rows.last().unwrap().number, rows.len().to_string());
}

#[test]
fn test_menu_cycle_steps_still_render_as_leftovers() {
    let mut model = model();
    model.ensure_step("x", Some("X"), Some("y".to_string()));
    model.ensure_step("y", Some("Y"), Some("x".to_string()));
    let rows = model.accordion_rows();
    assert!(rows.iter().any(|r| r.endpoint == "x"));
    assert!(rows.iter().any(|r| r.endpoint == "y"));
}

#[test]
fn test_select_expands_the_menu_parent() {
    let mut model = model();
    model.ensure_step("h1", Some("H1"), Some("history".to_string()));
    model.select("h1");
    assert!(model.expanded.contains("history"));
    assert!(model.accordion_rows().iter().any(|r| r.endpoint == "h1"));
}

#[test]
fn test_set_step_data_flattens_blocks_and_reads_form() {
    let mut model = model();
    let content = StepContent {
        title: "History".to_string(),
        text: "About us".to_string(),
        content_blocks: vec![json!({
            "content_blocks": [{"type": "text", "title": "inner", "content": "x"}]
        })],
        form_data: Some(json!({
            "show_in_menu": "1",
            "menu_parent": "/sidebar/for-parents"
        })),
    };
    model.set_step_data("history", &content);
    let data = model.data.get("history").unwrap();
    assert!(data.loaded);
    assert!(data.show_in_menu);
    assert_eq!(data.menu_parent, Some("for-parents".to_string()));
    assert_eq!(data.blocks.len(), 1);
    assert_eq!(data.blocks[0].title(), "inner");
}

#[test]
fn test_remove_step_clears_selection_and_data() {
    let mut model = model();
    model.ensure_step("clubs", Some("Clubs"), None);
    model.select("clubs");
    model.remove_step("clubs");
    assert!(model.step("clubs").is_none());
    assert!(model.selected.is_none());
    assert!(!model.data.contains_key("clubs"));
}

#[test]
fn test_menu_parent_options_offer_roots_except_self() {
    let model = model();
    let options = model.menu_parent_options("history");
    assert_eq!(options[0], (None, "(top level)".to_string()));
    let keys: Vec<Option<String>> = options.into_iter().map(|(k, _)| k).collect();
    assert!(keys.contains(&Some("schedule".to_string())));
    assert!(!keys.contains(&Some("history".to_string())));
    // nested steps are not offered as menu parents
    assert!(!keys.contains(&Some("nutrition-dishes-archive".to_string())));
}

#[test]
fn test_title_from_endpoint_capitalizes_each_part() {
    assert_eq!(title_from_endpoint("my-page"), "My Page");
    assert_eq!(title_from_endpoint("food"), "Food");
    assert_eq!(title_from_endpoint("a--b"), "A B");
}
