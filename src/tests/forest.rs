use super::{
    descendant_endpoints, flatten, menu_order, sitemap_order, would_create_cycle, HasOrderTitle,
    TreeNode,
};

struct Node {
    endpoint: String,
    parent: Option<String>,
    order: i64,
    title: String,
}

fn node(endpoint: &str, parent: Option<&str>, order: i64) -> Node {
    Node {
        endpoint: endpoint.to_string(),
        parent: parent.map(ToString::to_string),
        order,
        title: endpoint.to_string(),
    }
}

fn titled(endpoint: &str, title: &str, order: i64) -> Node {
    Node {
        endpoint: endpoint.to_string(),
        parent: None,
        order,
        title: title.to_string(),
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

impl HasOrderTitle for Node {
    fn order(&self) -> i64 {
        self.order
    }

    fn title_lower(&self) -> String {
        self.title.to_lowercase()
    }
}

fn endpoints(nodes: &[Node], rows: &[super::TreeRow]) -> Vec<(String, usize)> {
    rows.iter()
        .map(|r| (nodes[r.index].endpoint.clone(), r.depth))
        .collect()
}

#[test]
fn test_children_render_under_their_parent() {
    let nodes = vec![
        node("a", None, 0),
        node("b", None, 1),
        node("c", Some("a"), 0),
    ];
    let rows = flatten(&nodes, Node::parent_key, sitemap_order);
    assert_eq!(
        endpoints(&nodes, &rows),
        vec![
            ("a".to_string(), 0),
            ("c".to_string(), 1),
            ("b".to_string(), 0),
        ]
    );
}

#[test]
fn test_siblings_sort_by_order_then_title() {
    let nodes = vec![
        titled("x", "b", 1),
        titled("y", "z", 0),
        titled("z", "a", 1),
    ];
    let rows = flatten(&nodes, Node::parent_key, sitemap_order);
    let order: Vec<String> = rows
        .iter()
        .map(|r| nodes[r.index].endpoint.clone())
        .collect();
    assert_eq!(order, vec!["y", "z", "x"]);
}

#[test]
fn test_menu_order_sorts_unset_order_last() {
    let nodes = vec![
        titled("a", "a", 0),
        titled("b", "b", 2),
        titled("c", "c", 1),
    ];
    let rows = flatten(&nodes, Node::parent_key, menu_order);
    let order: Vec<String> = rows
        .iter()
        .map(|r| nodes[r.index].endpoint.clone())
        .collect();
    assert_eq!(order, vec!["c", "b", "a"]);
}

#[test]
fn test_dangling_parent_renders_at_root() {
    let nodes = vec![node("a", None, 0), node("orphan", Some("ghost"), 0)];
    let rows = flatten(&nodes, Node::parent_key, sitemap_order);
    assert_eq!(
        endpoints(&nodes, &rows),
        vec![("a".to_string(), 0), ("orphan".to_string(), 0)]
    );
}

#[test]
fn test_self_parent_terminates_and_still_renders() {
    let nodes = vec![node("a", None, 0), node("loop", Some("loop"), 0)];
    let rows = flatten(&nodes, Node::parent_key, sitemap_order);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        endpoints(&nodes, &rows),
        vec![("a".to_string(), 0), ("loop".to_string(), 0)]
    );
}

#[test]
fn test_mutual_cycle_terminates_and_still_renders() {
    let nodes = vec![node("a", Some("b"), 0), node("b", Some("a"), 0)];
    let rows = flatten(&nodes, Node::parent_key, sitemap_order);
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_cycle_guard_rejects_self_and_descendants() {
    let nodes = vec![
        node("a", None, 0),
        node("b", Some("a"), 0),
        node("c", Some("b"), 0),
    ];
    assert!(would_create_cycle("a", Some("a"), &nodes));
    assert!(would_create_cycle("a", Some("b"), &nodes));
    assert!(would_create_cycle("a", Some("c"), &nodes));
    assert!(!would_create_cycle("c", Some("a"), &nodes));
    assert!(!would_create_cycle("a", None, &nodes));
}

#[test]
fn test_descendant_set_is_transitive() {
    let nodes = vec![
        node("a", None, 0),
        node("b", Some("a"), 0),
        node("c", Some("b"), 0),
        node("d", None, 0),
    ];
    let descendants = descendant_endpoints(&nodes, "a");
    assert!(descendants.contains("b"));
    assert!(descendants.contains("c"));
    assert!(!descendants.contains("a"));
    assert!(!descendants.contains("d"));
}
