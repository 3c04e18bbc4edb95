//! Forest construction and cycle prevention over flat section lists.
//!
//! The backend stores sections flat; every view rebuilds the parent→children
//! index from scratch whenever the list changes. Parenthood is keyed by
//! endpoint string. A resolved parent that matches no endpoint in the list is
//! tolerated by treating the node as a root rather than erroring.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Hard cap on tree depth during the flatten walk. Cyclic parent chains are
/// rejected before they are committed, but input that slipped past the guard
/// (or arrived corrupt from the backend) must not loop the walk.
pub const MAX_DEPTH: usize = 32;

/// Anything that participates in an endpoint-keyed forest.
///
/// `parent_key` is the *content* parent (normalized), the relation all cycle
/// checks anchor to. Views that group by a different relation (the wizard's
/// menu placement) pass their own resolver to [`build_forest`]/[`flatten`].
pub trait TreeNode {
    /// Stable identifier the forest is keyed by.
    fn endpoint(&self) -> &str;
    /// Normalized content-parent endpoint, if any.
    fn parent_key(&self) -> Option<String>;
}

/// One entry of a flattened forest: index into the node slice plus depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeRow {
    /// Position of the node in the input slice.
    pub index: usize,
    /// Nesting depth, zero for roots.
    pub depth: usize,
}

/// Group nodes by resolved parent key. Does not sort; sibling ordering is the
/// caller's concern so the two views can apply their own rules consistently.
#[must_use]
pub fn build_forest<N, F>(nodes: &[N], parent_of: F) -> HashMap<Option<String>, Vec<usize>>
where
    N: TreeNode,
    F: Fn(&N) -> Option<String>,
{
    let mut forest: HashMap<Option<String>, Vec<usize>> = HashMap::new();
    for (i, node) in nodes.iter().enumerate() {
        forest.entry(parent_of(node)).or_default().push(i);
    }
    forest
}

/// Sibling comparator for the sitemap: `order` ascending, then lower-cased
/// title, then endpoint.
#[must_use]
pub fn sitemap_order<N: TreeNode + HasOrderTitle>(a: &N, b: &N) -> Ordering {
    (a.order(), a.title_lower(), a.endpoint()).cmp(&(b.order(), b.title_lower(), b.endpoint()))
}

/// Sibling comparator for the wizard's menu: as [`sitemap_order`], except an
/// unset order (0) sorts last instead of first.
#[must_use]
pub fn menu_order<N: TreeNode + HasOrderTitle>(a: &N, b: &N) -> Ordering {
    let key = |n: &N| {
        let o = if n.order() == 0 { i64::MAX } else { n.order() };
        (o, n.title_lower(), n.endpoint().to_string())
    };
    key(a).cmp(&key(b))
}

/// Sort inputs for the sibling comparators.
pub trait HasOrderTitle {
    /// Explicit ordering weight, zero meaning unset.
    fn order(&self) -> i64;
    /// Case-folded title used as the tiebreaker.
    fn title_lower(&self) -> String;
}

/// Depth-first flatten of the forest into render order.
///
/// Roots are nodes whose resolved parent is `None` or dangling. Each sibling
/// group is sorted with `cmp`. The walk tracks visited indices and caps depth
/// at [`MAX_DEPTH`]; nodes unreachable from any root (a self-referential
/// parent, a cycle) are appended afterwards at depth zero so nothing ever
/// disappears from the screen.
#[must_use]
pub fn flatten<N, F, C>(nodes: &[N], parent_of: F, cmp: C) -> Vec<TreeRow>
where
    N: TreeNode,
    F: Fn(&N) -> Option<String>,
    C: Fn(&N, &N) -> Ordering,
{
    let endpoints: HashSet<&str> = nodes.iter().map(TreeNode::endpoint).collect();
    let resolve = |node: &N| -> Option<String> {
        parent_of(node).filter(|p| endpoints.contains(p.as_str()))
    };

    let mut forest = build_forest(nodes, resolve);
    for group in forest.values_mut() {
        group.sort_by(|&a, &b| cmp(&nodes[a], &nodes[b]));
    }

    let mut rows = Vec::with_capacity(nodes.len());
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    if let Some(roots) = forest.get(&None) {
        for &root in roots.iter().rev() {
            stack.push((root, 0));
        }
    }
    while let Some((index, depth)) = stack.pop() {
        if visited[index] || depth >= MAX_DEPTH {
            continue;
        }
        visited[index] = true;
        rows.push(TreeRow { index, depth });
        if let Some(children) = forest.get(&Some(nodes[index].endpoint().to_string())) {
            for &child in children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }

    for index in 0..nodes.len() {
        if !visited[index] {
            rows.push(TreeRow { index, depth: 0 });
        }
    }
    rows
}

/// Full transitive descendant set of `endpoint`, by repeated child lookup on
/// the content parent relation.
#[must_use]
pub fn descendant_endpoints<N: TreeNode>(nodes: &[N], endpoint: &str) -> HashSet<String> {
    let mut result: HashSet<String> = HashSet::new();
    let mut queue: Vec<String> = vec![endpoint.to_string()];
    while let Some(current) = queue.pop() {
        for node in nodes {
            if node.parent_key().as_deref() == Some(current.as_str())
                && result.insert(node.endpoint().to_string())
            {
                queue.push(node.endpoint().to_string());
            }
        }
    }
    result
}

/// True iff reparenting `moving` under `candidate_parent` would create a
/// cycle: the candidate is the node itself or one of its descendants. Must be
/// checked before committing any reparent, in both views.
#[must_use]
pub fn would_create_cycle<N: TreeNode>(
    moving: &str,
    candidate_parent: Option<&str>,
    nodes: &[N],
) -> bool {
    let Some(candidate) = candidate_parent else {
        return false;
    };
    if candidate == moving {
        return true;
    }
    descendant_endpoints(nodes, moving).contains(candidate)
}

#[cfg(test)]
#[path = "tests/forest.rs"]
mod tests;
