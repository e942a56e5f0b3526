use crate::consolidation_tree::{NodeId, PathConsolidationTree, TriState};

/// One drawable row: the node and its `├─ ` / `└─ ` branch prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: usize,
    pub prefix: String,
}

/// Walk the consolidated tree in display order and compute branch prefixes in **O(n)**.
///
/// With `expanded_only`, the children of collapsed nodes are left out.
pub fn build_tree_rows(tree: &PathConsolidationTree, expanded_only: bool) -> Vec<TreeRow> {
    let mut rows = Vec::with_capacity(tree.len());
    // is_last_stack[d] is true if the ancestor at depth d is the last child of its parent,
    // which decides between "│  " and "   " for everything below it.
    let mut is_last_stack: Vec<bool> = Vec::new();
    // (node, depth, is_last_child)
    let mut pending: Vec<(NodeId, usize, bool)> = Vec::new();
    push_children(tree, tree.root(), 0, &mut pending);

    while let Some((id, depth, is_last)) = pending.pop() {
        is_last_stack.truncate(depth);

        let mut prefix = String::new();
        if depth > 0 {
            // Top-level rows hang off the hidden root and get no connector.
            for &ancestor_is_last in &is_last_stack[1..] {
                prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
            }
            prefix.push_str(if is_last { "└─ " } else { "├─ " });
        }
        rows.push(TreeRow { id, depth, prefix });

        is_last_stack.push(is_last);
        if !expanded_only || tree.is_expanded(id) {
            push_children(tree, id, depth + 1, &mut pending);
        }
    }
    rows
}

fn push_children(
    tree: &PathConsolidationTree,
    parent: NodeId,
    depth: usize,
    pending: &mut Vec<(NodeId, usize, bool)>,
) {
    let children = tree.children(parent);
    // Reversed so the first child is popped first.
    for (i, &child) in children.iter().enumerate().rev() {
        pending.push((child, depth, i + 1 == children.len()));
    }
}

pub fn checkbox(state: TriState) -> &'static str {
    match state {
        TriState::NoneSelected => "[ ]",
        TriState::Indeterminate => "[-]",
        TriState::AllSelected => "[x]",
    }
}

/// Build plain-text labels for the whole tree, e.g.
///
/// ```text
/// [x]   src/app/
/// [x] M ├─ main.rs
/// [x] A └─ new.rs
/// ```
pub fn build_tree_labels(tree: &PathConsolidationTree) -> Vec<String> {
    build_tree_rows(tree, false)
        .into_iter()
        .filter_map(|row| {
            let node = tree.node(row.id)?;
            let name = if node.is_leaf() {
                node.display()
            } else {
                format!("{}/", node.display())
            };
            Some(format!(
                "{} {} {}{}",
                checkbox(tree.state(row.id)),
                node.status().code(),
                row.prefix,
                name
            ))
        })
        .collect()
}
