//! Consolidated tree of changed paths with tri-state selection.
//!
//! A flat [`ChangeSet`] is turned into a directory tree in which every chain of
//! single-child directories is collapsed into one row, so `a/b/c/d/file.txt` shows up as
//! `a/b/c/d` with one child `file.txt`. Leaves carry a selection flag kept in a flat
//! [`SelectionIndex`]; directories never store a flag and derive their [`TriState`] from
//! the leaves below them.
//!
//! The tree is rebuilt wholesale by [`PathConsolidationTree::refresh`]. Node ids handed
//! out before a rebuild are not tracked afterwards and may point at unrelated nodes.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::change_set::{ChangeSet, FileStatus, PathEntry, StatusPrecedence};

const ROOT: NodeId = NodeId(0);

/// Handle to a node of one particular build of a [`PathConsolidationTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Aggregate selection of the leaves below a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    AllSelected,
    NoneSelected,
    Indeterminate,
}

impl TriState {
    fn from_counts(selected: usize, total: usize) -> Self {
        if selected == 0 || total == 0 {
            TriState::NoneSelected
        } else if selected == total {
            TriState::AllSelected
        } else {
            TriState::Indeterminate
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    display_path: Vec<String>,
    status: FileStatus,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    expanded: bool,
    // Position in the SelectionIndex, leaves only.
    slot: Option<usize>,
}

impl TreeNode {
    fn new(display_path: Vec<String>, status: FileStatus, parent: Option<NodeId>) -> Self {
        TreeNode {
            display_path,
            status,
            children: Vec::new(),
            parent,
            expanded: true,
            slot: None,
        }
    }

    /// Segments shown on this row. Consolidated directories span several segments.
    pub fn display_path(&self) -> &[String] {
        &self.display_path
    }

    pub fn display(&self) -> String {
        self.display_path.join("/")
    }

    /// The leaf's status, or [`FileStatus::Unchanged`] for directories.
    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

#[derive(Debug, Clone)]
struct SelectionSlot {
    entry: PathEntry,
    node: NodeId,
    selected: bool,
}

/// Flat map from every leaf entry to its selection flag, in build discovery order.
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    slots: Vec<SelectionSlot>,
    by_path: HashMap<String, usize>,
}

impl SelectionIndex {
    fn register(&mut self, entry: PathEntry, node: NodeId) -> usize {
        let slot = self.slots.len();
        self.by_path.insert(entry.display(), slot);
        self.slots.push(SelectionSlot {
            entry,
            node,
            selected: true,
        });
        slot
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathEntry, bool)> {
        self.slots.iter().map(|s| (&s.entry, s.selected))
    }

    // Paths are normalised the way the build pass splits them, so `a//b` finds `a/b`.
    fn slot_of(&self, path: &str) -> Option<usize> {
        let key = PathEntry::parse(path, FileStatus::Unchanged)?.display();
        self.by_path.get(&key).copied()
    }

    /// Selection flag of the leaf with this full path, if there is one.
    pub fn is_selected(&self, path: &str) -> Option<bool> {
        self.slot_of(path).map(|slot| self.slots[slot].selected)
    }

    pub fn selected_count(&self) -> usize {
        self.slots.iter().filter(|s| s.selected).count()
    }

    pub fn selected_paths(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.entry.display())
            .collect()
    }
}

/// Delivered to subscribers after a mutation changed at least one flag, and after every rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// Full paths whose flag flipped. After a rebuild, every leaf of the new tree.
    pub changed: Vec<String>,
    pub has_selected_files: bool,
    pub rebuilt: bool,
}

type SelectionListener = Box<dyn FnMut(&SelectionChange)>;

pub struct PathConsolidationTree {
    nodes: Vec<TreeNode>,
    index: SelectionIndex,
    listeners: Vec<SelectionListener>,
}

impl fmt::Debug for PathConsolidationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathConsolidationTree")
            .field("nodes", &self.nodes)
            .field("index", &self.index)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for PathConsolidationTree {
    fn default() -> Self {
        Self::build(&ChangeSet::default())
    }
}

impl PathConsolidationTree {
    pub fn build(changes: &ChangeSet) -> Self {
        let (nodes, index) = TreeBuild::run(changes.entries());
        PathConsolidationTree {
            nodes,
            index,
            listeners: Vec::new(),
        }
    }

    /// Builds from raw added/modified/removed path sets with the default precedence.
    pub fn from_sets<A, M, R>(added: A, modified: M, removed: R) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        Self::build(&ChangeSet::from_sets(
            added,
            modified,
            removed,
            StatusPrecedence::default(),
        ))
    }

    /// Discards the current tree and selection and builds a new one, everything selected.
    pub fn refresh(&mut self, changes: &ChangeSet) {
        let (nodes, index) = TreeBuild::run(changes.entries());
        self.nodes = nodes;
        self.index = index;
        tracing::debug!(
            "rebuilt consolidated tree: {} rows, {} files",
            self.len(),
            self.index.len()
        );
        let change = SelectionChange {
            changed: self.index.slots.iter().map(|s| s.entry.display()).collect(),
            has_selected_files: self.has_selected_files(),
            rebuilt: true,
        };
        self.notify(&change);
    }

    pub fn refresh_from_sets<A, M, R>(&mut self, added: A, modified: M, removed: R)
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        self.refresh(&ChangeSet::from_sets(
            added,
            modified,
            removed,
            StatusPrecedence::default(),
        ));
    }

    /// The hidden root; its children are the top-level rows.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(TreeNode::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(TreeNode::parent)
    }

    /// Number of rows, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT.0].children.is_empty()
    }

    pub fn selection_index(&self) -> &SelectionIndex {
        &self.index
    }

    /// Leaf nodes in discovery order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.index.slots.iter().map(|s| s.node)
    }

    /// Repository-relative path of a node, before consolidation.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut parts: Vec<&[String]> = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                break;
            };
            parts.push(&node.display_path);
            current = node.parent;
        }
        parts.reverse();
        parts
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn is_selected(&self, path: &str) -> Option<bool> {
        self.index.is_selected(path)
    }

    pub fn state(&self, id: NodeId) -> TriState {
        let (selected, total) = self
            .leaf_slots_under(id)
            .into_iter()
            .fold((0, 0), |(sel, tot), slot| {
                (sel + usize::from(self.index.slots[slot].selected), tot + 1)
            });
        TriState::from_counts(selected, total)
    }

    pub fn has_selected_files(&self) -> bool {
        self.state(ROOT) != TriState::NoneSelected
    }

    pub fn selected_files(&self) -> Vec<String> {
        self.index.selected_paths()
    }

    /// Sets the flag of the leaf with this full path. Returns false if no leaf has it.
    pub fn set_selected(&mut self, path: &str, selected: bool) -> bool {
        let Some(slot) = self.index.slot_of(path) else {
            return false;
        };
        self.apply(vec![slot], selected);
        true
    }

    /// Sets every leaf below `id` (or `id` itself, for a leaf). Returns how many flags flipped.
    pub fn set_node_selected(&mut self, id: NodeId, selected: bool) -> usize {
        let slots = self.leaf_slots_under(id);
        self.apply(slots, selected)
    }

    /// Fully selected nodes get deselected, everything else gets selected.
    pub fn toggle(&mut self, id: NodeId) -> usize {
        let select = self.state(id) != TriState::AllSelected;
        self.set_node_selected(id, select)
    }

    pub fn select_all(&mut self) -> usize {
        self.set_node_selected(ROOT, true)
    }

    pub fn deselect_all(&mut self) -> usize {
        self.set_node_selected(ROOT, false)
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(TreeNode::is_expanded)
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.expanded = expanded;
        }
    }

    pub fn set_all_expanded(&mut self, expanded: bool) {
        for node in self.nodes.iter_mut().skip(1) {
            if node.slot.is_none() {
                node.expanded = expanded;
            }
        }
    }

    /// Registers a listener for selection changes. Listeners survive rebuilds.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&SelectionChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn leaf_slots_under(&self, id: NodeId) -> Vec<usize> {
        let mut slots = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if let Some(slot) = node.slot {
                slots.push(slot);
            }
            stack.extend(node.children.iter().rev());
        }
        slots
    }

    fn apply(&mut self, slots: Vec<usize>, selected: bool) -> usize {
        let mut changed = Vec::new();
        for slot in slots {
            let entry = &mut self.index.slots[slot];
            if entry.selected != selected {
                entry.selected = selected;
                changed.push(entry.entry.display());
            }
        }
        let count = changed.len();
        if count > 0 {
            let change = SelectionChange {
                changed,
                has_selected_files: self.has_selected_files(),
                rebuilt: false,
            };
            self.notify(&change);
        }
        count
    }

    fn notify(&mut self, change: &SelectionChange) {
        for listener in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

/// A distinct name one level below some prefix, identified by `(segment, status)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LevelName {
    segment: String,
    status: FileStatus,
    leaf: bool,
}

/// State of a single build pass.
struct TreeBuild<'a> {
    entries: &'a [PathEntry],
    nodes: Vec<TreeNode>,
    index: SelectionIndex,
}

impl<'a> TreeBuild<'a> {
    fn run(entries: &'a [PathEntry]) -> (Vec<TreeNode>, SelectionIndex) {
        let mut build = TreeBuild {
            entries,
            nodes: vec![TreeNode::new(Vec::new(), FileStatus::Unchanged, None)],
            index: SelectionIndex::default(),
        };
        // The root is never displayed, so it never absorbs a single top-level directory.
        build.build_children(ROOT, Vec::new(), false);
        (build.nodes, build.index)
    }

    /// Distinct names at depth `prefix.len()` among entries below `prefix`. A name is a leaf
    /// only when it ends an entry; otherwise it is an Unchanged directory.
    fn names_at_level(&self, prefix: &[String]) -> Vec<LevelName> {
        let level = prefix.len();
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for entry in self.entries {
            if entry.len() <= level || !entry.starts_with(prefix) {
                continue;
            }
            let leaf = entry.len() == level + 1;
            let name = LevelName {
                segment: entry.segments()[level].clone(),
                status: if leaf {
                    entry.status()
                } else {
                    FileStatus::Unchanged
                },
                leaf,
            };
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
        names
    }

    fn build_children(&mut self, parent: NodeId, mut prefix: Vec<String>, consolidate: bool) {
        loop {
            let names = self.names_at_level(&prefix);
            if consolidate && names.len() == 1 && !names[0].leaf {
                let segment = names[0].segment.clone();
                self.nodes[parent.0].display_path.push(segment.clone());
                prefix.push(segment);
                continue;
            }
            for name in names {
                let mut child_path = prefix.clone();
                child_path.push(name.segment.clone());
                let child = self.push_node(parent, vec![name.segment], name.status);
                if name.leaf {
                    let slot = self
                        .index
                        .register(PathEntry::new(child_path, name.status), child);
                    self.nodes[child.0].slot = Some(slot);
                } else {
                    self.build_children(child, child_path, true);
                }
            }
            return;
        }
    }

    fn push_node(&mut self, parent: NodeId, display_path: Vec<String>, status: FileStatus) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(TreeNode::new(display_path, status, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_builder::build_tree_rows;
    use std::cell::RefCell;
    use std::rc::Rc;

    const NONE: [&str; 0] = [];

    fn top(tree: &PathConsolidationTree) -> Vec<&TreeNode> {
        tree.children(tree.root())
            .iter()
            .map(|&id| tree.node(id).unwrap())
            .collect()
    }

    fn child_named(tree: &PathConsolidationTree, parent: NodeId, name: &str) -> NodeId {
        *tree
            .children(parent)
            .iter()
            .find(|&&id| tree.node(id).unwrap().display() == name)
            .unwrap_or_else(|| panic!("no child {name}"))
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn single_chain_collapses_into_one_row() {
        let tree = PathConsolidationTree::from_sets(["a/b/c/d/file.txt"], NONE, NONE);
        let rows = top(&tree);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display(), "a/b/c/d");
        assert_eq!(rows[0].status(), FileStatus::Unchanged);
        assert!(!rows[0].is_leaf());

        let dir = tree.children(tree.root())[0];
        let leaves = tree.children(dir);
        assert_eq!(leaves.len(), 1);
        let leaf = tree.node(leaves[0]).unwrap();
        assert_eq!(leaf.display(), "file.txt");
        assert_eq!(leaf.status(), FileStatus::Added);
        assert!(leaf.children().is_empty());
        assert_eq!(tree.full_path(leaves[0]), "a/b/c/d/file.txt");
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn branching_point_stops_consolidation() {
        let tree = PathConsolidationTree::from_sets(["a/b/file1.txt"], ["a/b/file2.txt"], NONE);
        let rows = top(&tree);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display(), "a/b");

        let dir = tree.children(tree.root())[0];
        let file1 = tree.node(child_named(&tree, dir, "file1.txt")).unwrap();
        let file2 = tree.node(child_named(&tree, dir, "file2.txt")).unwrap();
        assert_eq!(file1.status(), FileStatus::Added);
        assert_eq!(file2.status(), FileStatus::Modified);
        assert_eq!(tree.children(dir).len(), 2);
    }

    #[test]
    fn consolidation_resumes_below_a_branch() {
        let tree = PathConsolidationTree::from_sets(
            ["src/main/java/com/org/App.java", "src/test/java/com/org/AppTest.java"],
            NONE,
            NONE,
        );
        let src = tree.children(tree.root())[0];
        assert_eq!(tree.node(src).unwrap().display(), "src");
        let main = child_named(&tree, src, "main/java/com/org");
        let test = child_named(&tree, src, "test/java/com/org");
        assert_eq!(tree.children(main).len(), 1);
        assert_eq!(tree.children(test).len(), 1);
        assert_eq!(
            tree.full_path(tree.children(test)[0]),
            "src/test/java/com/org/AppTest.java"
        );
    }

    #[test]
    fn single_file_under_directory_is_not_merged() {
        let tree = PathConsolidationTree::from_sets(NONE, ["docs/guide.md"], NONE);
        let docs = tree.children(tree.root())[0];
        assert_eq!(tree.node(docs).unwrap().display(), "docs");
        let leaf = tree.children(docs)[0];
        assert_eq!(tree.node(leaf).unwrap().display(), "guide.md");
        assert!(tree.node(leaf).unwrap().is_leaf());
    }

    #[test]
    fn top_level_files_are_leaves() {
        let tree = PathConsolidationTree::from_sets(["README.md"], NONE, ["LICENSE"]);
        let rows = top(&tree);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|n| n.is_leaf()));
        assert_eq!(rows[1].status(), FileStatus::Removed);
    }

    #[test]
    fn file_and_directory_with_same_name_are_siblings() {
        let tree = PathConsolidationTree::from_sets(["a", "a/b"], NONE, NONE);
        let rows = top(&tree);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().filter(|n| n.is_leaf()).count(), 1);
        assert_eq!(
            sorted(tree.selected_files()),
            vec!["a".to_string(), "a/b".to_string()]
        );
    }

    #[test]
    fn everything_selected_and_expanded_after_build() {
        let tree = PathConsolidationTree::from_sets(
            ["x/1", "x/2"],
            ["y/z/3"],
            ["w"],
        );
        assert_eq!(
            sorted(tree.selected_files()),
            vec!["w", "x/1", "x/2", "y/z/3"]
        );
        assert!(
            build_tree_rows(&tree, false)
                .iter()
                .all(|row| tree.is_expanded(row.id))
        );
        assert_eq!(tree.state(tree.root()), TriState::AllSelected);
        assert_eq!(tree.selection_index().len(), 4);
        assert_eq!(tree.selection_index().selected_count(), 4);
    }

    #[test]
    fn tri_state_follows_leaf_toggles() {
        let mut tree =
            PathConsolidationTree::from_sets(["a/b/file1.txt"], ["a/b/file2.txt"], NONE);
        let dir = tree.children(tree.root())[0];

        assert!(tree.set_selected("a/b/file1.txt", false));
        assert_eq!(tree.state(dir), TriState::Indeterminate);
        assert!(tree.has_selected_files());
        assert_eq!(tree.selected_files(), vec!["a/b/file2.txt"]);

        assert!(tree.set_selected("a/b/file2.txt", false));
        assert_eq!(tree.state(dir), TriState::NoneSelected);
        assert!(!tree.has_selected_files());
        assert!(tree.selected_files().is_empty());

        tree.set_selected("a/b/file1.txt", true);
        tree.set_selected("a/b/file2.txt", true);
        assert_eq!(tree.state(dir), TriState::AllSelected);
    }

    #[test]
    fn directory_toggle_reaches_every_descendant() {
        let mut tree = PathConsolidationTree::from_sets(
            ["lib/a/one.rs", "lib/a/two.rs", "lib/b/three.rs"],
            ["bin/main.rs"],
            NONE,
        );
        let lib = child_named(&tree, tree.root(), "lib");
        let a = child_named(&tree, lib, "a");

        tree.set_selected("lib/a/one.rs", false);
        assert_eq!(tree.state(a), TriState::Indeterminate);
        assert_eq!(tree.state(lib), TriState::Indeterminate);

        // Indeterminate toggles to fully selected.
        assert_eq!(tree.toggle(a), 1);
        assert_eq!(tree.state(lib), TriState::AllSelected);

        assert_eq!(tree.toggle(lib), 3);
        assert_eq!(tree.state(a), TriState::NoneSelected);
        assert_eq!(tree.state(tree.root()), TriState::Indeterminate);
        assert_eq!(tree.selected_files(), vec!["bin/main.rs"]);

        assert_eq!(tree.set_node_selected(lib, true), 3);
        assert_eq!(tree.set_node_selected(lib, true), 0);
    }

    #[test]
    fn set_selected_unknown_or_directory_path() {
        let mut tree = PathConsolidationTree::from_sets(["a/b/c.txt"], NONE, NONE);
        assert!(!tree.set_selected("a/b", false));
        assert!(!tree.set_selected("nope", false));
        assert!(!tree.set_selected("", false));
        assert!(tree.set_selected("a//b/c.txt", false));
        assert_eq!(tree.is_selected("a/b/c.txt"), Some(false));
        assert_eq!(tree.is_selected("a//b/c.txt"), Some(false));
        assert_eq!(tree.is_selected("/a/b/c.txt/"), Some(false));
        assert_eq!(tree.selection_index().is_selected("a//b/c.txt"), Some(false));
        assert_eq!(tree.is_selected("a/b"), None);
        assert_eq!(tree.is_selected(""), None);
    }

    #[test]
    fn empty_input_yields_empty_tree() {
        let tree = PathConsolidationTree::from_sets(NONE, NONE, NONE);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(!tree.has_selected_files());
        assert!(tree.selected_files().is_empty());
        assert_eq!(tree.state(tree.root()), TriState::NoneSelected);
        assert!(build_tree_rows(&tree, true).is_empty());
    }

    #[test]
    fn malformed_paths_contribute_no_leaf() {
        let tree = PathConsolidationTree::from_sets(["", "/", "//"], ["ok.txt"], NONE);
        assert_eq!(tree.selected_files(), vec!["ok.txt"]);
        assert_eq!(tree.selection_index().len(), 1);
    }

    #[test]
    fn refresh_rebuilds_with_everything_selected() {
        let mut tree = PathConsolidationTree::from_sets(["a/x", "a/y"], NONE, NONE);
        tree.deselect_all();
        tree.set_expanded(tree.children(tree.root())[0], false);

        tree.refresh_from_sets(["a/x"], ["b/z"], NONE);
        assert_eq!(sorted(tree.selected_files()), vec!["a/x", "b/z"]);
        assert!(
            build_tree_rows(&tree, false)
                .iter()
                .all(|row| tree.is_expanded(row.id))
        );
        assert_eq!(top(&tree).len(), 2);
    }

    #[test]
    fn rows_respect_expansion() {
        let mut tree = PathConsolidationTree::from_sets(["d/one", "d/two", "top"], NONE, NONE);
        let all: Vec<String> = build_tree_rows(&tree, true)
            .iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), tree.node(row.id).unwrap().display()))
            .collect();
        assert_eq!(all, vec!["d", "  one", "  two", "top"]);

        let d = tree.children(tree.root())[0];
        tree.set_expanded(d, false);
        assert_eq!(build_tree_rows(&tree, true).len(), 2);
        assert_eq!(build_tree_rows(&tree, false).len(), 4);

        tree.set_all_expanded(true);
        assert_eq!(build_tree_rows(&tree, true).len(), 4);
    }

    #[test]
    fn subscribers_hear_changes_and_rebuilds() {
        let mut tree = PathConsolidationTree::from_sets(["a/1", "a/2"], NONE, NONE);
        let seen: Rc<RefCell<Vec<SelectionChange>>> = Rc::default();
        let sink = Rc::clone(&seen);
        tree.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        tree.set_selected("a/1", true); // already selected, no event
        tree.set_selected("a/1", false);
        tree.deselect_all();
        tree.refresh_from_sets(["b"], NONE, NONE);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].changed, vec!["a/1"]);
        assert!(seen[0].has_selected_files);
        assert_eq!(seen[1].changed, vec!["a/2"]);
        assert!(!seen[1].has_selected_files);
        assert!(seen[2].rebuilt);
        assert_eq!(seen[2].changed, vec!["b"]);
        assert!(seen[2].has_selected_files);
    }
}
