//! Consolidated, tri-state selectable trees of changed Git paths, plus the git plumbing to
//! add, commit and revert whatever ends up selected.

pub mod change_set;
pub mod consolidation_tree;
pub mod git;
pub mod logging;
pub mod tree_builder;
pub mod tui;

pub use change_set::{ChangeSet, FileStatus, PathEntry, StatusPrecedence};
pub use consolidation_tree::{
    NodeId, PathConsolidationTree, SelectionChange, SelectionIndex, TreeNode, TriState,
};
pub use git::{CommitRequest, CommitResult, GitRepo, RevertResult, StatusSource};
