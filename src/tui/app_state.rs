use crate::consolidation_tree::PathConsolidationTree;

/// The action the selection screen confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Add,
    Commit,
    Revert,
}

impl DialogKind {
    pub fn title(self) -> &'static str {
        match self {
            DialogKind::Add => "Add (stage) files",
            DialogKind::Commit => "Commit files",
            DialogKind::Revert => "Revert changes",
        }
    }

    pub fn needs_message(self) -> bool {
        self == DialogKind::Commit
    }
}

/// What the user confirmed: the tree holds the final selection.
#[derive(Debug)]
pub struct DialogOutcome {
    pub tree: PathConsolidationTree,
    pub message: String,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum AppMode {
    Normal,
    EditingMessage,
}
