use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use gitpick::change_set::StatusPrecedence;

/// gitpick – pick changed files from a consolidated tree, then add, commit or revert them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Work tree to operate on (defaults to CWD)
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Status that wins when a path is reported as more than one of added/modified/removed
    #[arg(long, global = true, value_enum, default_value_t = Precedence::RemovedFirst)]
    pub precedence: Precedence,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Git repository
    Init {
        /// Directory to create the repository in (defaults to --repo)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Print the consolidated tree of changed files
    Status,
    /// Stage the selected files
    Add {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Do not stage files Git does not track yet
        #[arg(long)]
        exclude_new: bool,
    },
    /// Stage and commit the selected files
    Commit {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Commit message (required with --all)
        #[arg(short, long, value_name = "MSG")]
        message: Option<String>,

        /// Amend the previous commit
        #[arg(long)]
        amend: bool,

        /// Override the commit author, "Name <email>"
        #[arg(long, value_name = "AUTHOR")]
        author: Option<String>,
    },
    /// Restore the selected tracked files to their state in HEAD
    Revert {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Skip the interactive tree: select every change (or only PATHs, if given) and act.
    #[arg(long)]
    pub all: bool,

    /// Print what would be affected without touching the repository.
    #[arg(long)]
    pub dry_run: bool,

    /// With --all, only select these files or directories (relative to the work tree root).
    /// Can be given multiple times.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Removed beats modified beats added
    RemovedFirst,
    /// Added beats modified beats removed
    AddedFirst,
}

impl From<Precedence> for StatusPrecedence {
    fn from(value: Precedence) -> Self {
        match value {
            Precedence::RemovedFirst => StatusPrecedence::RemovedFirst,
            Precedence::AddedFirst => StatusPrecedence::AddedFirst,
        }
    }
}
