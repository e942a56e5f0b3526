use crate::cli::{self, Command, SelectionArgs};
use anyhow::{Context, Result, bail};
use glob::Pattern;
use gitpick::change_set::StatusPrecedence;
use gitpick::consolidation_tree::PathConsolidationTree;
use gitpick::git::{ChangeScope, CommitRequest, GitRepo, StatusSource};
use gitpick::tree_builder;
use gitpick::tui::{self, DialogKind};
use std::path::Path;

const NO_CHANGES: &str = "No changes have been registered";

// Opens the work tree with the status scope the action can handle.
fn open_repo(root: &Path, scope: ChangeScope, precedence: StatusPrecedence) -> Result<GitRepo> {
    Ok(GitRepo::open(root)?
        .with_scope(scope)
        .with_precedence(precedence))
}

fn print_tree(tree: &PathConsolidationTree) {
    for label in tree_builder::build_tree_labels(tree) {
        println!("{}", label);
    }
}

// Headless selection: everything, or only the files matching the given glob patterns.
// A PATH that names a directory also selects everything below it.
fn apply_path_filter(tree: &mut PathConsolidationTree, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    tree.deselect_all();
    let all_files: Vec<String> = tree
        .selection_index()
        .iter()
        .map(|(entry, _)| entry.display())
        .collect();
    for raw in paths {
        let wanted = raw.trim_matches('/');
        let pattern = match Pattern::new(wanted) {
            Ok(p) => Some(p),
            Err(e) => {
                eprintln!("⚠️ Warning: Invalid PATH pattern '{}': {}", raw, e);
                None
            }
        };
        let dir_prefix = format!("{}/", wanted);
        let matched: Vec<&String> = all_files
            .iter()
            .filter(|file| {
                wanted.is_empty()
                    || file.as_str() == wanted
                    || pattern.as_ref().is_some_and(|p| p.matches(file.as_str()))
                    || file.starts_with(&dir_prefix)
            })
            .collect();
        if matched.is_empty() {
            eprintln!("⚠️ Warning: PATH '{}' matches no changed file", raw);
        }
        for file in matched {
            tree.set_selected(file, true);
        }
    }
}

// Builds the tree from the repository status and lets the user (or --all) pick files.
// Returns None when there is nothing to do or the dialog was cancelled.
fn select_files(
    repo: &GitRepo,
    kind: DialogKind,
    selection: &SelectionArgs,
    initial_message: String,
) -> Result<Option<(PathConsolidationTree, String)>> {
    if !repo
        .has_uncommitted_changes()
        .context("Failed to read the repository status")?
    {
        println!("{}", NO_CHANGES);
        return Ok(None);
    }
    let changes = repo
        .snapshot()
        .context("Failed to read the repository status")?;

    let mut tree = PathConsolidationTree::build(&changes);
    if selection.all {
        apply_path_filter(&mut tree, &selection.paths);
        return Ok(Some((tree, initial_message)));
    }

    if !selection.paths.is_empty() {
        eprintln!("⚠️ Warning: PATH arguments only apply together with --all; ignoring them");
    }
    match tui::run_selection_dialog(tree, kind, initial_message, Some(repo))? {
        Some(outcome) => Ok(Some((outcome.tree, outcome.message))),
        None => {
            println!("Selection cancelled. Exiting.");
            Ok(None)
        }
    }
}

// Shared tail of every action: refuse empty selections and handle --dry-run.
// Returns the selected files when the action should actually run.
fn confirm_selection(
    tree: &PathConsolidationTree,
    verb: &str,
    dry_run: bool,
) -> Result<Option<Vec<String>>> {
    let files = tree.selected_files();
    if files.is_empty() {
        bail!("No files selected to {}", verb);
    }
    if dry_run {
        print_tree(tree);
        println!();
        for file in &files {
            println!("{}", file);
        }
        println!(
            "(Dry run: Would {} {} files. Repository not affected.)",
            verb,
            files.len()
        );
        return Ok(None);
    }
    Ok(Some(files))
}

fn run_status(repo: &GitRepo) -> Result<()> {
    if !repo.has_uncommitted_changes()? {
        println!("{}", NO_CHANGES);
        return Ok(());
    }
    print_tree(&PathConsolidationTree::build(&repo.snapshot()?));
    Ok(())
}

fn run_add(repo: &GitRepo, selection: &SelectionArgs, exclude_new: bool) -> Result<()> {
    let Some((tree, _)) = select_files(repo, DialogKind::Add, selection, String::new())? else {
        return Ok(());
    };
    let Some(files) = confirm_selection(&tree, "stage", selection.dry_run)? else {
        return Ok(());
    };
    repo.add_files(&files, exclude_new)?;
    println!("✅ Staged {} files.", files.len());
    Ok(())
}

fn run_commit(
    repo: &GitRepo,
    selection: &SelectionArgs,
    message: Option<String>,
    amend: bool,
    author: Option<String>,
) -> Result<()> {
    if selection.all && message.as_deref().is_none_or(|m| m.trim().is_empty()) {
        bail!("--all needs a commit message (-m)");
    }
    let Some((tree, message)) = select_files(
        repo,
        DialogKind::Commit,
        selection,
        message.unwrap_or_default(),
    )?
    else {
        return Ok(());
    };
    let Some(files) = confirm_selection(&tree, "commit", selection.dry_run)? else {
        return Ok(());
    };
    let result = repo.commit(&CommitRequest {
        files,
        message,
        amend,
        author,
    })?;
    let short_id: String = result.commit_id.chars().take(7).collect();
    println!(
        "✅ Committed {} files as {} {}",
        result.affected_files.len(),
        short_id,
        result.summary
    );
    Ok(())
}

fn run_revert(repo: &GitRepo, selection: &SelectionArgs) -> Result<()> {
    let Some((tree, _)) = select_files(repo, DialogKind::Revert, selection, String::new())? else {
        return Ok(());
    };
    let Some(files) = confirm_selection(&tree, "revert", selection.dry_run)? else {
        return Ok(());
    };
    let result = repo.revert_changes(&files)?;
    println!("✅ Reverted {} files.", result.reverted_files.len());
    Ok(())
}

// Main orchestrator for one gitpick invocation.
pub fn run_gitpick(cli_args: cli::Cli) -> Result<()> {
    let precedence = StatusPrecedence::from(cli_args.precedence);
    match cli_args.command {
        Command::Init { dir } => {
            let dir = dir.unwrap_or(cli_args.repo);
            let repo = GitRepo::init(&dir)?;
            println!(
                "✅ Initialized empty Git repository in {}",
                repo.workdir().display()
            );
            Ok(())
        }
        Command::Status => run_status(&open_repo(&cli_args.repo, ChangeScope::All, precedence)?),
        Command::Add {
            selection,
            exclude_new,
        } => run_add(
            &open_repo(&cli_args.repo, ChangeScope::All, precedence)?,
            &selection,
            exclude_new,
        ),
        Command::Commit {
            selection,
            message,
            amend,
            author,
        } => run_commit(
            &open_repo(&cli_args.repo, ChangeScope::All, precedence)?,
            &selection,
            message,
            amend,
            author,
        ),
        // Only files that exist in HEAD can be restored from it.
        Command::Revert { selection } => run_revert(
            &open_repo(&cli_args.repo, ChangeScope::Tracked, precedence)?,
            &selection,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn path_filter_selects_files_and_directory_prefixes() {
        let mut tree = PathConsolidationTree::from_sets(
            ["src/a.rs", "src/b.rs", "srcx/c.rs"],
            ["docs/guide.md"],
            NONE,
        );
        apply_path_filter(&mut tree, &["src/".to_string(), "docs/guide.md".to_string()]);
        let mut selected = tree.selected_files();
        selected.sort();
        assert_eq!(selected, vec!["docs/guide.md", "src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn path_filter_accepts_glob_patterns() {
        let mut tree =
            PathConsolidationTree::from_sets(["src/a.rs", "src/b.txt"], ["docs/guide.md"], NONE);
        apply_path_filter(&mut tree, &["src/*.rs".to_string()]);
        assert_eq!(tree.selected_files(), vec!["src/a.rs"]);

        apply_path_filter(&mut tree, &["**/*.md".to_string(), "src/?.txt".to_string()]);
        let mut selected = tree.selected_files();
        selected.sort();
        assert_eq!(selected, vec!["docs/guide.md", "src/b.txt"]);
    }

    #[test]
    fn invalid_pattern_still_matches_directory_prefix() {
        let mut tree = PathConsolidationTree::from_sets(["lib[x/one.rs", "other.rs"], NONE, NONE);
        apply_path_filter(&mut tree, &["lib[x".to_string()]);
        assert_eq!(tree.selected_files(), vec!["lib[x/one.rs"]);
    }

    #[test]
    fn empty_path_filter_keeps_everything_selected() {
        let mut tree = PathConsolidationTree::from_sets(["a", "b/c"], NONE, NONE);
        apply_path_filter(&mut tree, &[]);
        assert_eq!(tree.selected_files().len(), 2);
    }

    #[test]
    fn unmatched_path_filter_selects_nothing() {
        let mut tree = PathConsolidationTree::from_sets(["a"], NONE, NONE);
        apply_path_filter(&mut tree, &["zzz".to_string()]);
        assert!(!tree.has_selected_files());
        assert!(confirm_selection(&tree, "commit", true).is_err());
    }
}
