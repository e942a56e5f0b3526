use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as OsCommand;

use anyhow::{Context, Result, bail};

use crate::change_set::{ChangeSet, ChangeSetBuilder, FileStatus, PathEntry, StatusPrecedence};

/// Supplies a point-in-time snapshot of changed paths.
pub trait StatusSource {
    fn snapshot(&self) -> Result<ChangeSet>;

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(!self.snapshot()?.is_empty())
    }
}

/// Which changes a snapshot reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeScope {
    /// New (staged or untracked), modified and removed files.
    #[default]
    All,
    /// Only files that exist in HEAD: modified and removed. What a revert can restore.
    Tracked,
}

/// One entry of `git status --porcelain=v1 -z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub index: char,
    pub worktree: char,
    pub path: String,
    /// Source path of a rename or copy.
    pub orig_path: Option<String>,
}

impl StatusLine {
    fn is_unmerged(&self) -> bool {
        self.index == 'U'
            || self.worktree == 'U'
            || (self.index == 'A' && self.worktree == 'A')
            || (self.index == 'D' && self.worktree == 'D')
    }

    fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    fn is_ignored(&self) -> bool {
        self.index == '!' && self.worktree == '!'
    }

    /// Staged as new, then deleted again: neither HEAD nor the work tree has the file.
    fn is_vanished_addition(&self) -> bool {
        self.index == 'A' && self.worktree == 'D'
    }

    /// Collapses the two status columns into one status for `path`.
    pub fn status(&self) -> FileStatus {
        let either = |c: char| self.index == c || self.worktree == c;
        if self.is_vanished_addition() {
            FileStatus::Unchanged
        } else if either('D') {
            FileStatus::Removed
        } else if self.is_untracked() || matches!(self.index, 'A' | 'R' | 'C') {
            FileStatus::Added
        } else if either('M') || either('T') {
            FileStatus::Modified
        } else {
            FileStatus::Unchanged
        }
    }
}

pub fn parse_porcelain(raw: &str) -> Vec<StatusLine> {
    let mut lines = Vec::new();
    let mut tokens = raw.split('\0');
    while let Some(token) = tokens.next() {
        if token.is_empty() {
            continue;
        }
        let mut chars = token.chars();
        let (Some(index), Some(worktree), Some(' ')) = (chars.next(), chars.next(), chars.next())
        else {
            tracing::warn!("unexpected porcelain entry: {:?}", token);
            continue;
        };
        let path = chars.as_str().to_string();
        // With -z the rename/copy source follows as its own token.
        let orig_path = if matches!(index, 'R' | 'C') {
            tokens.next().map(str::to_string)
        } else {
            None
        };
        lines.push(StatusLine {
            index,
            worktree,
            path,
            orig_path,
        });
    }
    lines
}

/// Maps porcelain entries onto the added/modified/removed sets.
pub fn change_set_from_status(
    lines: &[StatusLine],
    scope: ChangeScope,
    precedence: StatusPrecedence,
) -> ChangeSet {
    let mut builder = ChangeSetBuilder::new(precedence);
    for line in lines {
        if line.is_ignored() {
            continue;
        }
        if line.is_unmerged() {
            tracing::warn!(
                "skipping unmerged path {} ({}{})",
                line.path,
                line.index,
                line.worktree
            );
            continue;
        }
        // The source of a rename is gone from the work tree even when the target is new.
        if line.index == 'R' {
            if let Some(orig) = &line.orig_path {
                builder.insert(orig, FileStatus::Removed);
            }
        }
        let status = line.status();
        if status == FileStatus::Unchanged {
            if line.is_vanished_addition() {
                tracing::debug!("skipping {}: added to the index, then deleted", line.path);
            }
            continue;
        }
        if scope == ChangeScope::Tracked && status == FileStatus::Added {
            continue;
        }
        builder.insert(&line.path, status);
    }
    builder.finish()
}

/// Request to stage and commit a set of files.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    pub files: Vec<String>,
    pub message: String,
    pub amend: bool,
    /// "Name <email>"; git's configured identity when absent.
    pub author: Option<String>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub affected_files: Vec<String>,
    pub commit_id: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertResult {
    pub reverted_files: Vec<String>,
}

/// A work tree driven through the `git` executable.
#[derive(Debug, Clone)]
pub struct GitRepo {
    workdir: PathBuf,
    scope: ChangeScope,
    precedence: StatusPrecedence,
}

impl GitRepo {
    /// Creates a repository in `dir`, creating the directory if needed.
    pub fn init(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        run_git(dir, ["init"])?;
        tracing::info!("initialized repository in {}", dir.display());
        Self::open(dir)
    }

    /// Opens the repository containing `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let top = run_git(dir, ["rev-parse", "--show-toplevel"])
            .with_context(|| format!("{} is not inside a Git work tree", dir.display()))?;
        Ok(GitRepo {
            workdir: PathBuf::from(top.trim()),
            scope: ChangeScope::default(),
            precedence: StatusPrecedence::default(),
        })
    }

    pub fn with_scope(mut self, scope: ChangeScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_precedence(mut self, precedence: StatusPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn status_lines(&self) -> Result<Vec<StatusLine>> {
        let raw = run_git(
            &self.workdir,
            ["status", "--porcelain=v1", "-z", "--untracked-files=all"],
        )?;
        Ok(parse_porcelain(&raw))
    }

    /// Stages `paths`. New files are skipped when `exclude_new_files` is set.
    ///
    /// Paths missing from the work tree are staged as deletions; `git add`
    /// rejects them once the deletion is already in the index.
    pub fn add_files(&self, paths: &[String], exclude_new_files: bool) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let (present, missing): (Vec<&String>, Vec<&String>) = paths
            .iter()
            .partition(|p| fs::symlink_metadata(self.workdir.join(p.as_str())).is_ok());

        if !present.is_empty() {
            let mode = if exclude_new_files { "-u" } else { "-A" };
            let mut args: Vec<&str> = vec!["add", mode, "--"];
            args.extend(present.iter().map(|p| p.as_str()));
            run_git(&self.workdir, args)?;
        }
        if !missing.is_empty() {
            let mut args: Vec<&str> = vec!["rm", "--cached", "--quiet", "--ignore-unmatch", "--"];
            args.extend(missing.iter().map(|p| p.as_str()));
            run_git(&self.workdir, args)?;
        }
        tracing::info!(
            "staged {} files ({} removals)",
            paths.len(),
            missing.len()
        );
        Ok(())
    }

    /// Stages the requested files and commits exactly those. Empty commits are refused.
    pub fn commit(&self, request: &CommitRequest) -> Result<CommitResult> {
        if request.files.is_empty() {
            bail!("No files selected to commit");
        }
        if request.message.trim().is_empty() {
            bail!("Commit message is empty");
        }
        // Checked up front so a bad path cannot leave the index half staged.
        self.ensure_changed(&request.files, ChangeScope::All)?;
        self.add_files(&request.files, false)?;

        let mut args: Vec<&str> = vec!["commit", "--quiet", "-m", request.message.as_str()];
        if request.amend {
            args.push("--amend");
        }
        let author_arg;
        if let Some(author) = &request.author {
            author_arg = format!("--author={}", author);
            args.push(&author_arg);
        }
        args.push("--");
        args.extend(request.files.iter().map(String::as_str));
        run_git(&self.workdir, args)?;

        let commit_id = run_git(&self.workdir, ["rev-parse", "HEAD"])?.trim().to_string();
        let summary = run_git(&self.workdir, ["log", "-1", "--pretty=%s"])?
            .trim()
            .to_string();
        tracing::info!("committed {} files as {}", request.files.len(), commit_id);
        Ok(CommitResult {
            affected_files: request.files.clone(),
            commit_id,
            summary,
        })
    }

    /// Restores `paths` in index and work tree to their state in HEAD. No commit is made.
    pub fn revert_changes(&self, paths: &[String]) -> Result<RevertResult> {
        if paths.is_empty() {
            bail!("No files selected to revert");
        }
        self.ensure_changed(paths, ChangeScope::Tracked)?;
        let mut args: Vec<&str> = vec!["checkout", "HEAD", "--"];
        args.extend(paths.iter().map(String::as_str));
        run_git(&self.workdir, args)?;
        tracing::info!("reverted {} files", paths.len());
        Ok(RevertResult {
            reverted_files: paths.to_vec(),
        })
    }

    /// Fails unless every path is a change `scope` currently reports.
    fn ensure_changed(&self, paths: &[String], scope: ChangeScope) -> Result<()> {
        let changes = change_set_from_status(&self.status_lines()?, scope, self.precedence);
        let known: HashSet<String> = changes.entries().iter().map(PathEntry::display).collect();
        let unknown: Vec<&str> = paths
            .iter()
            .filter(|p| {
                PathEntry::parse(p, FileStatus::Unchanged)
                    .is_none_or(|entry| !known.contains(&entry.display()))
            })
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            bail!("Not a pending change: {}", unknown.join(", "));
        }
        Ok(())
    }
}

impl StatusSource for GitRepo {
    fn snapshot(&self) -> Result<ChangeSet> {
        let lines = self.status_lines()?;
        let changes = change_set_from_status(&lines, self.scope, self.precedence);
        tracing::debug!(
            "status of {}: {} entries, {} changes",
            self.workdir.display(),
            lines.len(),
            changes.len()
        );
        Ok(changes)
    }
}

fn run_git<I, S>(dir: &Path, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let shown = args
        .iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("git {} (in {})", shown, dir.display());

    let output = OsCommand::new("git")
        .args(&args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to run git {}", shown))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            shown,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
