use std::collections::HashMap;
use std::fmt;

/// Status of a path in the work tree relative to the last commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// Directories, and anything that has not been changed.
    Unchanged,
    /// New files (staged additions or untracked files).
    Added,
    /// Tracked files whose content or type changed.
    Modified,
    /// Tracked files that have been deleted.
    Removed,
}

impl FileStatus {
    pub fn code(self) -> char {
        match self {
            FileStatus::Unchanged => ' ',
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Removed => 'D',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileStatus::Unchanged => "unchanged",
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which status wins when the same path shows up in more than one input set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPrecedence {
    /// Removed beats Modified beats Added.
    #[default]
    RemovedFirst,
    /// Added beats Modified beats Removed.
    AddedFirst,
}

impl StatusPrecedence {
    fn rank(self, status: FileStatus) -> u8 {
        let base = match status {
            FileStatus::Unchanged => 0,
            FileStatus::Added => 1,
            FileStatus::Modified => 2,
            FileStatus::Removed => 3,
        };
        match self {
            StatusPrecedence::RemovedFirst => base,
            StatusPrecedence::AddedFirst if base == 0 => 0,
            StatusPrecedence::AddedFirst => 4 - base,
        }
    }

    /// Returns true if `candidate` should replace `current`.
    pub fn overrides(self, candidate: FileStatus, current: FileStatus) -> bool {
        self.rank(candidate) > self.rank(current)
    }
}

/// One changed path, split into its repository-relative segments.
///
/// Identity is the `(path, status)` pair: a directory prefix `a` (Unchanged) and a
/// tracked file `a` (Added) are different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathEntry {
    segments: Vec<String>,
    status: FileStatus,
}

impl PathEntry {
    pub fn new(segments: Vec<String>, status: FileStatus) -> Self {
        PathEntry { segments, status }
    }

    /// Splits a `/`-delimited path. Empty segments are dropped, so `a//b/` is `a/b`.
    /// Returns `None` when nothing is left.
    pub fn parse(raw: &str, status: FileStatus) -> Option<Self> {
        let segments: Vec<String> = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(PathEntry { segments, status })
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn starts_with(&self, prefix: &[String]) -> bool {
        self.segments.starts_with(prefix)
    }

    pub fn display(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display(), self.status)
    }
}

/// A point-in-time snapshot of changed paths: exactly one entry per distinct path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<PathEntry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the three status sets, Added first, then Modified, then Removed.
    pub fn from_sets<A, M, R>(
        added: A,
        modified: M,
        removed: R,
        precedence: StatusPrecedence,
    ) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut builder = ChangeSetBuilder::new(precedence);
        for path in added {
            builder.insert(path.as_ref(), FileStatus::Added);
        }
        for path in modified {
            builder.insert(path.as_ref(), FileStatus::Modified);
        }
        for path in removed {
            builder.insert(path.as_ref(), FileStatus::Removed);
        }
        builder.finish()
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths_with_status(&self, status: FileStatus) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.status == status)
            .map(PathEntry::display)
            .collect()
    }
}

/// Incremental form of [`ChangeSet::from_sets`], used by status parsers.
#[derive(Debug)]
pub struct ChangeSetBuilder {
    precedence: StatusPrecedence,
    entries: Vec<PathEntry>,
    index_by_path: HashMap<Vec<String>, usize>,
}

impl ChangeSetBuilder {
    pub fn new(precedence: StatusPrecedence) -> Self {
        ChangeSetBuilder {
            precedence,
            entries: Vec::new(),
            index_by_path: HashMap::new(),
        }
    }

    pub fn insert(&mut self, raw: &str, status: FileStatus) {
        let Some(entry) = PathEntry::parse(raw, status) else {
            tracing::debug!("dropping path without segments: {:?}", raw);
            return;
        };
        match self.index_by_path.get(&entry.segments) {
            Some(&idx) => {
                let current = self.entries[idx].status;
                if self.precedence.overrides(status, current) {
                    tracing::debug!(
                        "path {} reported as {} and {}; keeping {}",
                        entry.display(),
                        current,
                        status,
                        status
                    );
                    self.entries[idx].status = status;
                }
            }
            None => {
                self.index_by_path
                    .insert(entry.segments.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn finish(self) -> ChangeSet {
        ChangeSet {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn parse_drops_empty_segments() {
        let entry = PathEntry::parse("/src//lib.rs/", FileStatus::Added).unwrap();
        assert_eq!(entry.segments(), &["src".to_string(), "lib.rs".to_string()]);
        assert_eq!(entry.display(), "src/lib.rs");
        assert!(PathEntry::parse("", FileStatus::Added).is_none());
        assert!(PathEntry::parse("///", FileStatus::Removed).is_none());
    }

    #[test]
    fn identity_includes_status() {
        let dir = PathEntry::parse("a", FileStatus::Unchanged).unwrap();
        let file = PathEntry::parse("a", FileStatus::Added).unwrap();
        assert_ne!(dir, file);
    }

    #[test]
    fn sets_keep_their_status_and_order() {
        let set = ChangeSet::from_sets(
            ["new.txt"],
            ["src/main.rs", "README.md"],
            ["old.txt"],
            StatusPrecedence::default(),
        );
        let shown: Vec<(String, FileStatus)> = set
            .entries()
            .iter()
            .map(|e| (e.display(), e.status()))
            .collect();
        assert_eq!(
            shown,
            vec![
                ("new.txt".to_string(), FileStatus::Added),
                ("src/main.rs".to_string(), FileStatus::Modified),
                ("README.md".to_string(), FileStatus::Modified),
                ("old.txt".to_string(), FileStatus::Removed),
            ]
        );
    }

    #[test]
    fn malformed_paths_are_dropped() {
        let set = ChangeSet::from_sets(["", "/", "ok.txt"], NONE, NONE, StatusPrecedence::default());
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries()[0].display(), "ok.txt");
    }

    #[test]
    fn removed_first_precedence() {
        let set = ChangeSet::from_sets(
            ["x", "y"],
            ["x", "z"],
            ["x", "y"],
            StatusPrecedence::RemovedFirst,
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.paths_with_status(FileStatus::Removed), vec!["x", "y"]);
        assert_eq!(set.paths_with_status(FileStatus::Modified), vec!["z"]);
        assert!(set.paths_with_status(FileStatus::Added).is_empty());
    }

    #[test]
    fn added_first_precedence() {
        let set = ChangeSet::from_sets(
            ["x", "y"],
            ["x", "z"],
            ["x", "y", "w"],
            StatusPrecedence::AddedFirst,
        );
        assert_eq!(set.paths_with_status(FileStatus::Added), vec!["x", "y"]);
        assert_eq!(set.paths_with_status(FileStatus::Modified), vec!["z"]);
        assert_eq!(set.paths_with_status(FileStatus::Removed), vec!["w"]);
    }

    #[test]
    fn equivalent_spellings_collapse_to_one_entry() {
        let set = ChangeSet::from_sets(["a/b"], ["a//b"], NONE, StatusPrecedence::AddedFirst);
        assert_eq!(set.len(), 1);
        assert_eq!(set.entries()[0].status(), FileStatus::Added);
    }
}
