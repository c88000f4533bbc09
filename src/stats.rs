use crate::error::Result;
use crate::filter::ExtensionFilter;
use crate::model::{AuthorRow, CommitInfo, FileChange};
use std::collections::HashMap;

/// Line counts for one author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub additions: u64,
    pub deletions: u64,
}

impl LineCounts {
    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl std::ops::AddAssign for LineCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.additions += rhs.additions;
        self.deletions += rhs.deletions;
    }
}

/// Count content lines of a unified diff body. `+++`/`---` file headers
/// are not counted.
pub fn count_patch_lines(patch: &str) -> LineCounts {
    let mut counts = LineCounts::default();
    for line in patch.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            counts.additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            counts.deletions += 1;
        }
    }
    counts
}

/// Per-author counters, iterated in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct AuthorStats {
    order: Vec<(String, LineCounts)>,
    index: HashMap<String, usize>,
}

impl AuthorStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for `author`, inserting a zeroed entry at the end if absent.
    pub fn entry(&mut self, author: &str) -> &mut LineCounts {
        let idx = match self.index.get(author) {
            Some(&idx) => idx,
            None => {
                let idx = self.order.len();
                self.order.push((author.to_string(), LineCounts::default()));
                self.index.insert(author.to_string(), idx);
                idx
            }
        };
        &mut self.order[idx].1
    }

    /// Add `counts` to `author`. Nothing is inserted for an empty change.
    pub fn record(&mut self, author: &str, counts: LineCounts) {
        if counts.is_empty() {
            return;
        }
        *self.entry(author) += counts;
    }

    pub fn get(&self, author: &str) -> Option<LineCounts> {
        self.index.get(author).map(|&idx| self.order[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LineCounts)> + '_ {
        self.order.iter().map(|(name, counts)| (name.as_str(), *counts))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn rows(&self) -> Vec<AuthorRow> {
        self.iter()
            .map(|(name, counts)| AuthorRow {
                name: name.to_string(),
                additions: counts.additions,
                deletions: counts.deletions,
                total: counts.total(),
            })
            .collect()
    }
}

/// Where per-commit file changes and their diff bodies come from.
pub trait DiffSource {
    /// Files changed between `commit` and its first parent.
    fn changes(&self, commit: &CommitInfo) -> Result<Vec<FileChange>>;

    /// Unified diff body for one change.
    fn patch(&self, change: &FileChange) -> Result<String>;
}

/// Accumulate line counts of every single-parent commit into an
/// [`AuthorStats`]. A file whose diff cannot be produced is logged and
/// skipped; the rest of the run is unaffected.
pub fn aggregate<S: DiffSource + ?Sized>(
    source: &S,
    commits: &[CommitInfo],
    filter: &ExtensionFilter,
) -> Result<AuthorStats> {
    let mut stats = AuthorStats::new();

    for commit in commits {
        if !commit.has_single_parent() {
            tracing::debug!(
                commit = %commit.id,
                parents = commit.parent_ids.len(),
                "skipping root or merge commit"
            );
            continue;
        }

        for change in source.changes(commit)? {
            let Some(path) = change.path() else { continue };
            if !filter.is_target(path) {
                continue;
            }

            match source.patch(&change) {
                Ok(patch) => stats.record(&commit.author_name, count_patch_lines(&patch)),
                Err(e) => {
                    tracing::warn!(path, commit = %commit.id, error = %e, "failed to parse diff, skipping file");
                }
            }
        }
    }

    Ok(stats)
}
