use crate::error::{ReportError, Result};
use crate::model::{CommitInfo, CommitSelection, DateRange, FileChange};
use crate::stats::DiffSource;
use chrono::DateTime;
use gix::object::tree::diff::ChangeDetached;
use gix::{ObjectId, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use similar::TextDiff;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Bytes inspected for a NUL when deciding whether a blob is binary.
const BINARY_PROBE_LEN: usize = 8192;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = gix::open(path.as_ref())?;
        Ok(Self::from_repository(repo))
    }

    pub fn from_repository(repo: Repository) -> Self {
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        Self { repo, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn select_commits(&self, selection: &CommitSelection) -> Result<Vec<CommitInfo>> {
        match selection {
            CommitSelection::Single { rev } => Ok(vec![self.resolve_commit(rev)?]),
            CommitSelection::Range { branch, range } => {
                let tips = self.tips(branch.as_deref())?;
                self.collect_commits(tips, range)
            }
        }
    }

    /// Resolve a hash or ref to a commit.
    pub fn resolve_commit(&self, rev: &str) -> Result<CommitInfo> {
        let id = self
            .repo
            .rev_parse_single(rev)
            .map_err(|e| ReportError::NotFound(format!("commit '{rev}': {e}")))?;

        let commit = id
            .object()
            .map_err(|e| ReportError::NotFound(format!("commit '{rev}': {e}")))?
            .try_into_commit()
            .map_err(|_| ReportError::NotFound(format!("'{rev}' is not a commit")))?;

        commit_info(&commit)
    }

    /// `refs/remotes/origin/<branch>` when a branch is named, otherwise every
    /// local and remote-tracking branch.
    fn tips(&self, branch: Option<&str>) -> Result<Vec<ObjectId>> {
        if let Some(branch) = branch {
            let name = format!("refs/remotes/origin/{branch}");
            let mut reference = self
                .repo
                .find_reference(name.as_str())
                .map_err(|e| ReportError::NotFound(format!("branch 'origin/{branch}': {e}")))?;
            let id = reference
                .peel_to_id_in_place()
                .map_err(|e| ReportError::NotFound(format!("branch 'origin/{branch}': {e}")))?;
            return Ok(vec![id.detach()]);
        }

        let platform = self
            .repo
            .references()
            .map_err(|e| ReportError::GitRepo(format!("Cannot list references: {e}")))?;

        let mut tips = Vec::new();
        let local = platform
            .local_branches()
            .map_err(|e| ReportError::GitRepo(format!("Cannot list local branches: {e}")))?;
        let remote = platform
            .remote_branches()
            .map_err(|e| ReportError::GitRepo(format!("Cannot list remote branches: {e}")))?;

        for reference in local.chain(remote) {
            let mut reference =
                reference.map_err(|e| ReportError::GitRepo(format!("Cannot read reference: {e}")))?;
            match reference.peel_to_id_in_place() {
                Ok(id) => tips.push(id.detach()),
                Err(e) => {
                    tracing::warn!(reference = %reference.name().as_bstr(), error = %e, "skipping unpeelable reference");
                }
            }
        }

        tracing::debug!(tips = tips.len(), "resolved branch tips");
        Ok(tips)
    }

    /// Walk everything reachable from `tips` once and keep commits whose
    /// committer time falls inside `range`, newest first.
    fn collect_commits(&self, tips: Vec<ObjectId>, range: &DateRange) -> Result<Vec<CommitInfo>> {
        let mut commits = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: Vec<ObjectId> = tips;

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} {pos}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Walking commits...");

        while let Some(commit_id) = stack.pop() {
            if !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let info = commit_info(&commit)?;

            for pid in commit.parent_ids() {
                stack.push(pid.detach());
            }
            pb.inc(1);

            if range.contains(&info.timestamp) {
                commits.push(info);
            }
        }

        pb.finish_and_clear();
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        tracing::info!(walked = seen.len(), selected = commits.len(), "collected commits");
        Ok(commits)
    }

    fn blob_data(&self, id: Option<ObjectId>) -> Result<Vec<u8>> {
        match id {
            Some(id) => Ok(self.repo.find_object(id)?.detach().data),
            None => Ok(Vec::new()),
        }
    }
}

impl DiffSource for GitRepo {
    fn changes(&self, commit: &CommitInfo) -> Result<Vec<FileChange>> {
        let [parent_id] = commit.parent_ids.as_slice() else {
            return Err(ReportError::GitRepo(format!(
                "commit {} has {} parents, expected one",
                commit.id,
                commit.parent_ids.len()
            )));
        };

        let commit_tree = self.repo.find_commit(parse_id(&commit.id)?)?.tree()?;
        let parent_tree = self.repo.find_commit(parse_id(parent_id)?)?.tree()?;

        let changes: Vec<ChangeDetached> =
            self.repo
                .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?;

        Ok(changes.into_iter().filter_map(file_change).collect())
    }

    fn patch(&self, change: &FileChange) -> Result<String> {
        let old = self.blob_data(change.before_id)?;
        let new = self.blob_data(change.after_id)?;

        let old_label = label("a", change.before_path.as_deref());
        let new_label = label("b", change.after_path.as_deref());

        if is_binary(&old) || is_binary(&new) {
            return Ok(format!("Binary files {old_label} and {new_label} differ\n"));
        }

        let old_text = String::from_utf8_lossy(&old);
        let new_text = String::from_utf8_lossy(&new);

        Ok(TextDiff::from_lines(old_text.as_ref(), new_text.as_ref())
            .unified_diff()
            .context_radius(3)
            .header(&old_label, &new_label)
            .to_string())
    }
}

fn commit_info(commit: &gix::Commit<'_>) -> Result<CommitInfo> {
    let secs = commit.time()?.seconds;
    let timestamp = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ReportError::InvalidDate(format!("Invalid timestamp: {secs}")))?;
    let author = commit.author()?;

    Ok(CommitInfo {
        id: commit.id.to_string(),
        author_name: author.name.to_string(),
        author_email: author.email.to_string(),
        timestamp,
        parent_ids: commit.parent_ids().map(|id| id.to_string()).collect(),
    })
}

fn parse_id(hex: &str) -> Result<ObjectId> {
    ObjectId::from_hex(hex.as_bytes()).map_err(|e| ReportError::GitRepo(format!("Invalid commit ID {hex}: {e}")))
}

fn is_file(mode: &gix::objs::tree::EntryMode) -> bool {
    !mode.is_tree() && !mode.is_commit()
}

/// Trees and submodules carry no lines of their own.
fn file_change(change: ChangeDetached) -> Option<FileChange> {
    match change {
        ChangeDetached::Addition { location, entry_mode, id, .. } => is_file(&entry_mode).then(|| FileChange {
            before_path: None,
            after_path: Some(location.to_string()),
            before_id: None,
            after_id: Some(id),
        }),
        ChangeDetached::Deletion { location, entry_mode, id, .. } => is_file(&entry_mode).then(|| FileChange {
            before_path: Some(location.to_string()),
            after_path: None,
            before_id: Some(id),
            after_id: None,
        }),
        ChangeDetached::Modification {
            location,
            previous_entry_mode,
            previous_id,
            entry_mode,
            id,
            ..
        } => (is_file(&previous_entry_mode) && is_file(&entry_mode)).then(|| FileChange {
            before_path: Some(location.to_string()),
            after_path: Some(location.to_string()),
            before_id: Some(previous_id),
            after_id: Some(id),
        }),
        ChangeDetached::Rewrite {
            source_location,
            source_entry_mode,
            source_id,
            entry_mode,
            id,
            location,
            ..
        } => (is_file(&source_entry_mode) && is_file(&entry_mode)).then(|| FileChange {
            before_path: Some(source_location.to_string()),
            after_path: Some(location.to_string()),
            before_id: Some(source_id),
            after_id: Some(id),
        }),
    }
}

fn label(side: &str, path: Option<&str>) -> String {
    match path {
        Some(p) => format!("{side}/{p}"),
        None => "/dev/null".to_string(),
    }
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE_LEN).any(|&b| b == 0)
}
