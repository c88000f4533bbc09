use crate::error::{ReportError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gix::ObjectId;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
    pub parent_ids: Vec<String>,
}

impl CommitInfo {
    /// Root commits and merges carry no single-parent diff to attribute.
    pub fn has_single_parent(&self) -> bool {
        self.parent_ids.len() == 1
    }
}

/// One changed file between a commit and its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub before_path: Option<String>,
    pub after_path: Option<String>,
    pub before_id: Option<ObjectId>,
    pub after_id: Option<ObjectId>,
}

impl FileChange {
    /// The after-path, or the before-path for deletions.
    pub fn path(&self) -> Option<&str> {
        self.after_path
            .as_deref()
            .or(self.before_path.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Build an inclusive window from user input. A bare date as `since`
    /// starts at midnight, a bare date as `until` covers the whole day.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        let mut range = DateRange::new();

        if let Some(s) = since {
            range = range.with_since(parse_bound(s, (0, 0, 0))?);
        }
        if let Some(u) = until {
            range = range.with_until(parse_bound(u, (23, 59, 59))?);
        }

        if let (Some(s), Some(u)) = (range.since, range.until) {
            if s > u {
                return Err(ReportError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        Ok(range)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bound(input: &str, (h, m, s): (u32, u32, u32)) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| ReportError::InvalidDate(format!("'{input}' is not YYYY-MM-DD: {e}")))?;
    let datetime = date
        .and_hms_opt(h, m, s)
        .ok_or_else(|| ReportError::InvalidDate(format!("'{input}' has no valid {h:02}:{m:02}:{s:02}")))?;
    Ok(Utc.from_utc_datetime(&datetime))
}

/// Which commits a run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSelection {
    /// A single commit named by hash or ref.
    Single { rev: String },
    /// Commits reachable from `origin/<branch>`, or from every branch, inside a date window.
    Range { branch: Option<String>, range: DateRange },
}

impl CommitSelection {
    /// Exactly one of `commit` or the `since`/`until` pair must be given.
    pub fn from_args(
        commit: Option<&str>,
        since: Option<&str>,
        until: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Self> {
        match (commit, since, until) {
            (Some(rev), None, None) => {
                if let Some(branch) = branch {
                    tracing::warn!(branch, "--branch is ignored when --commit is given");
                }
                Ok(CommitSelection::Single { rev: rev.to_string() })
            }
            (None, Some(since), Some(until)) => Ok(CommitSelection::Range {
                branch: branch.map(str::to_string),
                range: DateRange::parse(Some(since), Some(until))?,
            }),
            _ => Err(ReportError::Config(
                "Specify either --commit or both --since and --until".to_string(),
            )),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CommitSelection::Single { rev } => format!("commit {rev}"),
            CommitSelection::Range { branch, range } => {
                let fmt = |d: Option<DateTime<Utc>>| {
                    d.map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "*".to_string())
                };
                format!(
                    "{} from {} to {}",
                    branch
                        .as_deref()
                        .map(|b| format!("origin/{b}"))
                        .unwrap_or_else(|| "all branches".to_string()),
                    fmt(range.since),
                    fmt(range.until)
                )
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorRow {
    pub name: String,
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_url: String,
    pub selection: String,
    pub extensions: Vec<String>,
    pub authors: Vec<AuthorRow>,
}
