use crate::config::{redact_url, Credentials, EnvFile};
use crate::error::Result;
use crate::filter::ExtensionFilter;
use crate::git::ClonedRepo;
use crate::model::CommitSelection;
use crate::report;
use crate::stats::aggregate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "authorstat")]
#[command(about = "Per-author line additions and deletions across a range of commits")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Repository URL to clone (HTTPS, file:// or a local path)")]
    pub repo_url: String,

    #[arg(long, help = "Analyze a single commit (hash or ref)")]
    pub commit: Option<String>,

    #[arg(long, help = "Start date, inclusive (YYYY-MM-DD or RFC3339)")]
    pub since: Option<String>,

    #[arg(long, help = "End date, inclusive (YYYY-MM-DD or RFC3339)")]
    pub until: Option<String>,

    #[arg(long, help = "Branch to analyze as origin/<branch> (default: all branches)")]
    pub branch: Option<String>,

    #[arg(
        long = "ext",
        value_delimiter = ',',
        help = "File suffixes to count, replacing the default set (repeatable, comma separated)"
    )]
    pub extensions: Vec<String>,

    #[arg(long, help = "Read GITHUB_TOKEN and friends from this file instead of .env")]
    pub env_file: Option<PathBuf>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn filter(&self) -> ExtensionFilter {
        if self.extensions.is_empty() {
            ExtensionFilter::default()
        } else {
            ExtensionFilter::new(self.extensions.iter().cloned())
        }
    }

    pub fn selection(&self) -> Result<CommitSelection> {
        CommitSelection::from_args(
            self.commit.as_deref(),
            self.since.as_deref(),
            self.until.as_deref(),
            self.branch.as_deref(),
        )
    }

    /// Clone, select, aggregate, render. The temporary clone is removed
    /// before this returns, on success or error.
    pub fn execute(self) -> Result<()> {
        let selection = self.selection()?;
        let filter = self.filter();

        let env_file = EnvFile::discover(self.env_file.as_deref())?;
        let credentials = Credentials::from_process_env(&env_file);
        let shown_url = redact_url(&self.repo_url);
        let clone_url = credentials.clone_url(&self.repo_url);
        tracing::debug!(url = %shown_url, authenticated = credentials.has_token(), ?selection, "starting");

        let cloned = ClonedRepo::new(&clone_url, &shown_url, !self.json)?;
        let commits = cloned.repo().select_commits(&selection)?;
        let stats = aggregate(cloned.repo(), &commits, &filter)?;

        if self.json {
            let output = report::build_output(&stats, &shown_url, &selection.describe(), filter.suffixes());
            report::output_json(&output)?;
        } else {
            report::output_table(&stats);
        }

        Ok(())
    }
}
