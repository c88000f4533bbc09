use super::GitRepo;
use crate::error::{ReportError, Result};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

/// A repository cloned into a temporary directory.
///
/// Dropping it removes the directory and everything in it.
pub struct ClonedRepo {
    // declared before `dir` so the repository handle is released first
    repo: GitRepo,
    dir: TempDir,
}

impl ClonedRepo {
    /// Full clone of `url` into a fresh temporary directory, default branch
    /// checked out. `shown_url` is used in messages instead of `url`, which
    /// may carry credentials.
    pub fn new(url: &str, shown_url: &str, show_progress: bool) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("authorstat-").tempdir()?;
        if show_progress {
            println!("Cloning {} into {}...", shown_url, dir.path().display());
        }
        let repo = clone_into(url, dir.path()).map_err(|e| scrub(e, url, shown_url))?;
        tracing::info!(url = shown_url, path = %dir.path().display(), "clone finished");
        Ok(Self { repo, dir })
    }

    pub fn repo(&self) -> &GitRepo {
        &self.repo
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

fn clone_into(url: &str, dst: &Path) -> Result<GitRepo> {
    let interrupt = AtomicBool::new(false);

    let mut prepare = gix::prepare_clone(url, dst).map_err(|e| ReportError::Clone(error_chain(&e)))?;
    let (mut checkout, _fetched) = prepare
        .fetch_then_checkout(gix::progress::Discard, &interrupt)
        .map_err(|e| ReportError::Clone(error_chain(&e)))?;
    let (repo, _) = checkout
        .main_worktree(gix::progress::Discard, &interrupt)
        .map_err(|e| ReportError::Clone(error_chain(&e)))?;

    Ok(GitRepo::from_repository(repo))
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Remove the credentialed URL and its secret from clone error text.
fn scrub(err: ReportError, url: &str, shown_url: &str) -> ReportError {
    let msg = match err {
        ReportError::Clone(msg) => msg,
        other => return other,
    };
    let mut msg = msg.replace(url, shown_url);
    if let Some(userinfo) = userinfo(url) {
        let secret = userinfo.split_once(':').map_or(userinfo, |(_, password)| password);
        msg = msg.replace(userinfo, "<redacted>");
        if !secret.is_empty() {
            msg = msg.replace(secret, "<redacted>");
        }
    }
    ReportError::Clone(msg)
}

fn userinfo(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = &rest[..rest.find('/').unwrap_or(rest.len())];
    authority.rfind('@').map(|at| &authority[..at])
}
