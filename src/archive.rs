use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, instrument, warn};

use crate::constants::{self, LEDGER_DATE_FORMAT};
use crate::errors::TrackerError;

/// Version-control collaborator that keeps the ledger directory in sync with a remote.
#[async_trait]
pub trait Archiver {
    /// Bring the local ledger files up to date before a session reads them.
    async fn sync(&self) -> Result<(), TrackerError>;

    /// Commit `path` with `message` and push it.
    async fn archive(&self, path: &Path, message: &str) -> Result<(), TrackerError>;
}

/// Commit message for the ledger keyed `ledger_date` (`YY-MM-DD`), spelled with the full year.
pub fn commit_message(ledger_date: &str) -> String {
    match NaiveDate::parse_from_str(ledger_date, LEDGER_DATE_FORMAT) {
        Ok(day) => format!("Update calorie tracker for {}", day.format("%Y-%m-%d")),
        Err(_) => format!("Update calorie tracker for {}", ledger_date),
    }
}

/// Archiver that shells out to the `git` CLI.
#[derive(Debug, Clone)]
pub struct GitArchiver {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
    timeout: Duration,
}

impl GitArchiver {
    pub fn new(repo_dir: impl Into<PathBuf>, remote: impl Into<String>, branch: impl Into<String>, timeout: Duration) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
            branch: branch.into(),
            timeout,
        }
    }

    /// Archiver for the current directory using the configured remote and branch.
    pub fn from_env() -> Self {
        Self::new(
            ".",
            constants::GIT_REMOTE.clone(),
            constants::GIT_BRANCH.clone(),
            Duration::from_secs(*constants::GIT_TIMEOUT_SECS),
        )
    }

    /// Run one git command; only the exit status matters, stderr goes into the error.
    async fn run_git(&self, step: &str, args: &[&str]) -> Result<(), TrackerError> {
        let failure = |reason: String| TrackerError::ArchivalFailure {
            step: step.to_string(),
            reason,
        };

        debug!(?args, "Running git");
        let child = AsyncCommand::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| failure(format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| failure(format!("could not run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(step, status = %output.status, %stderr, "git command failed");
            return Err(failure(if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl Archiver for GitArchiver {
    #[instrument(skip(self))]
    async fn sync(&self) -> Result<(), TrackerError> {
        self.run_git("pull", &["pull", self.remote.as_str(), self.branch.as_str()]).await?;
        info!(remote = %self.remote, branch = %self.branch, "Pulled latest ledger files");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn archive(&self, path: &Path, message: &str) -> Result<(), TrackerError> {
        // The ledger path is relative to the process, git runs inside `repo_dir`.
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let path = path.to_string_lossy().into_owned();

        self.run_git("add", &["add", path.as_str()]).await?;
        self.run_git("commit", &["commit", "-m", message]).await?;
        self.run_git("push", &["push", self.remote.as_str(), self.branch.as_str()]).await?;
        info!(%path, "Committed and pushed ledger");
        Ok(())
    }
}

/// Archiver that does nothing, for runs that should stay local.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

#[async_trait]
impl Archiver for LocalOnly {
    async fn sync(&self) -> Result<(), TrackerError> {
        debug!("Skipping git pull");
        Ok(())
    }

    async fn archive(&self, path: &Path, _message: &str) -> Result<(), TrackerError> {
        debug!(path = %path.display(), "Skipping git archive");
        Ok(())
    }
}
