use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::fs;
use tokio::process::Command;
use url::Url;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::types::CloneRequest;

const ALLOWED_SCHEMES: &[&str] = &["https", "http", "git"];

/// Clones public repositories into a single fixed directory with the `git` binary.
#[derive(Debug, Clone)]
pub struct LocalCloneExecutor {
    git_binary: String,
    target_dir: PathBuf,
    timeout: Duration,
}

impl LocalCloneExecutor {
    #[must_use]
    pub fn new(git_binary: impl Into<String>, target_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            git_binary: git_binary.into(),
            target_dir,
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.git_binary.clone(),
            config.clone_dir.clone(),
            config.clone_timeout,
        )
    }

    /// Runs `git clone` and returns its standard output. The URL is validated
    /// before anything is spawned and is passed as a plain argument.
    pub async fn clone(&self, request: &CloneRequest) -> Result<String> {
        let url = validate_clone_url(&request.repo_url)?;

        if let Some(name) = &request.target_name {
            tracing::debug!(target_name = %name, "Ignoring requested clone target name");
        }

        if let Some(parent) = self.target_dir.parent() {
            fs::create_dir_all(parent).await?;
        }

        let child = Command::new(&self.git_binary)
            .arg("clone")
            .arg("--")
            .arg(url.as_str())
            .arg(&self.target_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Process(format!("failed to spawn {}: {e}", self.git_binary)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::Process(format!("clone timed out after {}s", self.timeout.as_secs()))
            })?
            .map_err(|e| Error::Process(format!("failed to wait for clone: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Process(format!(
                "git clone exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(url = %url, dir = %self.target_dir.display(), "Repository cloned");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Accepts only absolute remote URLs with a known transport and a host.
pub fn validate_clone_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Validation("Repository URL is required.".into()));
    }

    let url = Url::parse(raw)
        .map_err(|_| Error::Validation("Repository URL is not a valid URL.".into()))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(Error::Validation(format!(
            "Unsupported repository URL scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::Validation("Repository URL must include a host.".into()));
    }

    Ok(url)
}
