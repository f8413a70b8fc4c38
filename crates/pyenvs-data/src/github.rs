use std::fmt;
use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::error::DataError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REPO: &str = "FFY00/python-environments";
const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A workflow artifact as returned by the Actions API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    pub archive_download_url: String,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id={})", self.name, self.id)
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    id: u64,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct Artifacts {
    artifacts: Vec<Artifact>,
}

/// Client for the GitHub Actions API of one repository.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    repo: String,
    token: Option<SecretString>,
}

impl GithubClient {
    pub fn new(repo: impl Into<String>, token: Option<SecretString>) -> Result<Self, DataError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pyenvs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Http {
                url: DEFAULT_API_URL.to_owned(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: DEFAULT_API_URL.to_owned(),
            repo: repo.into(),
            token,
        })
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Find artifact `artifact_name` of the workflow run `run_name` for `commit`.
    ///
    /// `timeout` controls polling: `None` looks once, `Some(0)` waits
    /// forever, `Some(n)` makes `n` attempts one second apart.
    pub async fn find_artifact(
        &self,
        run_name: &str,
        artifact_name: &str,
        commit: &str,
        timeout: Option<u64>,
    ) -> Result<Option<Artifact>, DataError> {
        let limit = attempts(timeout);
        let mut attempt = 0;
        loop {
            if attempt != 0 {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            if let Some(artifact) = self.lookup(run_name, artifact_name, commit).await? {
                return Ok(Some(artifact));
            }
            attempt += 1;
            if limit.is_some_and(|limit| attempt >= limit) {
                return Ok(None);
            }
            tracing::debug!(attempt, run_name, artifact_name, "artifact not available yet");
        }
    }

    /// Stream the archive of `artifact` into `path`.
    pub async fn download_artifact(
        &self,
        artifact: &Artifact,
        path: &Path,
    ) -> Result<(), DataError> {
        let url = &artifact.archive_download_url;
        let http_err = |e| DataError::Http {
            url: url.clone(),
            source: e,
        };
        let write_err = |e| DataError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        let mut response = self
            .request(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_err)?;

        let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
        let mut size = 0;
        while let Some(chunk) = response.chunk().await.map_err(http_err)? {
            file.write_all(&chunk).await.map_err(write_err)?;
            size += chunk.len();
        }
        file.flush().await.map_err(write_err)?;

        tracing::debug!(artifact = %artifact, bytes = size, "artifact downloaded");
        Ok(())
    }

    async fn lookup(
        &self,
        run_name: &str,
        artifact_name: &str,
        commit: &str,
    ) -> Result<Option<Artifact>, DataError> {
        let runs: WorkflowRuns = self
            .get_json(&format!(
                "{}/repos/{}/actions/runs?head_sha={commit}",
                self.base_url, self.repo
            ))
            .await?;
        let Some(run) = runs
            .workflow_runs
            .into_iter()
            .find(|run| run.name.as_deref() == Some(run_name))
        else {
            return Ok(None);
        };

        let artifacts: Artifacts = self
            .get_json(&format!(
                "{}/repos/{}/actions/runs/{}/artifacts",
                self.base_url, self.repo, run.id
            ))
            .await?;
        Ok(artifacts
            .artifacts
            .into_iter()
            .find(|artifact| artifact.name == artifact_name))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, DataError> {
        let http_err = |e| DataError::Http {
            url: url.to_owned(),
            source: e,
        };
        self.request(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .http
            .get(url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

/// Number of lookups for a poll timeout; `None` means unbounded.
fn attempts(timeout: Option<u64>) -> Option<u64> {
    match timeout {
        None => Some(1),
        Some(0) => None,
        Some(n) => Some(n),
    }
}
