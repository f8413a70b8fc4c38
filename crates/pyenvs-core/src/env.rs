//! Information about the environment the pipeline runs in.

use std::collections::BTreeMap;
use std::process::{Command, Stdio};

/// Image labels, `name -> value`.
pub type Labels = BTreeMap<String, String>;

/// Number of commit hash characters appended to the release identifier.
const SHORT_COMMIT_LEN: usize = 6;

/// Commit being built: `git rev-parse HEAD`, or `$GITHUB_SHA` outside a
/// git checkout.
pub fn git_commit() -> Option<String> {
    git(&["rev-parse", "HEAD"]).or_else(|| non_empty_var("GITHUB_SHA"))
}

/// Labels describing the build environment (source revision, CI run).
pub fn environment_info() -> Labels {
    collect_labels(git_commit(), non_empty_var)
}

/// Toolchain release identifier used in `-pc<release>` tags.
///
/// # Examples
///
/// ```
/// assert_eq!(pyenvs_core::release("0.3.0", Some("4f1c2a9e77")), "0.3.0-4f1c2a");
/// assert_eq!(pyenvs_core::release("0.3.0", None), "0.3.0");
/// ```
pub fn release(version: &str, commit: Option<&str>) -> String {
    match commit.filter(|c| !c.is_empty()) {
        Some(commit) => {
            let short: String = commit.chars().take(SHORT_COMMIT_LEN).collect();
            format!("{version}-{short}")
        }
        None => version.to_owned(),
    }
}

fn collect_labels(commit: Option<String>, var: impl Fn(&str) -> Option<String>) -> Labels {
    [
        ("commit", commit),
        ("github-actions", var("GITHUB_ACTIONS")),
        ("github-actions-repo", var("GITHUB_REPOSITORY")),
        ("github-actions-job", var("GITHUB_JOB")),
        ("github-actions-run", var("GITHUB_RUN_ID")),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| (key.to_owned(), v))
    })
    .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).into_iter().find(|v| !v.is_empty())
}

fn git(args: &[&str]) -> Option<String> {
    let output = match Command::new("git")
        .args(args)
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error = %e, "git not available");
            return None;
        }
    };
    if !output.status.success() {
        tracing::debug!(?args, status = %output.status, "git command failed");
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!stdout.is_empty()).then_some(stdout)
}
