use std::path::PathBuf;

use anyhow::Context as _;
use pyenvs_core::git_commit;
use pyenvs_data::{GithubClient, extract_image_data, fetch_workdir};
use secrecy::SecretString;

use super::Context;

/// Workflow whose run uploads the data artifact.
const RUN_NAME: &str = "build";
const ARTIFACT_NAME: &str = "image-data";

/// Download and unpack the `image-data` artifact built for a commit.
pub async fn fetch_data(
    ctx: &Context,
    outdir: Option<PathBuf>,
    commit: Option<String>,
    timeout: Option<u64>,
    repo: &str,
) -> anyhow::Result<()> {
    let Some(commit) = commit.or_else(git_commit) else {
        anyhow::bail!("must specify a commit (--commit, or run inside a git checkout)");
    };
    let outdir = ctx.datadir(outdir);

    let client = GithubClient::new(repo, github_token())?;

    let workdir = fetch_workdir(&outdir);
    if workdir.exists() {
        std::fs::remove_dir_all(&workdir)
            .with_context(|| format!("failed to clean {}", workdir.display()))?;
    }
    std::fs::create_dir_all(&workdir)
        .with_context(|| format!("failed to create {}", workdir.display()))?;

    match timeout {
        Some(0) => println!("Waiting for artifact (no timeout)..."),
        Some(secs) => println!("Waiting for artifact (timeout={secs}s)..."),
        None => println!("Looking for artifact..."),
    }
    let Some(artifact) = client
        .find_artifact(RUN_NAME, ARTIFACT_NAME, &commit, timeout)
        .await?
    else {
        anyhow::bail!("could not find artifact for commit {commit}");
    };
    println!("Found artifact: {artifact}");

    let archive = workdir.join("image-data.zip");
    client.download_artifact(&artifact, &archive).await?;
    extract_image_data(&archive, &outdir)?;

    println!("Image data written to {}", outdir.display());
    Ok(())
}

fn github_token() -> Option<SecretString> {
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => Some(SecretString::from(token)),
        _ => {
            tracing::warn!("GITHUB_TOKEN is not set; artifact downloads need authentication");
            None
        }
    }
}
