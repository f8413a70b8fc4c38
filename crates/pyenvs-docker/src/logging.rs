use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::docker::DockerError;
use crate::executor::{CommandOutput, DockerExecutor};

/// Executor wrapper appending every command and its output to a log file.
///
/// Output of failed commands is logged before the failure is returned. Each
/// entry holds the command's stdout followed by its stderr, see
/// [`CommandOutput::combined`].
pub struct LoggingExecutor<E> {
    inner: E,
    logfile: PathBuf,
}

impl<E: DockerExecutor> LoggingExecutor<E> {
    pub fn new(inner: E, logfile: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            logfile: logfile.into(),
        }
    }

    pub fn logfile(&self) -> &Path {
        &self.logfile
    }

    async fn append(&self, args: &[String], output: &str) -> Result<(), DockerError> {
        let log_err = |e| DockerError::Log {
            path: self.logfile.clone(),
            source: e,
        };

        if let Some(parent) = self.logfile.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(log_err)?;
        }

        let mut entry = format!("$ {}\n", args.join(" "));
        entry.push_str(output);
        if !output.ends_with('\n') {
            entry.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.logfile)
            .await
            .map_err(log_err)?;
        file.write_all(entry.as_bytes()).await.map_err(log_err)?;
        file.flush().await.map_err(log_err)
    }
}

impl<E: DockerExecutor> DockerExecutor for LoggingExecutor<E> {
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, DockerError> {
        let result = self.inner.exec(args).await;

        let output = match &result {
            Ok(output) => output.combined(),
            Err(DockerError::CommandFailed { output, .. }) => output.clone(),
            Err(_) => String::new(),
        };

        match self.append(args, &output).await {
            Ok(()) => result,
            // a failed command keeps its own error
            Err(log_error) if result.is_err() => {
                tracing::warn!(error = %log_error, "failed to log command output");
                result
            }
            Err(log_error) => Err(log_error),
        }
    }
}
