use std::path::PathBuf;
use std::process::Stdio;

use crate::docker::DockerError;

/// Environment variable overriding the container tool binary.
pub const DOCKER_ENV: &str = "DOCKER";

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr.
    ///
    /// The streams are captured through separate pipes, so lines written to
    /// stdout and stderr are not interleaved in the order they were emitted.
    /// buildx writes its progress to stderr, which therefore comes last.
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }
}

/// Abstraction over command execution for testability.
///
/// `args` is the full command line, program first. Production code uses
/// [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Run a command to completion, capturing its output.
    ///
    /// A non-zero exit yields [`DockerError::CommandFailed`] carrying the
    /// combined output.
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, DockerError>;
}

impl<E: DockerExecutor + ?Sized> DockerExecutor for &E {
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, DockerError> {
        (**self).exec(args).await
    }
}

/// Executor spawning real child processes.
pub struct RealExecutor;

impl DockerExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, DockerError> {
        let (program, rest) = args.split_first().ok_or(DockerError::EmptyCommand)?;
        tracing::debug!(command = %args.join(" "), "running");

        let output = tokio::process::Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DockerError::NotFound {
                program: program.clone(),
                source: e,
            })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if output.status.success() {
            Ok(captured)
        } else {
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                status: output.status.to_string(),
                output: captured.combined(),
            })
        }
    }
}

/// Container tool binary for this process.
///
/// `$DOCKER` when set and non-empty, `docker` when unset. An empty
/// `$DOCKER` falls back to the first of `docker` or `podman` found on
/// `PATH`.
pub fn default_program() -> String {
    // arch-lint: allow(no-silent-result-drop) reason="an unset or non-unicode $DOCKER selects the default tool"
    resolve_program(std::env::var(DOCKER_ENV).ok(), find_in_path)
}

fn resolve_program(docker_var: Option<String>, lookup: impl Fn(&str) -> Option<PathBuf>) -> String {
    match docker_var {
        Some(program) if !program.is_empty() => program,
        Some(_) => match ["docker", "podman"].into_iter().find_map(&lookup) {
            Some(path) => path.display().to_string(),
            None => "docker".to_owned(),
        },
        None => "docker".to_owned(),
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
