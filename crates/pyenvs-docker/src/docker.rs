use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("failed to start {program}; install docker or podman, or set $DOCKER")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("command failed ({status}): {}", args.join(" "))]
    CommandFailed {
        args: Vec<String>,
        status: String,
        /// Combined stdout and stderr of the failed command
        output: String,
    },

    #[error("empty command line")]
    EmptyCommand,

    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("failed to write log file {path}")]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },
}
