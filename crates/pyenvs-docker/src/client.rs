use std::path::{Path, PathBuf};

use pyenvs_core::Labels;

use crate::docker::DockerError;
use crate::executor::{CommandOutput, DockerExecutor, RealExecutor, default_program};

/// Interpreter used for in-container introspection.
const INTROSPECTION_PYTHON: &str = "/usr/bin/python3";
/// Module printing the environment description as JSON.
const INTROSPECTION_MODULE: &str = "python_environments.generate";
/// Mount point of the repository inside the container.
const SOURCE_MOUNT: &str = "/source";

/// Container tool client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
    program: String,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self::with_executor(RealExecutor)
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

/// Host directory bind-mounted into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub source: PathBuf,
    pub target: String,
    pub read_only: bool,
}

/// Parameters of a one-shot `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub command: Vec<String>,
    pub env: Vec<(String, String)>,
    pub mounts: Vec<BindMount>,
}

impl<E: DockerExecutor> DockerClient<E> {
    /// Client using `executor` and the tool from [`default_program`].
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            program: default_program(),
        }
    }

    /// Override the container tool binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `buildx build <path> --tag=<tag>... --label=<name>=<value>...`
    pub async fn build(
        &self,
        path: &Path,
        tags: &[String],
        labels: &Labels,
    ) -> Result<(), DockerError> {
        let path = path_str(path)?;

        let mut cmd = vec!["buildx".to_owned(), "build".to_owned(), path.to_owned()];
        cmd.extend(tags.iter().map(|tag| format!("--tag={tag}")));
        cmd.extend(
            labels
                .iter()
                .map(|(name, value)| format!("--label={name}={value}")),
        );

        self.run_tool(cmd).await?;
        tracing::debug!(path, tags = tags.len(), "image built");
        Ok(())
    }

    /// `push <tag>`
    pub async fn push(&self, tag: &str) -> Result<(), DockerError> {
        self.run_tool(vec!["push".to_owned(), tag.to_owned()]).await?;
        tracing::debug!(tag, "image pushed");
        Ok(())
    }

    /// `run --rm ...`, returning the container's stdout.
    pub async fn run(&self, spec: &RunSpec) -> Result<String, DockerError> {
        let mut cmd = vec!["run".to_owned(), "--rm".to_owned()];
        for (name, value) in &spec.env {
            cmd.push(format!("--env={name}={value}"));
        }
        for mount in &spec.mounts {
            let mut arg = format!(
                "--mount=type=bind,source={},target={}",
                path_str(&mount.source)?,
                mount.target
            );
            if mount.read_only {
                arg.push_str(",readonly");
            }
            cmd.push(arg);
        }
        cmd.push(spec.image.clone());
        cmd.extend(spec.command.iter().cloned());

        let output = self.run_tool(cmd).await?;
        Ok(output.stdout)
    }

    /// Run the introspection module inside `tag` and return its JSON output.
    ///
    /// `source_dir` is the repository root, mounted read-only at `/source`
    /// with its `python/` directory on `PYTHONPATH`.
    pub async fn run_python_introspection(
        &self,
        tag: &str,
        source_dir: &Path,
    ) -> Result<String, DockerError> {
        let spec = RunSpec {
            image: tag.to_owned(),
            command: vec![
                INTROSPECTION_PYTHON.to_owned(),
                "-m".to_owned(),
                INTROSPECTION_MODULE.to_owned(),
            ],
            env: vec![("PYTHONPATH".to_owned(), format!("{SOURCE_MOUNT}/python"))],
            mounts: vec![BindMount {
                source: source_dir.to_path_buf(),
                target: SOURCE_MOUNT.to_owned(),
                read_only: true,
            }],
        };
        tracing::debug!(tag, "running introspection");
        self.run(&spec).await
    }

    /// Id of a local image (`image inspect --format {{.Id}} <tag>`).
    pub async fn image_id(&self, tag: &str) -> Result<String, DockerError> {
        let output = self
            .run_tool(vec![
                "image".to_owned(),
                "inspect".to_owned(),
                "--format".to_owned(),
                "{{.Id}}".to_owned(),
                tag.to_owned(),
            ])
            .await?;
        Ok(output.stdout.trim().to_owned())
    }

    async fn run_tool(&self, args: Vec<String>) -> Result<CommandOutput, DockerError> {
        let mut cmd = Vec::with_capacity(args.len() + 1);
        cmd.push(self.program.clone());
        cmd.extend(args);
        self.executor.exec(&cmd).await
    }
}

fn path_str(path: &Path) -> Result<&str, DockerError> {
    path.to_str()
        .ok_or_else(|| DockerError::InvalidPath(path.to_path_buf()))
}
