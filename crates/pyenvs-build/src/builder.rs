use std::path::{Path, PathBuf};

use pyenvs_core::{Image, ImagesContainer, Labels, Repo, environment_info};
use pyenvs_docker::{
    DockerClient, DockerError, DockerExecutor, LoggingExecutor, RealExecutor, default_program,
};

use crate::concurrent::{Task, TaskRun, TaskRunner};
use crate::render::{RenderError, TemplateRenderer};

/// Directories used by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Root of the template directories
    pub templates: PathBuf,
    /// Rendered build contexts, one subdirectory per image id
    pub srcdir: PathBuf,
    /// Per-image command logs
    pub logdir: PathBuf,
}

impl BuildLayout {
    /// Layout with sources in `<build_path>/src` and logs in `<build_path>/logs`.
    pub fn under(build_path: &Path, templates: impl Into<PathBuf>) -> Self {
        Self {
            templates: templates.into(),
            srcdir: build_path.join("src"),
            logdir: build_path.join("logs"),
        }
    }
}

/// Renders, builds, and pushes a set of images.
pub struct Builder<E = RealExecutor> {
    images: ImagesContainer,
    repos: Vec<Repo>,
    layout: BuildLayout,
    renderer: TemplateRenderer,
    release: String,
    env_info: Labels,
    executor: E,
    program: String,
    runner: TaskRunner,
    fast_fail: bool,
}

impl Builder<RealExecutor> {
    pub fn new(
        images: ImagesContainer,
        repos: Vec<Repo>,
        layout: BuildLayout,
        release: impl Into<String>,
    ) -> Self {
        Self::with_executor(images, repos, layout, release, RealExecutor)
    }
}

impl<E: DockerExecutor> Builder<E> {
    /// Builder running tool commands through `executor`.
    ///
    /// Image labels default to [`environment_info`].
    pub fn with_executor(
        images: ImagesContainer,
        repos: Vec<Repo>,
        layout: BuildLayout,
        release: impl Into<String>,
        executor: E,
    ) -> Self {
        Self {
            images,
            repos,
            renderer: TemplateRenderer::new(&layout.templates),
            layout,
            release: release.into(),
            env_info: environment_info(),
            executor,
            program: default_program(),
            runner: TaskRunner::default(),
            fast_fail: true,
        }
    }

    pub fn with_env_info(mut self, env_info: Labels) -> Self {
        self.env_info = env_info;
        self
    }

    pub fn with_fast_fail(mut self, fast_fail: bool) -> Self {
        self.fast_fail = fast_fail;
        self
    }

    pub fn with_runner(mut self, runner: TaskRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn images(&self) -> &ImagesContainer {
        &self.images
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn source_dir(&self, image: &Image) -> PathBuf {
        self.layout.srcdir.join(image.id())
    }

    pub fn logfile(&self, image: &Image) -> PathBuf {
        self.layout
            .logdir
            .join(format!("{}-{}.log", image.name(), image.version()))
    }

    /// Local tags of `image` prefixed with every repo base.
    pub fn repo_tags(&self, image: &Image) -> Vec<String> {
        let local = image.tags(&self.release);
        self.repos
            .iter()
            .flat_map(|repo| repo.tags(&local))
            .collect()
    }

    /// Render every image template into its source directory.
    ///
    /// Stale contents of a source directory are removed first.
    pub fn generate_sources(&self) -> Result<(), RenderError> {
        tracing::info!(images = self.images.len(), "generating sources");
        for image in &self.images {
            let dir = self.source_dir(image);
            if dir.exists() {
                std::fs::remove_dir_all(&dir).map_err(|e| RenderError::Cleanup {
                    path: dir.clone(),
                    source: e,
                })?;
            }
            self.renderer.render(image.template(), &dir)?;
        }
        Ok(())
    }

    /// One build task per image, tagged with local and repo tags.
    pub fn build(&self) -> TaskRun<'_, Image, DockerError> {
        tracing::info!(images = self.images.len(), "building images");
        let tasks = self
            .images
            .iter()
            .map(|image| Task::new(image.clone(), self.build_image(image)));
        self.runner.run(tasks, self.fast_fail)
    }

    /// One push task per repo tag, nested repo, then image, then tag.
    pub fn push(&self) -> TaskRun<'_, String, DockerError> {
        let mut tasks = Vec::new();
        for repo in &self.repos {
            for image in &self.images {
                for tag in repo.tags(&image.tags(&self.release)) {
                    tasks.push(Task::new(tag.clone(), self.push_tag(image, tag)));
                }
            }
        }
        tracing::info!(tags = tasks.len(), "pushing images");
        self.runner.run(tasks, self.fast_fail)
    }

    async fn build_image(&self, image: &Image) -> Result<(), DockerError> {
        let mut tags = image.tags(&self.release);
        tags.extend(self.repo_tags(image));
        self.client(image)
            .build(&self.source_dir(image), &tags, &self.env_info)
            .await
    }

    async fn push_tag(&self, image: &Image, tag: String) -> Result<(), DockerError> {
        self.client(image).push(&tag).await
    }

    fn client(&self, image: &Image) -> DockerClient<LoggingExecutor<&E>> {
        DockerClient::with_executor(LoggingExecutor::new(&self.executor, self.logfile(image)))
            .with_program(self.program.clone())
    }
}
