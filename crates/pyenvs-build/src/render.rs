use std::path::{Path, PathBuf};

use minijinja::Environment;
use pyenvs_core::Template;
use walkdir::WalkDir;

/// Suffix of files rendered through the template engine.
const TEMPLATE_SUFFIX: &str = "jinja";

/// Renders template directories into build contexts.
///
/// A template is the directory `<templates_dir>/<name>`. Rendering copies
/// it recursively: `*.jinja` files are rendered with the template data and
/// written without the suffix, everything else is copied verbatim.
pub struct TemplateRenderer {
    templates_dir: PathBuf,
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_keep_trailing_newline(true);
        Self {
            templates_dir: templates_dir.into(),
            env,
        }
    }

    pub fn template_path(&self, template: &Template) -> PathBuf {
        self.templates_dir.join(template.name())
    }

    /// Render `template` into `out_dir`, creating it if needed.
    pub fn render(&self, template: &Template, out_dir: &Path) -> Result<(), RenderError> {
        let root = self.template_path(template);
        if !root.is_dir() {
            return Err(RenderError::TemplateNotFound(root));
        }

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| RenderError::Walk {
                path: root.clone(),
                source: e,
            })?;
            let relative = entry
                .path()
                .strip_prefix(&root)
                .map_err(|_| RenderError::OutsideRoot {
                    path: entry.path().to_path_buf(),
                    root: root.clone(),
                })?;
            let target = out_dir.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target).map_err(|e| RenderError::CreateDir {
                    path: target.clone(),
                    source: e,
                })?;
            } else if is_template(entry.path()) {
                self.render_file(template, entry.path(), &target.with_extension(""))?;
            } else {
                std::fs::copy(entry.path(), &target).map_err(|e| RenderError::Copy {
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;
            }
        }

        tracing::debug!(
            template = template.name(),
            out = %out_dir.display(),
            "template rendered"
        );
        Ok(())
    }

    fn render_file(&self, template: &Template, src: &Path, dst: &Path) -> Result<(), RenderError> {
        let source = std::fs::read_to_string(src).map_err(|e| RenderError::Read {
            path: src.to_path_buf(),
            source: e,
        })?;
        let rendered = self
            .env
            .render_str(&source, template.data())
            .map_err(|e| RenderError::Render {
                path: src.to_path_buf(),
                source: e,
            })?;
        std::fs::write(dst, rendered).map_err(|e| RenderError::Write {
            path: dst.to_path_buf(),
            source: e,
        })
    }
}

fn is_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TEMPLATE_SUFFIX)
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template directory not found: {0}")]
    TemplateNotFound(PathBuf),
    #[error("failed to walk template directory {path}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{path} is outside of template directory {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("failed to read template file {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to render {path}")]
    Render {
        path: PathBuf,
        source: minijinja::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy {path}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to clean up source directory {path}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}
