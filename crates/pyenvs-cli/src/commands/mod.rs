mod build;
mod fetch_data;
mod generate_data;
mod image_list;
mod show_data;

use std::fmt::Display;
use std::path::{Path, PathBuf};

use pyenvs_build::TaskErrors;
use pyenvs_core::Config;

pub use build::{BuildArgs, build};
pub use fetch_data::fetch_data;
pub use generate_data::generate_data;
pub use image_list::image_list;
pub use show_data::show_data;

/// Repository paths shared by every command.
pub struct Context {
    root: PathBuf,
    config: Option<PathBuf>,
}

impl Context {
    pub fn new(root: PathBuf, config: Option<PathBuf>) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => self.root.join("environments.toml"),
        }
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = Config::load(&self.config_path())?;
        tracing::debug!(
            repos = config.repos.len(),
            images = config.images.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// `explicit`, or `<root>/containers/out`.
    pub fn build_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        match explicit {
            Some(path) => path,
            None => self.root.join("containers").join("out"),
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("containers").join("templates")
    }

    /// Location of the image data files: `explicit`, or `<root>/python/.data`.
    pub fn datadir(&self, explicit: Option<PathBuf>) -> PathBuf {
        match explicit {
            Some(path) => path,
            None => self.root.join("python").join(".data"),
        }
    }
}

/// Turn the errors of a task run into one report listing each failure.
pub(crate) fn failures<E: Display>(action: &str, errors: TaskErrors<E>) -> anyhow::Error {
    let details = errors
        .errors()
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::anyhow!("failed to {action} ({} error(s)):\n{details}", errors.len())
}
