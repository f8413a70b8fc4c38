use std::path::Path;

use serde::Deserialize;

use crate::image::{Image, ImagesContainer};
use crate::repo::Repo;
use crate::template::{TemplateData, TemplateSpec};

/// environments.toml configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub repos: Vec<Repo>,
    pub images: ImagesContainer,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    repos: Vec<RepoEntry>,
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct RepoEntry {
    base: String,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    name: String,
    version: VersionEntry,
    template: TemplateEntry,
}

/// `version = "12"` or `version = { type = "...", ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionEntry {
    Literal(String),
    Tagged(TaggedVersion),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedVersion {
    Static { value: String },
    Rolling,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    name: String,
    #[serde(default)]
    data: TemplateData,
}

impl Config {
    /// Load and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::ConfigLoad`] if the file cannot be read
    /// - [`crate::Error::ConfigParse`] if it is not a valid configuration
    /// - [`crate::Error::InvalidRepoBase`] if a repo base ends with `/`
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Parse configuration text; `path` is only used for error reporting.
    pub fn parse(content: &str, path: &Path) -> crate::Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| crate::Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        let repos = file
            .repos
            .into_iter()
            .map(|entry| Repo::new(entry.base))
            .collect::<crate::Result<Vec<_>>>()?;

        let images = ImagesContainer::new(file.images.into_iter().map(build_image));

        tracing::debug!(
            path = %path.display(),
            repos = repos.len(),
            images = images.len(),
            "configuration loaded"
        );

        Ok(Self { repos, images })
    }
}

fn build_image(entry: ImageEntry) -> Image {
    let template = TemplateSpec::new(entry.template.name, entry.template.data);
    match entry.version {
        VersionEntry::Literal(value) | VersionEntry::Tagged(TaggedVersion::Static { value }) => {
            Image::new_static(entry.name, value, template)
        }
        VersionEntry::Tagged(TaggedVersion::Rolling) => Image::rolling(entry.name, template),
    }
}
