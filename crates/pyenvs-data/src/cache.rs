use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::DataError;

const DATA_SUFFIX: &str = ".json";

#[derive(Debug, Clone, Deserialize)]
struct DataFile {
    metadata: Metadata,
    data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Metadata {
    manifest: String,
}

/// Environment description of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Image id, including the version (eg. `debian:12`)
    pub image: String,
    /// Id of the image the data was gathered from
    pub manifest: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ImageData {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// Image data read from a data directory.
///
/// Nothing is read lazily; [`load`](Self::load) parses every file up front
/// and the cache never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct ImageDataCache {
    entries: BTreeMap<String, DataFile>,
}

impl ImageDataCache {
    /// Read every `<image id>.json` file directly inside `dir`.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        let read_err = |e| DataError::Read {
            path: dir.to_path_buf(),
            source: e,
        };

        let mut entries = BTreeMap::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(DATA_SUFFIX))
            else {
                continue;
            };

            let content = std::fs::read_to_string(&path).map_err(|e| DataError::Read {
                path: path.clone(),
                source: e,
            })?;
            let file: DataFile = serde_json::from_str(&content).map_err(|e| DataError::Parse {
                path: path.clone(),
                source: e,
            })?;
            entries.insert(name.to_owned(), file);
        }

        tracing::debug!(dir = %dir.display(), images = entries.len(), "image data loaded");
        Ok(Self { entries })
    }

    /// Data of the image with id `name`.
    pub fn get(&self, name: &str) -> Result<ImageData, DataError> {
        let file = self
            .entries
            .get(name)
            .ok_or_else(|| DataError::UnknownImage {
                name: name.to_owned(),
                known: self.names().map(str::to_owned).collect(),
            })?;
        Ok(ImageData {
            image: name.to_owned(),
            manifest: file.metadata.manifest.clone(),
            data: file.data.clone(),
        })
    }

    /// Image ids with data, in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
