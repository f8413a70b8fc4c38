use std::path::{Path, PathBuf};

use pyenvs_core::{Image, ImagesContainer};
use pyenvs_docker::{DockerClient, DockerExecutor};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::DataError;

/// On-disk layout of one image data file, fields in key order.
#[derive(Debug, Serialize)]
struct DataFile<'a> {
    data: serde_json::Value,
    metadata: Metadata<'a>,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    manifest: &'a str,
}

/// Path of the data file of `image` inside `outdir`.
pub fn data_file(outdir: &Path, image: &Image) -> PathBuf {
    outdir.join(format!("{}.json", image.id()))
}

/// Space-separated data file names, as printed by `generate-data --list-files`.
pub fn list_files(images: &ImagesContainer) -> String {
    images
        .iter()
        .map(|image| format!("{}.json", image.id()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Introspect the environment of `tag` and write the result to `out`.
///
/// `source_dir` is the repository root holding the introspection module.
/// The file is written as 4-space indented JSON with sorted keys, next to
/// the id of the image it was gathered from.
pub async fn generate_image_data<E: DockerExecutor>(
    client: &DockerClient<E>,
    tag: &str,
    source_dir: &Path,
    out: &Path,
) -> Result<(), DataError> {
    let raw = client.run_python_introspection(tag, source_dir).await?;
    let data: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| DataError::Introspection {
            tag: tag.to_owned(),
            source: e,
        })?;
    let manifest = client.image_id(tag).await?;

    let file = DataFile {
        data,
        metadata: Metadata {
            manifest: &manifest,
        },
    };
    let json = to_json(&file).map_err(|e| DataError::Parse {
        path: out.to_path_buf(),
        source: e,
    })?;

    let write_err = |e| DataError::Write {
        path: out.to_path_buf(),
        source: e,
    };
    if let Some(parent) = out.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(out, json).await.map_err(write_err)?;

    tracing::debug!(tag, out = %out.display(), "image data written");
    Ok(())
}

fn to_json(value: &impl Serialize) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
