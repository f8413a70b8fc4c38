use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::DataError;

/// Scratch directory used while fetching, relative to the data directory.
pub const FETCH_WORKDIR: &str = ".fetch-data";
/// Name of the data archive nested inside the CI artifact.
const INNER_ARCHIVE: &str = "image-data.zip";

pub fn fetch_workdir(outdir: &Path) -> PathBuf {
    outdir.join(FETCH_WORKDIR)
}

/// Unpack a downloaded `image-data` artifact into `outdir`.
///
/// The artifact is a zip holding `image-data.zip`, whose contents are the
/// data files. The scratch directory [`fetch_workdir`] is removed
/// afterwards, including `archive` when it was placed there.
pub fn extract_image_data(archive: &Path, outdir: &Path) -> Result<(), DataError> {
    let scratch = fetch_workdir(outdir).join("data");
    std::fs::create_dir_all(&scratch).map_err(|e| DataError::Write {
        path: scratch.clone(),
        source: e,
    })?;

    unzip(archive, &scratch)?;
    unzip(&scratch.join(INNER_ARCHIVE), outdir)?;

    let workdir = fetch_workdir(outdir);
    std::fs::remove_dir_all(&workdir).map_err(|e| DataError::Write {
        path: workdir,
        source: e,
    })?;
    tracing::debug!(outdir = %outdir.display(), "image data extracted");
    Ok(())
}

fn unzip(archive: &Path, dest: &Path) -> Result<(), DataError> {
    let file = File::open(archive).map_err(|e| DataError::Read {
        path: archive.to_path_buf(),
        source: e,
    })?;
    let extract_err = |e| DataError::Extract {
        path: archive.to_path_buf(),
        source: e,
    };
    zip::ZipArchive::new(file)
        .map_err(extract_err)?
        .extract(dest)
        .map_err(extract_err)
}
