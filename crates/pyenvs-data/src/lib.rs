//! Environment data of the published images.
//!
//! - [`generate`]: run the introspection module inside each image and store
//!   its output as `<outdir>/<image id>.json`
//! - [`cache`]: explicitly loaded, read-only view over a data directory
//! - [`github`]: locate and download the `image-data` artifact of a CI run
//! - [`archive`]: unpack a downloaded artifact into a data directory

pub mod archive;
pub mod cache;
pub mod error;
pub mod generate;
pub mod github;

pub use archive::{FETCH_WORKDIR, extract_image_data, fetch_workdir};
pub use cache::{ImageData, ImageDataCache};
pub use error::DataError;
pub use generate::{data_file, generate_image_data, list_files};
pub use github::{Artifact, GithubClient};
