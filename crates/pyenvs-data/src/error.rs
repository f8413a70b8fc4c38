use std::path::PathBuf;

use pyenvs_docker::DockerError;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error(transparent)]
    Docker(#[from] DockerError),

    #[error("introspection output of {tag} is not valid JSON")]
    Introspection {
        tag: String,
        source: serde_json::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid image data in {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no data for image '{name}'; available: {}", format_names(known))]
    UnknownImage { name: String, known: Vec<String> },

    #[error("GitHub request to {url} failed")]
    Http { url: String, source: reqwest::Error },

    #[error("failed to extract {path}")]
    Extract {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(", ")
    }
}
