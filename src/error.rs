//! Error type shared by the configuration loader, the record store and the
//! collaborator interfaces. The scorer itself never fails.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// File system errors, tagged with the path that was touched.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration values that parse but make no sense together.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to (de)serialize records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record '{id}' already exists in collection '{collection}'")]
    DuplicateRecord { collection: String, id: String },

    #[error("Record '{id}' not found in collection '{collection}'")]
    RecordNotFound { collection: String, id: String },

    /// A remote collaborator (generation or repository API) could not be
    /// reached or refused the request.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
