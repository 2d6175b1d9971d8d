//! Error type shared by the library.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// State/territory code not present in the region table
    #[error("unknown state/territory code: {0:?}")]
    KeyNotFound(String),

    #[error("resolution must be one of: {allowed}. Got {got:?}.")]
    UnsupportedResolution { got: String, allowed: String },

    #[error("version must be one of: {allowed}. Got {got:?}.")]
    UnsupportedVersion { got: String, allowed: String },

    /// Remote source unreachable and nothing usable in the cache
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Source data disagrees with the region table (e.g. iso_a2 mismatch)
    #[error("inconsistent source data: {0}")]
    InconsistentSource(String),

    #[error("invalid region table: {0}")]
    InvalidTable(String),

    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn download(url: &str, reason: impl std::fmt::Display) -> Self {
        Error::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
