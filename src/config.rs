//! Settings: cache location and download source, loaded from TOML.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://naturalearth.s3.amazonaws.com";

/// Environment variable that overrides the cache directory
pub const CACHE_DIR_ENV: &str = "EPA_REGIONS_CACHE_DIR";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    /// Root of the download cache; Natural Earth archives land under `natural_earth/`
    pub cache_dir: PathBuf,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Settings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, or the given file, with the environment override applied last
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::load_from_file(p)?,
            None => Self::default(),
        };
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
            settings.cache_dir = PathBuf::from(dir);
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url {:?}: {}", self.base_url, e)))?;
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("epa-regions")
}
