//! Download and cache Natural Earth shapefile archives.

use reqwest::Client;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{NeVersion, Resolution};

const CATEGORY: &str = "cultural";
const LAYER: &str = "admin_1_states_provinces_lakes";

/// Archive/shapefile stem, e.g. "ne_50m_admin_1_states_provinces_lakes"
pub fn archive_stem(resolution: Resolution) -> String {
    format!("ne_{}_{}", resolution, LAYER)
}

/// Public URL of the zipped shapefile
pub fn source_url(base_url: &str, version: NeVersion, resolution: Resolution) -> String {
    format!(
        "{}/{}/{}_{}/{}.zip",
        base_url.trim_end_matches('/'),
        version.aws_version(),
        resolution,
        CATEGORY,
        archive_stem(resolution)
    )
}

/// Cache directory for one Natural Earth release
pub fn version_dir(settings: &Settings, version: NeVersion) -> PathBuf {
    settings
        .cache_dir
        .join("natural_earth")
        .join(version.as_str())
}

/// Retrieve the states/provinces shapefile locally, downloading the
/// archive if it is not cached yet. Returns the path of the `.shp` file.
pub async fn fetch(
    settings: &Settings,
    version: NeVersion,
    resolution: Resolution,
) -> Result<PathBuf> {
    let stem = archive_stem(resolution);
    let dir = version_dir(settings, version);
    let zip_path = dir.join(format!("{}.zip", stem));
    let extract_dir = dir.join(&stem);

    if zip_path.exists() {
        debug!("Using cached archive {}", zip_path.display());
    } else {
        let url = source_url(&settings.base_url, version, resolution);
        fs::create_dir_all(&dir)?;
        download(settings, &url, &zip_path).await?;
    }

    if let Some(shp) = find_shp(&extract_dir)? {
        return Ok(shp);
    }

    info!("Extracting {} ...", zip_path.display());
    let mut archive = zip::ZipArchive::new(File::open(&zip_path)?)?;
    archive.extract(&extract_dir)?;

    find_shp(&extract_dir)?.ok_or_else(|| {
        Error::InconsistentSource(format!("no .shp file in {}", zip_path.display()))
    })
}

async fn download(settings: &Settings, url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {} ...", url);

    let client = Client::builder()
        .user_agent(concat!("epa-regions/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| Error::download(url, e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::download(url, e))?;

    if !response.status().is_success() {
        return Err(Error::download(url, format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| Error::download(url, e))?;

    // Partial downloads never land at the cached path
    let partial = dest.with_extension("zip.part");
    fs::write(&partial, &bytes)?;
    fs::rename(&partial, dest)?;

    info!("Saved {} bytes to {}", bytes.len(), dest.display());
    Ok(())
}

fn find_shp(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut found: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |e| e == "shp"))
        .collect();

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        n => Err(Error::InconsistentSource(format!(
            "expected one .shp file in {}, found {}",
            dir.display(),
            n
        ))),
    }
}
