//! EPA regions - US states/territories mapped to EPA administrative regions
//!
//! Provides the static region table, code lookups, and region geometry
//! dissolved from Natural Earth shapefiles, plus conversion to a region
//! mask for raster masking.

pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod lookup;
pub mod mask;
pub mod models;
pub mod naturalearth;

pub use collection::{dissolve, get, GetOptions, RegionCollection, RegionGeometry};
pub use config::Settings;
pub use error::{Error, Result};
pub use lookup::{look_up, LookupRow};
pub use mask::{to_regionmask, MaskRegion, RegionMaskSet};
pub use models::{NeVersion, Region, Resolution, REGIONS};
