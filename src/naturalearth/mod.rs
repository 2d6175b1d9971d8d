//! Natural Earth admin-1 states/provinces source.
//!
//! Archives are downloaded from the public AWS S3 bucket and cached
//! locally; the shapefile inside is read with the `shapefile` crate.

mod fetch;
pub(crate) mod load;

pub use fetch::{archive_stem, fetch, source_url, version_dir};
pub use load::{load, ConstituentFeature};
