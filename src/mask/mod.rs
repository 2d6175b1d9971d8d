//! Region-mask representation of the EPA regions.
//!
//! Mirrors what raster-masking tools expect: numbered, named and
//! abbreviated non-overlapping regions, plus point and grid masking
//! backed by an R-tree.

mod index;

use geo::MultiPolygon;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::collection::RegionCollection;
use crate::error::{Error, Result};
use crate::geometry::union_all;

pub use index::MaskIndex;

pub const MASK_NAME: &str = "EPA Regions";
pub const MASK_SOURCE: &str = "Natural Earth (https://www.naturalearthdata.com) / \
    EPA (https://www.epa.gov/aboutepa/regional-and-geographic-offices)";

/// A labeled region
#[derive(Debug, Clone)]
pub struct MaskRegion {
    pub number: u8,
    /// e.g. "Region 8 (CO, MT, ND, SD, UT, WY)"
    pub name: String,
    /// e.g. "R8"
    pub abbrev: String,
    pub polygon: MultiPolygon<f64>,
}

/// Set of labeled regions ready for masking
pub struct RegionMaskSet {
    pub name: &'static str,
    pub source: &'static str,
    pub overlap: bool,
    regions: Vec<Arc<MaskRegion>>,
    index: MaskIndex,
}

impl RegionMaskSet {
    pub fn regions(&self) -> &[Arc<MaskRegion>] {
        &self.regions
    }

    pub fn numbers(&self) -> Vec<u8> {
        self.regions.iter().map(|r| r.number).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region number containing a lon/lat point
    pub fn mask_point(&self, lon: f64, lat: f64) -> Option<u8> {
        self.index.lookup(lon, lat).map(|r| r.number)
    }

    /// Rasterize onto a lon/lat grid: one row per latitude,
    /// one column per longitude.
    pub fn mask_grid(&self, lons: &[f64], lats: &[f64]) -> Vec<Vec<Option<u8>>> {
        lats.iter()
            .map(|&lat| lons.iter().map(|&lon| self.mask_point(lon, lat)).collect())
            .collect()
    }
}

/// Convert regions from [`crate::get`] into a mask set.
///
/// Entries sharing a region number are merged so the output has one
/// labeled region per distinct number.
pub fn to_regionmask(collection: &RegionCollection) -> Result<RegionMaskSet> {
    if collection.regions.is_empty() {
        return Err(Error::EmptyInput("no regions to convert"));
    }

    let mut by_number: BTreeMap<u8, (Vec<&str>, Vec<MultiPolygon<f64>>)> = BTreeMap::new();
    for r in &collection.regions {
        let entry = by_number.entry(r.number).or_default();
        entry.0.extend(r.constituents.iter().map(String::as_str));
        entry.1.push(r.geometry.clone());
    }

    let regions: Vec<Arc<MaskRegion>> = by_number
        .into_iter()
        .map(|(number, (codes, parts))| {
            Arc::new(MaskRegion {
                number,
                name: format!("Region {} ({})", number, codes.join(", ")),
                abbrev: format!("R{}", number),
                polygon: union_all(parts),
            })
        })
        .collect();

    let index = MaskIndex::build(&regions);
    info!(
        "Mask set with {} regions ({} indexed polygons)",
        regions.len(),
        index.len()
    );

    Ok(RegionMaskSet {
        name: MASK_NAME,
        source: MASK_SOURCE,
        overlap: false,
        regions,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::RegionGeometry;
    use crate::geometry::tests::square;
    use crate::models::{NeVersion, Resolution};

    fn region(number: u8, codes: &[&str], geometry: MultiPolygon<f64>) -> RegionGeometry {
        RegionGeometry {
            number,
            label: format!("R{}", number),
            office: "Test",
            constituents: codes.iter().map(|c| c.to_string()).collect(),
            constituent_names: Vec::new(),
            geometry,
        }
    }

    fn collection(regions: Vec<RegionGeometry>) -> RegionCollection {
        RegionCollection {
            resolution: Resolution::Coarse,
            version: NeVersion::default(),
            regions,
        }
    }

    #[test]
    fn test_labels() {
        let set = to_regionmask(&collection(vec![
            region(8, &["CO", "UT"], square(0.0, 0.0, 1.0)),
            region(9, &["CA"], square(5.0, 0.0, 1.0)),
        ]))
        .unwrap();

        assert_eq!(set.name, "EPA Regions");
        assert!(!set.overlap);
        assert_eq!(set.len(), 2);
        assert_eq!(set.regions()[0].name, "Region 8 (CO, UT)");
        assert_eq!(set.regions()[0].abbrev, "R8");
    }

    #[test]
    fn test_one_label_per_distinct_number() {
        let set = to_regionmask(&collection(vec![
            region(1, &["MA"], square(0.0, 0.0, 1.0)),
            region(2, &["NY"], square(3.0, 0.0, 1.0)),
            region(1, &["VT"], square(0.0, 1.0, 1.0)),
        ]))
        .unwrap();

        assert_eq!(set.numbers(), vec![1, 2]);
        assert_eq!(set.regions()[0].name, "Region 1 (MA, VT)");
    }

    #[test]
    fn test_empty_input() {
        let err = to_regionmask(&collection(vec![])).err().unwrap();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_mask_point_and_grid() {
        let set = to_regionmask(&collection(vec![
            region(4, &["GA"], square(0.0, 0.0, 2.0)),
            region(6, &["TX"], square(10.0, 0.0, 2.0)),
        ]))
        .unwrap();

        assert_eq!(set.mask_point(1.0, 1.0), Some(4));
        assert_eq!(set.mask_point(11.0, 0.5), Some(6));
        assert_eq!(set.mask_point(5.0, 1.0), None);

        let grid = set.mask_grid(&[1.0, 5.0, 11.0], &[0.5, 1.5, 3.0]);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![Some(4), None, Some(6)]);
        assert_eq!(grid[2], vec![None, None, None]);
    }
}
