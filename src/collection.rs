//! EPA regions as dissolved Natural Earth geometry.

use geo::MultiPolygon;
use hashbrown::HashSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::Result;
use crate::geometry::union_all;
use crate::models::region::{region_for, territory_codes, REGIONS};
use crate::models::{NeVersion, Resolution};
use crate::naturalearth::{self, ConstituentFeature};

/// Options for [`get`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    pub resolution: Resolution,
    pub version: NeVersion,
    /// States (and DC) only. Only has an effect at the 10m resolution,
    /// the coarser ones carry no territories anyway.
    pub states_only: bool,
}

/// A single region with its dissolved polygon
#[derive(Debug, Clone, Serialize)]
pub struct RegionGeometry {
    pub number: u8,
    /// e.g. "R8"
    pub label: String,
    pub office: &'static str,
    /// Codes present in the source, in source order
    pub constituents: Vec<String>,
    pub constituent_names: Vec<String>,
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

/// Regions sorted by number, with the source they came from
#[derive(Debug, Clone)]
pub struct RegionCollection {
    pub resolution: Resolution,
    pub version: NeVersion,
    pub regions: Vec<RegionGeometry>,
}

impl RegionCollection {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn numbers(&self) -> Vec<u8> {
        self.regions.iter().map(|r| r.number).collect()
    }

    pub fn region(&self, number: u8) -> Option<&RegionGeometry> {
        self.regions.iter().find(|r| r.number == number)
    }
}

/// Load EPA regions from the Natural Earth states/provinces shapefile,
/// downloading and caching it as needed.
pub async fn get(settings: &Settings, options: GetOptions) -> Result<RegionCollection> {
    let shp = naturalearth::fetch(settings, options.version, options.resolution).await?;
    let features = naturalearth::load(&shp, options.states_only)?;
    let regions = dissolve(features, options.states_only);

    info!(
        "Built {} regions from Natural Earth {} ({})",
        regions.len(),
        options.version,
        options.resolution
    );

    Ok(RegionCollection {
        resolution: options.resolution,
        version: options.version,
        regions,
    })
}

/// Join features to regions by code and union the polygons of each region.
///
/// Regions without any feature in the input are left out. Features whose
/// code is not in the table are dropped.
pub fn dissolve(features: Vec<ConstituentFeature>, states_only: bool) -> Vec<RegionGeometry> {
    // Sets borrow `features`, drop them before the move below
    {
        let available: HashSet<&str> = features.iter().map(|f| f.code.as_str()).collect();
        let territories: HashSet<&str> = territory_codes().collect();

        for r in &REGIONS {
            let missing: Vec<&str> = r
                .constituents
                .iter()
                .copied()
                .filter(|c| !available.contains(c))
                .filter(|c| !(states_only && territories.contains(c)))
                .collect();
            if !missing.is_empty() {
                info!(
                    "{} has unavailable states/territories: {:?}",
                    r.label(),
                    missing
                );
            }
        }
    }

    let mut grouped: Vec<Vec<ConstituentFeature>> = vec![Vec::new(); REGIONS.len()];
    for feature in features {
        match region_for(&feature.code) {
            Some(r) => grouped[usize::from(r.number) - 1].push(feature),
            None => debug!("{} ({}) is not in any region", feature.code, feature.name),
        }
    }

    REGIONS
        .iter()
        .zip(grouped)
        .filter(|(_, members)| !members.is_empty())
        .map(|(r, members)| {
            let mut constituents = Vec::with_capacity(members.len());
            let mut constituent_names = Vec::with_capacity(members.len());
            let mut parts = Vec::with_capacity(members.len());
            for m in members {
                constituents.push(m.code);
                constituent_names.push(m.name);
                parts.push(m.geometry);
            }

            RegionGeometry {
                number: r.number,
                label: r.label(),
                office: r.office,
                constituents,
                constituent_names,
                geometry: union_all(parts),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::square;
    use crate::models::region::territory_admin_name;
    use crate::models::Region;
    use crate::naturalearth::load::tests::{row, write_fixture};
    use crate::naturalearth::load::US_ADMIN;
    use crate::naturalearth::{archive_stem, version_dir};
    use std::fs::{self, File};
    use std::io;
    use zip::write::SimpleFileOptions;

    /// One unit square per constituent, laid out on a grid
    fn all_constituents() -> Vec<ConstituentFeature> {
        REGIONS
            .iter()
            .flat_map(|r| {
                r.constituents.iter().enumerate().map(move |(i, code)| ConstituentFeature {
                    code: code.to_string(),
                    name: format!("{} name", code),
                    geometry: square(i as f64, f64::from(r.number) * 2.0, 1.0),
                })
            })
            .collect()
    }

    #[test]
    fn test_dissolve_all_regions() {
        let regions = dissolve(all_constituents(), false);
        assert_eq!(regions.len(), 10);

        let numbers: Vec<u8> = regions.iter().map(|r| r.number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<u8>>());

        for r in &regions {
            let expected = Region::by_number(r.number).unwrap();
            assert_eq!(r.office, expected.office);
            assert_eq!(r.constituents.len(), expected.constituents.len());
            // Adjacent squares in a row merge into a single polygon
            assert_eq!(r.geometry.0.len(), 1, "{}", r.label);
        }
    }

    #[test]
    fn test_dissolve_is_repeatable() {
        let a = dissolve(all_constituents(), false);
        let b = dissolve(all_constituents(), false);
        assert_eq!(a.len(), b.len());
        let na: Vec<u8> = a.iter().map(|r| r.number).collect();
        let nb: Vec<u8> = b.iter().map(|r| r.number).collect();
        assert_eq!(na, nb);
    }

    #[test]
    fn test_dissolve_drops_empty_regions_and_unknown_codes() {
        let features = vec![
            ConstituentFeature {
                code: "CO".to_string(),
                name: "Colorado".to_string(),
                geometry: square(0.0, 0.0, 1.0),
            },
            ConstituentFeature {
                code: "BC".to_string(),
                name: "British Columbia".to_string(),
                geometry: square(0.0, 5.0, 1.0),
            },
        ];
        let regions = dissolve(features, true);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].label, "R8");
        assert_eq!(regions[0].constituents, vec!["CO"]);
        assert_eq!(regions[0].constituent_names, vec!["Colorado"]);
    }

    #[test]
    fn test_collection_accessors() {
        let collection = RegionCollection {
            resolution: Resolution::Coarse,
            version: NeVersion::default(),
            regions: dissolve(all_constituents(), false),
        };
        assert_eq!(collection.len(), 10);
        assert_eq!(collection.region(9).unwrap().office, "San Francisco");
        assert!(collection.region(11).is_none());
    }

    /// Cache a fixture archive holding every constituent so `get` runs offline
    fn seed_cache(settings: &Settings, options: GetOptions) {
        let rows: Vec<_> = REGIONS
            .iter()
            .flat_map(|r| r.constituents.iter())
            .enumerate()
            .map(|(i, &code)| match territory_admin_name(code) {
                Some(admin) => row(admin, "", code, admin, i as f64),
                None => row(US_ADMIN, code, "US", code, i as f64),
            })
            .collect();

        let stem = archive_stem(options.resolution);
        let staging = tempfile::tempdir().unwrap();
        write_fixture(&staging.path().join(format!("{}.shp", stem)), &rows);

        let dir = version_dir(settings, options.version);
        fs::create_dir_all(&dir).unwrap();
        let archive = File::create(dir.join(format!("{}.zip", stem))).unwrap();
        let mut zip = zip::ZipWriter::new(archive);
        for ext in ["shp", "shx", "dbf"] {
            let name = format!("{}.{}", stem, ext);
            let mut part = File::open(staging.path().join(&name)).unwrap();
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .unwrap();
            io::copy(&mut part, &mut zip).unwrap();
        }
        zip.finish().unwrap();
    }

    #[tokio::test]
    async fn test_get_from_cache_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            cache_dir: tmp.path().to_path_buf(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        };
        let options = GetOptions {
            resolution: Resolution::Coarse,
            ..GetOptions::default()
        };
        seed_cache(&settings, options);

        let first = get(&settings, options).await.unwrap();
        let second = get(&settings, options).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.numbers(), second.numbers());
        assert_eq!(
            first.region(2).unwrap().constituents,
            vec!["NJ", "NY", "PR", "VI"]
        );
    }

    #[tokio::test]
    async fn test_get_states_only() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            cache_dir: tmp.path().to_path_buf(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        };
        let options = GetOptions {
            resolution: Resolution::Fine,
            states_only: true,
            ..GetOptions::default()
        };
        seed_cache(&settings, options);

        let regions = get(&settings, options).await.unwrap();
        assert_eq!(regions.len(), 10);
        assert_eq!(
            regions.region(9).unwrap().constituents,
            vec!["AZ", "CA", "HI", "NV"]
        );
    }
}
