//! Write regions out as a zipped shapefile or GeoJSON.

use serde_json::{json, Value};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;

use crate::collection::RegionCollection;
use crate::error::{Error, Result};
use crate::geometry::{multipolygon_to_shape, polygon_coordinates};

/// Shapefile attribute columns (dBase names are limited to 10 characters)
const COLUMNS: [&str; 4] = ["region", "number", "consts", "office"];

/// File stem, e.g. "epa-regions_ne-v5-1-2_50m"
pub fn archive_stem(collection: &RegionCollection) -> String {
    format!(
        "epa-regions_ne-{}_{}",
        collection.version.as_str().replace('.', "-"),
        collection.resolution
    )
}

/// Write the regions as a shapefile and zip its parts into `out_dir`.
/// Returns the path of the archive.
pub fn write_shapefile_zip(collection: &RegionCollection, out_dir: &Path) -> Result<PathBuf> {
    if collection.is_empty() {
        return Err(Error::EmptyInput("no regions to write"));
    }

    let stem = archive_stem(collection);
    let tmp = tempfile::Builder::new().prefix("epa-regions-").tempdir()?;

    write_shapefile(collection, &tmp.path().join(format!("{}.shp", stem)))?;

    fs::create_dir_all(out_dir)?;
    let zip_path = out_dir.join(format!("{}.zip", stem));
    let mut zip = zip::ZipWriter::new(File::create(&zip_path)?);

    let mut parts: Vec<PathBuf> = fs::read_dir(tmp.path())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.file_stem().map_or(false, |s| s == stem.as_str()))
        .collect();
    parts.sort();

    for part in &parts {
        let name = part
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        zip.start_file(name, SimpleFileOptions::default())?;
        io::copy(&mut File::open(part)?, &mut zip)?;
    }
    zip.finish()?;

    info!("Wrote {} ({} files)", zip_path.display(), parts.len());
    Ok(zip_path)
}

fn write_shapefile(collection: &RegionCollection, path: &Path) -> Result<()> {
    let [region, number, consts, office] = COLUMNS.map(field_name);
    let table = TableWriterBuilder::new()
        .add_character_field(region?, 3)
        .add_numeric_field(number?, 2, 0)
        .add_character_field(consts?, 254)
        .add_character_field(office?, 20);

    let mut writer = shapefile::Writer::from_path(path, table)?;

    for r in &collection.regions {
        let mut record = Record::default();
        record.insert(
            "region".to_string(),
            FieldValue::Character(Some(r.label.clone())),
        );
        record.insert(
            "number".to_string(),
            FieldValue::Numeric(Some(f64::from(r.number))),
        );
        record.insert(
            "consts".to_string(),
            FieldValue::Character(Some(r.constituents.join(","))),
        );
        record.insert(
            "office".to_string(),
            FieldValue::Character(Some(r.office.to_string())),
        );

        writer.write_shape_and_record(&multipolygon_to_shape(&r.geometry), &record)?;
    }

    Ok(())
}

fn field_name(name: &str) -> Result<FieldName> {
    FieldName::try_from(name)
        .map_err(|e| Error::Config(format!("invalid dBase field name {:?}: {:?}", name, e)))
}

/// GeoJSON FeatureCollection with one MultiPolygon feature per region
pub fn to_geojson(collection: &RegionCollection) -> Value {
    let features: Vec<Value> = collection
        .regions
        .iter()
        .map(|r| {
            let coordinates: Vec<_> = r.geometry.0.iter().map(polygon_coordinates).collect();
            json!({
                "type": "Feature",
                "properties": {
                    "epa_region": r.label,
                    "number": r.number,
                    "epa_region_office": r.office,
                    "constituents": r.constituents,
                    "constituent_names": r.constituent_names,
                },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": coordinates,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::RegionGeometry;
    use crate::geometry::tests::square;
    use crate::models::{NeVersion, Resolution};

    fn sample() -> RegionCollection {
        let region = |number: u8, office: &'static str, codes: &[&str], x: f64| RegionGeometry {
            number,
            label: format!("R{}", number),
            office,
            constituents: codes.iter().map(|c| c.to_string()).collect(),
            constituent_names: Vec::new(),
            geometry: square(x, 0.0, 1.0),
        };
        RegionCollection {
            resolution: Resolution::Medium,
            version: NeVersion::V5_1_2,
            regions: vec![
                region(8, "Denver", &["CO", "UT"], 0.0),
                region(10, "Seattle", &["WA"], 3.0),
            ],
        }
    }

    #[test]
    fn test_column_names_fit_dbase() {
        assert!(COLUMNS.iter().all(|c| c.len() <= 10));
    }

    #[test]
    fn test_archive_stem() {
        let stem = archive_stem(&sample());
        assert_eq!(stem, "epa-regions_ne-v5-1-2_50m");
        assert!(!stem.contains('.'));
    }

    #[test]
    fn test_write_shapefile_zip() {
        let out = tempfile::tempdir().unwrap();
        let zip_path = write_shapefile_zip(&sample(), out.path()).unwrap();
        assert_eq!(
            zip_path.file_name().unwrap().to_str().unwrap(),
            "epa-regions_ne-v5-1-2_50m.zip"
        );

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(String::from).collect();
        for ext in ["shp", "shx", "dbf"] {
            let expected = format!("epa-regions_ne-v5-1-2_50m.{}", ext);
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let extracted = tempfile::tempdir().unwrap();
        archive.extract(extracted.path()).unwrap();
        let shp = extracted.path().join("epa-regions_ne-v5-1-2_50m.shp");
        let mut reader = shapefile::Reader::from_path(&shp).unwrap();
        let mut labels = Vec::new();
        for item in reader.iter_shapes_and_records() {
            let (_, record) = item.unwrap();
            if let Some(FieldValue::Character(Some(label))) = record.get("region") {
                labels.push(label.trim().to_string());
            }
        }
        assert_eq!(labels, vec!["R8", "R10"]);
    }

    #[test]
    fn test_write_empty() {
        let out = tempfile::tempdir().unwrap();
        let mut empty = sample();
        empty.regions.clear();
        assert!(matches!(
            write_shapefile_zip(&empty, out.path()),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn test_geojson() {
        let value = to_geojson(&sample());
        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["epa_region"], "R8");
        assert_eq!(features[0]["properties"]["constituents"][1], "UT");
        assert_eq!(features[1]["geometry"]["type"], "MultiPolygon");
        // polygon -> ring -> 5 closed coordinates
        assert_eq!(
            features[1]["geometry"]["coordinates"][0][0]
                .as_array()
                .unwrap()
                .len(),
            5
        );
    }
}
