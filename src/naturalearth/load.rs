//! Read US states and territories out of the Natural Earth admin-1 shapefile.

use geo::MultiPolygon;
use shapefile::dbase::{FieldValue, Record};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::{shape_to_multipolygon, union_all};
use crate::models::region::territory_code;

pub(crate) const US_ADMIN: &str = "United States of America";

/// One state or territory polygon with its postal code
#[derive(Debug, Clone)]
pub struct ConstituentFeature {
    /// 2-letter code, e.g. "CO"
    pub code: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Load states (and DC) and, unless `states_only`, the territories
/// listed in the region table.
///
/// Territories are spread over several admin-1 records (e.g. the
/// islands of Guam's municipalities) and get merged per `admin`.
pub fn load(path: &Path, states_only: bool) -> Result<Vec<ConstituentFeature>> {
    info!("Reading {}", path.display());

    let mut reader = shapefile::Reader::from_path(path)?;

    let mut features = Vec::new();
    let mut territories: BTreeMap<String, TerritoryParts> = BTreeMap::new();
    let mut skipped = 0usize;

    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item?;

        if field(&record, "admin").is_none() {
            return Err(Error::InconsistentSource(
                "attribute table has no admin column".to_string(),
            ));
        }
        let admin = match text_field(&record, "admin") {
            Some(a) => a,
            None => continue,
        };

        let is_state = admin == US_ADMIN;
        let is_territory = !states_only && territory_code(&admin).is_some();
        if !is_state && !is_territory {
            continue;
        }

        let geometry = match shape_to_multipolygon(shape) {
            Some(g) => g,
            None => {
                skipped += 1;
                continue;
            }
        };

        if is_state {
            if field(&record, "postal").is_none() {
                return Err(Error::InconsistentSource(
                    "attribute table has no postal column".to_string(),
                ));
            }
            let code = match text_field(&record, "postal") {
                Some(c) => c,
                None => {
                    debug!("State record without postal code, skipping");
                    skipped += 1;
                    continue;
                }
            };
            let name = text_field(&record, "name").unwrap_or_else(|| code.clone());
            features.push(ConstituentFeature {
                code,
                name,
                geometry,
            });
        } else {
            let parts = territories.entry(admin).or_default();
            parts.geometries.push(geometry);
            if let Some(iso) = text_field(&record, "iso_a2") {
                if !parts.iso_codes.contains(&iso) {
                    parts.iso_codes.push(iso);
                }
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} records without usable geometry", skipped);
    }

    let states = features.len();
    for (admin, parts) in territories {
        features.push(parts.into_feature(admin)?);
    }

    if states == 0 {
        return Err(Error::InconsistentSource(format!(
            "no {} records in {}",
            US_ADMIN,
            path.display()
        )));
    }

    info!("Loaded {} states/territories", features.len());
    Ok(features)
}

#[derive(Default)]
struct TerritoryParts {
    geometries: Vec<MultiPolygon<f64>>,
    iso_codes: Vec<String>,
}

impl TerritoryParts {
    /// Dissolve the parts and check the ISO code against the region table
    fn into_feature(self, admin: String) -> Result<ConstituentFeature> {
        let code = territory_code(&admin)
            .ok_or_else(|| Error::InconsistentSource(format!("unexpected admin {:?}", admin)))?;

        if self.iso_codes != [code] {
            return Err(Error::InconsistentSource(format!(
                "{} has iso_a2 {:?}, expected {:?}",
                admin, self.iso_codes, code
            )));
        }

        Ok(ConstituentFeature {
            code: code.to_string(),
            name: admin,
            geometry: union_all(self.geometries),
        })
    }
}

/// Column names differ in case between releases
fn field<'a>(record: &'a Record, name: &str) -> Option<&'a FieldValue> {
    let fields: &HashMap<String, FieldValue> = record.as_ref();
    fields
        .iter()
        .find(|(column, _)| column.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Read a non-empty character field
fn text_field(record: &Record, name: &str) -> Option<String> {
    match field(record, name)? {
        FieldValue::Character(Some(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}
