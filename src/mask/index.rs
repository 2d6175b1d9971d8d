//! Spatial index for point-in-region lookups.

use geo::{BoundingRect, Contains, Point, Polygon};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::debug;

use super::MaskRegion;

/// One polygon of a region, indexed by its own envelope
/// (Region 9's islands span the Pacific).
#[derive(Clone)]
struct IndexedPolygon {
    region: Arc<MaskRegion>,
    polygon: Polygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPolygon {
    fn new(region: Arc<MaskRegion>, polygon: Polygon<f64>) -> Option<Self> {
        let rect = polygon.bounding_rect()?;
        Some(Self {
            region,
            polygon,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// R-tree over every polygon of every region
pub struct MaskIndex {
    tree: RTree<IndexedPolygon>,
}

impl MaskIndex {
    pub fn build(regions: &[Arc<MaskRegion>]) -> Self {
        let indexed: Vec<IndexedPolygon> = regions
            .iter()
            .flat_map(|r| {
                r.polygon
                    .0
                    .iter()
                    .filter_map(move |p| IndexedPolygon::new(Arc::clone(r), p.clone()))
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Mask index built with {} polygons", tree.size());

        Self { tree }
    }

    /// Region containing the point, if any. Envelope candidates are
    /// filtered with exact containment.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&Arc<MaskRegion>> {
        let point = Point::new(lon, lat);
        let query_envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .find(|ip| ip.polygon.contains(&point))
            .map(|ip| &ip.region)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
