//! Polygon helpers shared by loading, dissolving and export.

use geo::orient::{Direction, Orient};
use geo::{BooleanOps, Coord, MultiPolygon, Polygon};
use shapefile::{Point, PolygonRing};

/// Union a set of multi-polygons into one (dissolve)
pub fn union_all<I>(parts: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = MultiPolygon<f64>>,
{
    let mut parts = parts.into_iter();
    let first = match parts.next() {
        Some(p) => p,
        None => return MultiPolygon::new(vec![]),
    };
    parts.fold(first, |acc, next| acc.union(&next))
}

/// Convert a shapefile record shape into a geo multi-polygon.
/// Non-areal shapes yield `None`.
pub fn shape_to_multipolygon(shape: shapefile::Shape) -> Option<MultiPolygon<f64>> {
    match shape {
        shapefile::Shape::Polygon(p) => Some(MultiPolygon::from(p)),
        shapefile::Shape::PolygonM(p) => Some(MultiPolygon::from(p)),
        shapefile::Shape::PolygonZ(p) => Some(MultiPolygon::from(p)),
        _ => None,
    }
}

/// Convert a geo multi-polygon into a shapefile polygon.
///
/// Shapefile rings are clockwise for exteriors and counter-clockwise
/// for holes, the reverse of the geo convention.
pub fn multipolygon_to_shape(geometry: &MultiPolygon<f64>) -> shapefile::Polygon {
    let oriented = geometry.orient(Direction::Reversed);
    let mut rings = Vec::new();

    for polygon in &oriented.0 {
        rings.push(PolygonRing::Outer(ring_points(polygon.exterior().0.iter())));
        for hole in polygon.interiors() {
            rings.push(PolygonRing::Inner(ring_points(hole.0.iter())));
        }
    }

    shapefile::Polygon::with_rings(rings)
}

fn ring_points<'a>(coords: impl Iterator<Item = &'a Coord<f64>>) -> Vec<Point> {
    coords.map(|c| Point::new(c.x, c.y)).collect()
}

/// Exterior/interior rings as GeoJSON-style coordinate arrays
pub fn polygon_coordinates(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.0.iter().map(|c| [c.x, c.y]).collect())
        .collect()
}
