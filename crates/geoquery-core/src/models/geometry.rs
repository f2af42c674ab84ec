//! Canonical geometry types used across all geoquery crates.
//!
//! The enum mirrors GeoJSON geometry objects with coordinate arrays in
//! `[longitude, latitude]` order. Only the three kinds the engine queries
//! over are representable; multi-part geometries are out of scope.

use serde::{Deserialize, Serialize};

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryKind {
    #[default]
    Point,
    LineString,
    Polygon,
}

/// GeoJSON-compatible geometry representation
///
/// Coordinates are `[lng, lat]` pairs. A `Polygon` stores its rings in
/// GeoJSON order; the engine only ever consults the exterior ring
/// (`coordinates[0]`); holes are carried through serialization but ignored
/// by every predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point { coordinates: [lng, lat] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry from its rings (exterior first)
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Get the geometry kind
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::LineString { .. } => GeometryKind::LineString,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
        }
    }

    /// The vertex set every primitive derives from: the point itself, the
    /// line's coordinates, or the polygon's exterior ring. A polygon with no
    /// rings yields an empty slice rather than panicking.
    pub fn vertices(&self) -> &[[f64; 2]] {
        match self {
            Geometry::Point { coordinates } => std::slice::from_ref(coordinates),
            Geometry::LineString { coordinates } => coordinates,
            Geometry::Polygon { coordinates } => {
                coordinates.first().map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serialization() {
        let point = Geometry::point(-15.6, 14.1);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("Point"));

        let parsed: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_polygon_serialization() {
        let polygon = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]);
        let json = serde_json::to_string(&polygon).unwrap();
        assert!(json.contains("Polygon"));

        let parsed: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(polygon, parsed);
    }

    #[test]
    fn test_vertices_exterior_ring_only() {
        let with_hole = Geometry::polygon(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
        ]);
        assert_eq!(with_hole.vertices().len(), 5);
    }

    #[test]
    fn test_vertices_empty_polygon() {
        let empty = Geometry::polygon(vec![]);
        assert!(empty.vertices().is_empty());
    }
}
