//! Spatial entity adapter.
//!
//! Loaded features are heterogeneous: point markers expose a single
//! coordinate, shapes expose an extent. This trait gives downstream code a
//! uniform view - a representative center and an optional footprint - so
//! nothing else in the engine branches on geometry kind.

use geo::{Point, Rect};

use super::primitives::{bounding_box, centroid};
use crate::models::{Feature, Geometry};

/// Uniform spatial view over anything with a geometry.
pub trait SpatialEntity {
    /// Representative point (the vertex-mean centroid). `None` for
    /// geometries with no vertices.
    fn center(&self) -> Option<Point<f64>>;

    /// Bounding box, or `None` where a box is degenerate: point geometries
    /// have no footprint, and zoom-fit callers fall back to `center()` with
    /// zero-radius semantics instead.
    fn footprint(&self) -> Option<Rect<f64>>;
}

impl SpatialEntity for Geometry {
    fn center(&self) -> Option<Point<f64>> {
        centroid(self)
    }

    fn footprint(&self) -> Option<Rect<f64>> {
        match self {
            Geometry::Point { .. } => None,
            _ => bounding_box(self),
        }
    }
}

impl SpatialEntity for Feature {
    fn center(&self) -> Option<Point<f64>> {
        self.geometry.center()
    }

    fn footprint(&self) -> Option<Rect<f64>> {
        self.geometry.footprint()
    }
}
