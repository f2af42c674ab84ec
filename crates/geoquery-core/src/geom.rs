//! Geometric building blocks of the query engine.
//!
//! Pure functions only; no state. The algorithms deliberately preserve the
//! approximations the engine is specified around: vertex-mean centroids,
//! exterior-ring-only polygon tests, and haversine distances on a spherical
//! Earth.

pub mod entity;
pub mod primitives;

pub use entity::SpatialEntity;
pub use primitives::{
    bounding_box, bounds_intersect, centroid, haversine_distance_m, merge_bounds,
    point_in_polygon, radius_envelope, EARTH_RADIUS_M,
};
