//! Geometry primitives: centroid, bounding box, point-in-polygon, and
//! great-circle distance.
//!
//! Coordinates are degrees with `x = longitude`, `y = latitude`. Centroids
//! are the arithmetic mean of a geometry's vertices (exterior ring only for
//! polygons, holes ignored) rather than a true area centroid; this is the
//! representative point the whole engine ranks by.

use geo::{Coord, Point, Rect};

use crate::models::Geometry;

/// Mean Earth radius in meters for haversine distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude on the sphere above.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Vertex-mean centroid. `None` when the geometry has no vertices, so a
/// malformed feature degrades to "not rankable" instead of a panic.
pub fn centroid(geometry: &Geometry) -> Option<Point<f64>> {
    let vertices = geometry.vertices();
    if vertices.is_empty() {
        return None;
    }
    let (sum_lng, sum_lat) = vertices
        .iter()
        .fold((0.0, 0.0), |(lng, lat), c| (lng + c[0], lat + c[1]));
    let n = vertices.len() as f64;
    Some(Point::new(sum_lng / n, sum_lat / n))
}

/// Axis-aligned bounding box over the same vertex set the centroid uses.
/// `None` for geometries with no vertices.
pub fn bounding_box(geometry: &Geometry) -> Option<Rect<f64>> {
    let vertices = geometry.vertices();
    let first = vertices.first()?;
    let (mut min_lng, mut min_lat) = (first[0], first[1]);
    let (mut max_lng, mut max_lat) = (first[0], first[1]);
    for c in &vertices[1..] {
        min_lng = min_lng.min(c[0]);
        max_lng = max_lng.max(c[0]);
        min_lat = min_lat.min(c[1]);
        max_lat = max_lat.max(c[1]);
    }
    Some(Rect::new(
        Coord { x: min_lng, y: min_lat },
        Coord { x: max_lng, y: max_lat },
    ))
}

/// Axis-aligned box overlap: true unless one box lies entirely to one side
/// of the other on either axis. Touching edges count as intersecting.
pub fn bounds_intersect(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    let x_overlap = a.min().x <= b.max().x && a.max().x >= b.min().x;
    let y_overlap = a.min().y <= b.max().y && a.max().y >= b.min().y;
    x_overlap && y_overlap
}

/// Smallest box covering both inputs.
pub fn merge_bounds(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Ray-casting parity test over the exterior ring only. Returns `false` for
/// any non-polygon geometry and for polygons without a ring. Behavior for a
/// point exactly on a vertex or edge is whatever the parity test yields; it
/// is deterministic but not otherwise defined.
pub fn point_in_polygon(point: Point<f64>, geometry: &Geometry) -> bool {
    let Geometry::Polygon { coordinates } = geometry else {
        return false;
    };
    let Some(ring) = coordinates.first() else {
        return false;
    };

    let (x, y) = (point.x(), point.y());
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Great-circle distance in meters between two `(lng, lat)` points in
/// degrees. The sole distance metric used by the engine; no ellipsoidal
/// correction.
pub fn haversine_distance_m(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let d_lat = (p2.y() - p1.y()).to_radians();
    let d_lng = (p2.x() - p1.x()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Degree-space envelope of a circle of `radius_m` meters around `center`,
/// used to fold a drawn buffer radius into a zoom-fit extent. Longitude
/// span widens with latitude; near the poles it is clamped rather than
/// allowed to blow up.
pub fn radius_envelope(center: Point<f64>, radius_m: f64) -> Rect<f64> {
    let d_lat = radius_m / METERS_PER_DEGREE;
    let cos_lat = center.y().to_radians().cos().abs().max(1e-6);
    let d_lng = d_lat / cos_lat;
    Rect::new(
        Coord { x: center.x() - d_lng, y: center.y() - d_lat },
        Coord { x: center.x() + d_lng, y: center.y() + d_lat },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_square() -> Geometry {
        Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 4.0],
            [0.0, 4.0],
            [0.0, 0.0],
        ]])
    }

    #[test]
    fn test_haversine_zero_for_identical_points() {
        let p = Point::new(-15.55, 14.1);
        assert_eq!(haversine_distance_m(p, p), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_longitude_at_equator() {
        let d = haversine_distance_m(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn test_point_in_polygon_inside_and_outside() {
        let square = unit_square();
        assert!(point_in_polygon(Point::new(2.0, 2.0), &square));
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &square));
    }

    #[test]
    fn test_point_in_polygon_vertex_is_deterministic() {
        let square = unit_square();
        let on_vertex = Point::new(0.0, 0.0);
        let first = point_in_polygon(on_vertex, &square);
        for _ in 0..10 {
            assert_eq!(point_in_polygon(on_vertex, &square), first);
        }
    }

    #[test]
    fn test_point_in_polygon_rejects_non_polygons() {
        let line = Geometry::line_string(vec![[0.0, 0.0], [4.0, 4.0]]);
        assert!(!point_in_polygon(Point::new(2.0, 2.0), &line));
        assert!(!point_in_polygon(Point::new(0.0, 0.0), &Geometry::polygon(vec![])));
    }

    #[test]
    fn test_centroid_ignores_holes() {
        let with_hole = Geometry::polygon(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[3.0, 3.0], [3.5, 3.0], [3.5, 3.5], [3.0, 3.0]],
        ]);
        let c = centroid(&with_hole).unwrap();
        // Mean of the five exterior vertices (the closing vertex counts).
        assert!((c.x() - 1.6).abs() < 1e-12);
        assert!((c.y() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_empty_polygon_is_none() {
        assert!(centroid(&Geometry::polygon(vec![])).is_none());
        assert!(centroid(&Geometry::line_string(vec![])).is_none());
    }

    #[test]
    fn test_bounds_intersect_separated_boxes() {
        let a = bounding_box(&unit_square()).unwrap();
        let b = bounding_box(&Geometry::polygon(vec![vec![
            [5.0, 5.0],
            [6.0, 5.0],
            [6.0, 6.0],
            [5.0, 5.0],
        ]]))
        .unwrap();
        assert!(!bounds_intersect(&a, &b));

        let overlapping = bounding_box(&Geometry::polygon(vec![vec![
            [3.0, 3.0],
            [6.0, 3.0],
            [6.0, 6.0],
            [3.0, 3.0],
        ]]))
        .unwrap();
        assert!(bounds_intersect(&a, &overlapping));
    }

    #[test]
    fn test_merge_bounds_covers_both() {
        let a = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let b = Rect::new(Coord { x: 3.0, y: -2.0 }, Coord { x: 4.0, y: 0.5 });
        let m = merge_bounds(a, b);
        assert_eq!(m.min().x, 0.0);
        assert_eq!(m.min().y, -2.0);
        assert_eq!(m.max().x, 4.0);
        assert_eq!(m.max().y, 1.0);
    }

    #[test]
    fn test_radius_envelope_contains_center() {
        let center = Point::new(-15.55, 14.1);
        let env = radius_envelope(center, 1000.0);
        assert!(env.min().x < center.x() && center.x() < env.max().x);
        assert!(env.min().y < center.y() && center.y() < env.max().y);
    }

    proptest! {
        #[test]
        fn prop_haversine_symmetric_and_non_negative(
            lng1 in -180.0f64..180.0, lat1 in -85.0f64..85.0,
            lng2 in -180.0f64..180.0, lat2 in -85.0f64..85.0,
        ) {
            let a = Point::new(lng1, lat1);
            let b = Point::new(lng2, lat2);
            let d_ab = haversine_distance_m(a, b);
            let d_ba = haversine_distance_m(b, a);
            prop_assert!(d_ab >= 0.0);
            prop_assert!((d_ab - d_ba).abs() < 1e-6);
        }

        #[test]
        fn prop_centroid_lies_within_bounding_box(
            coords in proptest::collection::vec(
                (-180.0f64..180.0, -85.0f64..85.0).prop_map(|(x, y)| [x, y]),
                1..40,
            )
        ) {
            let line = Geometry::line_string(coords);
            let c = centroid(&line).unwrap();
            let b = bounding_box(&line).unwrap();
            let eps = 1e-9;
            prop_assert!(c.x() >= b.min().x - eps && c.x() <= b.max().x + eps);
            prop_assert!(c.y() >= b.min().y - eps && c.y() <= b.max().y + eps);
        }

        #[test]
        fn prop_bounds_intersect_is_reflexive(
            lng in -180.0f64..179.0, lat in -85.0f64..84.0,
        ) {
            let g = Geometry::line_string(vec![[lng, lat], [lng + 1.0, lat + 1.0]]);
            let b = bounding_box(&g).unwrap();
            prop_assert!(bounds_intersect(&b, &b));
        }
    }
}
