//! Query specifications and results.

use geo::Point;
use serde::{Deserialize, Serialize};

use super::feature::Feature;
use super::geometry::Geometry;
use crate::error::{GeoqueryError, Result};

/// Which property field an attribute query inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSelector {
    /// Scan every property of each feature (`"*"` in the UI).
    Any,
    /// A single field, resolved through casing variants and alias tables.
    Named(String),
}

impl FieldSelector {
    pub fn named(field: impl Into<String>) -> Self {
        FieldSelector::Named(field.into())
    }
}

/// Attribute match operator. Comparison is case-insensitive over the
/// string-cast property value and the trimmed search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOp {
    Equals,
    Contains,
    StartsWith,
}

impl MatchOp {
    /// Apply the operator to two already-lowercased strings.
    pub fn matches(&self, value: &str, term: &str) -> bool {
        match self {
            MatchOp::Equals => value == term,
            MatchOp::Contains => value.contains(term),
            MatchOp::StartsWith => value.starts_with(term),
        }
    }
}

impl std::str::FromStr for MatchOp {
    type Err = GeoqueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "equals" | "eq" => Ok(MatchOp::Equals),
            "contains" => Ok(MatchOp::Contains),
            "starts-with" | "starts_with" | "starts" => Ok(MatchOp::StartsWith),
            other => Err(GeoqueryError::ConfigInvalid {
                key: "operator".to_string(),
                reason: format!("unknown operator '{other}'"),
            }),
        }
    }
}

/// An immutable query specification, evaluated against one layer's current
/// feature snapshot. Built (and rebuilt between evaluations) by the query
/// session; the evaluator never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuerySpec {
    /// Features whose centroid lies within `radius_m` meters of `center`.
    Buffer {
        layer: String,
        #[serde(with = "point_coords")]
        center: Point<f64>,
        radius_m: f64,
    },
    /// Features whose bounding box overlaps the source geometry's bounding
    /// box. A documented approximation of intersection; no exact
    /// polygon-polygon test is performed.
    IntersectBounds {
        layer: String,
        source: Geometry,
    },
    /// The `k` features closest to `center` by centroid distance.
    Nearest {
        layer: String,
        #[serde(with = "point_coords")]
        center: Point<f64>,
        k: usize,
    },
    /// Features with a property matching `value` under `op`.
    Attribute {
        layer: String,
        field: FieldSelector,
        op: MatchOp,
        value: String,
    },
}

impl QuerySpec {
    /// The target layer name.
    pub fn layer(&self) -> &str {
        match self {
            QuerySpec::Buffer { layer, .. }
            | QuerySpec::IntersectBounds { layer, .. }
            | QuerySpec::Nearest { layer, .. }
            | QuerySpec::Attribute { layer, .. } => layer,
        }
    }

    /// Fail-fast validation, performed before any evaluation work. A spec
    /// that passes here can still produce an empty result; that is not an
    /// error.
    pub fn validate(&self) -> Result<()> {
        if self.layer().trim().is_empty() {
            return Err(GeoqueryError::MissingTargetLayer);
        }
        match self {
            QuerySpec::Buffer { radius_m, .. } => {
                if !(*radius_m > 0.0) {
                    return Err(GeoqueryError::InvalidRadius { radius: *radius_m });
                }
            }
            QuerySpec::Nearest { k, .. } => {
                if *k == 0 {
                    return Err(GeoqueryError::InvalidCount);
                }
            }
            QuerySpec::Attribute { value, .. } => {
                if value.trim().is_empty() {
                    return Err(GeoqueryError::BlankSearchValue);
                }
            }
            QuerySpec::IntersectBounds { source, .. } => {
                if source.vertices().is_empty() {
                    return Err(GeoqueryError::DegenerateSource);
                }
            }
        }
        Ok(())
    }
}

/// One matched feature within a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    /// The matched feature, cloned from the evaluated snapshot.
    pub feature: Feature,

    /// Index of the feature within the evaluated snapshot. Used for
    /// highlight bookkeeping.
    pub feature_index: usize,

    /// Centroid distance from the query center, for distance-ranked queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,

    /// Raw text of the first property that matched, for attribute queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_value: Option<String>,
}

/// An ordered, deduplicated query result: ascending by distance when the
/// query ranks by distance, insertion order otherwise. Derived from exactly
/// one spec evaluated against exactly one layer snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub layer: String,
    pub hits: Vec<QueryHit>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Serialize `geo::Point` as a `[lng, lat]` pair, matching the geometry
/// coordinate convention.
mod point_coords {
    use geo::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point<f64>, ser: S) -> Result<S::Ok, S::Error> {
        [point.x(), point.y()].serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Point<f64>, D::Error> {
        let [lng, lat] = <[f64; 2]>::deserialize(de)?;
        Ok(Point::new(lng, lat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_value() {
        let spec = QuerySpec::Attribute {
            layer: "Towns".to_string(),
            field: FieldSelector::Any,
            op: MatchOp::Contains,
            value: "   ".to_string(),
        };
        assert!(matches!(spec.validate(), Err(GeoqueryError::BlankSearchValue)));
    }

    #[test]
    fn test_validate_rejects_non_positive_radius() {
        let spec = QuerySpec::Buffer {
            layer: "Towns".to_string(),
            center: Point::new(0.0, 0.0),
            radius_m: 0.0,
        };
        let err = spec.validate().unwrap_err();
        assert!(err.is_invalid_spec());
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let spec =
            QuerySpec::Nearest { layer: "Towns".to_string(), center: Point::new(0.0, 0.0), k: 0 };
        assert!(matches!(spec.validate(), Err(GeoqueryError::InvalidCount)));
    }

    #[test]
    fn test_validate_rejects_missing_layer() {
        let spec =
            QuerySpec::Nearest { layer: "  ".to_string(), center: Point::new(0.0, 0.0), k: 3 };
        assert!(matches!(spec.validate(), Err(GeoqueryError::MissingTargetLayer)));
    }

    #[test]
    fn test_validate_rejects_empty_source_geometry() {
        let spec = QuerySpec::IntersectBounds {
            layer: "Towns".to_string(),
            source: Geometry::polygon(vec![]),
        };
        assert!(matches!(spec.validate(), Err(GeoqueryError::DegenerateSource)));
    }

    #[test]
    fn test_spec_roundtrip() {
        let spec = QuerySpec::Buffer {
            layer: "Schools".to_string(),
            center: Point::new(-15.55, 14.1),
            radius_m: 1000.0,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: QuerySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, parsed);
    }

    #[test]
    fn test_match_op_parsing() {
        assert_eq!("contains".parse::<MatchOp>().unwrap(), MatchOp::Contains);
        assert_eq!("starts-with".parse::<MatchOp>().unwrap(), MatchOp::StartsWith);
        assert!("between".parse::<MatchOp>().is_err());
    }
}
