//! Query evaluator: one spec against one feature snapshot.
//!
//! Evaluation is a pure function. It validates the spec up front, never
//! mutates the input features, and running it twice over the same snapshot
//! yields structurally equal results. Malformed geometries (an empty ring,
//! a zero-vertex line) never abort an evaluation: they are skipped by
//! distance predicates and non-matching for bounds predicates.

use geo::Point;
use tracing::debug;

use geoquery_core::config::FieldAliases;
use geoquery_core::geom::{bounding_box, bounds_intersect, centroid, haversine_distance_m};
use geoquery_core::models::feature::value_text;
use geoquery_core::models::{
    Feature, FieldSelector, Geometry, MatchOp, QueryHit, QueryResult, QuerySpec,
};
use geoquery_core::{GeoqueryError, Result};

/// Evaluate a query spec against a snapshot of the target layer's features.
///
/// The snapshot is whatever the caller's `LayerResolver` returned; the
/// evaluator itself neither resolves layers nor caches anything.
pub fn evaluate(spec: &QuerySpec, features: &[Feature]) -> Result<QueryResult> {
    evaluate_with_aliases(spec, features, None)
}

/// Like [`evaluate`], with declared per-layer field alias tables consulted
/// for attribute queries. Alias resolution happens once per evaluation, not
/// per feature.
pub fn evaluate_with_aliases(
    spec: &QuerySpec,
    features: &[Feature],
    aliases: Option<&FieldAliases>,
) -> Result<QueryResult> {
    spec.validate()?;

    let hits = match spec {
        QuerySpec::Buffer { center, radius_m, .. } => {
            let mut hits = distance_scan(*center, features);
            hits.retain(|hit| hit.distance_m.is_some_and(|d| d <= *radius_m));
            sort_ascending(&mut hits);
            hits
        }
        QuerySpec::Nearest { center, k, .. } => {
            let mut hits = distance_scan(*center, features);
            sort_ascending(&mut hits);
            hits.truncate(*k);
            hits
        }
        QuerySpec::IntersectBounds { source, .. } => bounds_scan(source, features)?,
        QuerySpec::Attribute { layer, field, op, value } => {
            let candidates = match field {
                FieldSelector::Any => None,
                FieldSelector::Named(name) => {
                    Some(field_candidates(layer, name, aliases))
                }
            };
            attribute_scan(features, candidates.as_deref(), *op, value)
        }
    };

    debug!(
        layer = %spec.layer(),
        evaluated = features.len(),
        matched = hits.len(),
        "query evaluated"
    );

    Ok(QueryResult { layer: spec.layer().to_string(), hits })
}

/// Centroid distance from `center` for every rankable feature. Features
/// without a computable centroid are skipped, not errors.
fn distance_scan(center: Point<f64>, features: &[Feature]) -> Vec<QueryHit> {
    features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let Some(c) = centroid(&feature.geometry) else {
                debug!(feature_index = index, "feature has no centroid; skipped");
                return None;
            };
            Some(QueryHit {
                feature: feature.clone(),
                feature_index: index,
                distance_m: Some(haversine_distance_m(center, c)),
                matched_value: None,
            })
        })
        .collect()
}

/// Stable ascending sort by distance; ties keep original feature order.
fn sort_ascending(hits: &mut [QueryHit]) {
    hits.sort_by(|a, b| {
        a.distance_m
            .partial_cmp(&b.distance_m)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Bounding-box overlap against the source geometry's box. Insertion order;
/// no distance is defined for this predicate.
fn bounds_scan(source: &Geometry, features: &[Feature]) -> Result<Vec<QueryHit>> {
    let source_bounds = bounding_box(source).ok_or(GeoqueryError::DegenerateSource)?;

    Ok(features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let feature_bounds = bounding_box(&feature.geometry)?;
            bounds_intersect(&source_bounds, &feature_bounds).then(|| QueryHit {
                feature: feature.clone(),
                feature_index: index,
                distance_m: None,
                matched_value: None,
            })
        })
        .collect())
}

/// The ordered key list tried against each feature for a named field:
/// the layer's declared alias table when one exists, otherwise the casing
/// permutations the source layers are known to disagree on.
fn field_candidates(layer: &str, field: &str, aliases: Option<&FieldAliases>) -> Vec<String> {
    if let Some(declared) = aliases.and_then(|a| a.candidates(layer, field)) {
        return declared.to_vec();
    }
    casing_variants(field)
}

/// Exact, UPPERCASE, lowercase, Capitalized - first present key wins.
fn casing_variants(field: &str) -> Vec<String> {
    let mut chars = field.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };

    let mut variants: Vec<String> = Vec::with_capacity(4);
    for v in [field.to_string(), field.to_uppercase(), field.to_lowercase(), capitalized] {
        if !variants.contains(&v) {
            variants.push(v);
        }
    }
    variants
}

/// Attribute scan. A feature is included at most once: the first matching
/// field short-circuits, and for a named field only the first *present*
/// key variant is ever consulted.
fn attribute_scan(
    features: &[Feature],
    candidates: Option<&[String]>,
    op: MatchOp,
    value: &str,
) -> Vec<QueryHit> {
    let term = value.trim().to_lowercase();

    features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let matched = match candidates {
                // Wildcard: scan every property in key order.
                None => feature
                    .properties
                    .values()
                    .filter_map(value_text)
                    .find(|text| op.matches(&text.to_lowercase(), &term)),
                Some(keys) => feature
                    .resolve_text(keys)
                    .filter(|text| op.matches(&text.to_lowercase(), &term)),
            };
            matched.map(|text| QueryHit {
                feature: feature.clone(),
                feature_index: index,
                distance_m: None,
                matched_value: Some(text),
            })
        })
        .collect()
}
