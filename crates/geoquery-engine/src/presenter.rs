//! Result presentation: display-ready labels for query hits.
//!
//! No geometry computation happens here; the presenter only resolves a
//! display name through a priority list of candidate fields and formats
//! distances as whole meters.

use serde::Serialize;

use geoquery_core::models::{Feature, QueryHit, QueryResult};

/// Fallback label for features with none of the candidate name fields.
pub const UNNAMED: &str = "Unnamed feature";

/// A display-ready result line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    /// Feature display name.
    pub label: String,
    /// Distance ("123 m") or matched attribute value, when either exists.
    pub secondary: Option<String>,
}

/// Resolve a feature's display name: the first name field with a scalar
/// value wins. Unlike attribute-query alias resolution, a null field falls
/// through to the next candidate.
pub fn feature_label(feature: &Feature, name_fields: &[String]) -> String {
    name_fields
        .iter()
        .find_map(|field| feature.property_text(field))
        .unwrap_or_else(|| UNNAMED.to_string())
}

/// Whole-meter distance label.
pub fn format_distance(meters: f64) -> String {
    format!("{} m", meters.round() as i64)
}

/// The display entry for a single hit.
pub fn entry(hit: &QueryHit, name_fields: &[String]) -> ResultEntry {
    ResultEntry {
        label: feature_label(&hit.feature, name_fields),
        secondary: hit
            .distance_m
            .map(format_distance)
            .or_else(|| hit.matched_value.clone()),
    }
}

/// Format a whole result as an ordered display list.
pub fn present(result: &QueryResult, name_fields: &[String]) -> Vec<ResultEntry> {
    result.hits.iter().map(|hit| entry(hit, name_fields)).collect()
}
