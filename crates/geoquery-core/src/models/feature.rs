//! Spatial features: a geometry plus a scalar property map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::geometry::Geometry;

/// A single geographic record. Immutable once loaded.
///
/// Properties are scalar JSON values (string, number, bool, null). Keys are
/// not guaranteed consistent casing across features of the same layer, which
/// is why attribute queries resolve field names through casing variants and
/// alias tables rather than exact lookups. The map is ordered so wildcard
/// property scans are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,

    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Feature {
    /// Create a feature with no properties
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry, properties: BTreeMap::new() }
    }

    /// Create a feature with properties
    pub fn with_properties(
        geometry: Geometry,
        properties: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self { geometry, properties }
    }

    /// String-cast of a property value, `None` when the key is absent, the
    /// value is null, or the value is not a scalar.
    pub fn property_text(&self, key: &str) -> Option<String> {
        self.properties.get(key).and_then(value_text)
    }

    /// Resolve the first present key among `candidates` to its string-cast
    /// value. Only the first key that exists is consulted, later candidates
    /// are never tried; a present-but-null value therefore resolves to
    /// nothing rather than falling through to the next variant.
    pub fn resolve_text(&self, candidates: &[String]) -> Option<String> {
        candidates
            .iter()
            .find(|key| self.properties.contains_key(key.as_str()))
            .and_then(|key| self.property_text(key))
    }
}

/// String-cast a scalar JSON value. Nulls and compound values have no text.
pub fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature_with(props: &[(&str, serde_json::Value)]) -> Feature {
        let properties =
            props.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<BTreeMap<_, _>>();
        Feature::with_properties(Geometry::point(0.0, 0.0), properties)
    }

    #[test]
    fn test_property_text_casts_scalars() {
        let f = feature_with(&[("Nom", json!("Kaffrine")), ("pop", json!(12500))]);
        assert_eq!(f.property_text("Nom").as_deref(), Some("Kaffrine"));
        assert_eq!(f.property_text("pop").as_deref(), Some("12500"));
    }

    #[test]
    fn test_property_text_skips_null_and_compound() {
        let f = feature_with(&[("a", json!(null)), ("b", json!([1, 2]))]);
        assert_eq!(f.property_text("a"), None);
        assert_eq!(f.property_text("b"), None);
        assert_eq!(f.property_text("missing"), None);
    }

    #[test]
    fn test_resolve_text_first_present_key_wins() {
        let f = feature_with(&[("NOM", json!("Upper")), ("nom", json!("lower"))]);
        let candidates =
            vec!["Nom".to_string(), "NOM".to_string(), "nom".to_string()];
        assert_eq!(f.resolve_text(&candidates).as_deref(), Some("Upper"));
    }

    #[test]
    fn test_resolve_text_null_blocks_fallthrough() {
        let f = feature_with(&[("NOM", json!(null)), ("nom", json!("lower"))]);
        let candidates = vec!["NOM".to_string(), "nom".to_string()];
        assert_eq!(f.resolve_text(&candidates), None);
    }
}
