//! Layers: named, ordered feature collections with a fixed geometry kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::feature::Feature;
use super::geometry::GeometryKind;
use crate::ports::LayerResolver;

/// Rendering style carried by a layer. The engine never draws anything
/// itself; styles are data handed to the rendering subsystem, including the
/// highlight style pushed onto matched features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.2,
            weight: 2.0,
        }
    }
}

impl LayerStyle {
    /// Style applied to features matched by a query.
    pub fn highlight() -> Self {
        Self {
            color: "rgba(255, 0, 0, 1)".to_string(),
            fill_color: "rgba(255, 255, 0, 0.8)".to_string(),
            fill_opacity: 0.8,
            weight: 3.0,
        }
    }
}

/// A named, ordered collection of features sharing a geometry kind.
/// Owned by the map-rendering subsystem; the query engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub kind: GeometryKind,
    #[serde(default)]
    pub style: LayerStyle,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: GeometryKind, features: Vec<Feature>) -> Self {
        Self { name: name.into(), kind, style: LayerStyle::default(), features }
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// In-memory set of layers keyed by name.
///
/// This is the engine-side `LayerResolver` used by tests and the CLI; a real
/// map front-end supplies its own resolver over whatever it renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerSet {
    layers: BTreeMap<String, Layer>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a layer, replacing any previous layer with the same name.
    pub fn insert(&mut self, layer: Layer) {
        self.layers.insert(layer.name.clone(), layer);
    }

    pub fn remove(&mut self, name: &str) -> Option<Layer> {
        self.layers.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl LayerResolver for LayerSet {
    fn features(&self, layer: &str) -> Option<Vec<Feature>> {
        self.layers.get(layer).map(|l| l.features.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geometry::Geometry;

    #[test]
    fn test_layer_set_resolution() {
        let mut set = LayerSet::new();
        set.insert(Layer::new(
            "Schools",
            GeometryKind::Point,
            vec![Feature::new(Geometry::point(-15.0, 14.0))],
        ));

        assert_eq!(set.features("Schools").map(|f| f.len()), Some(1));
        assert!(set.features("Roads").is_none());
    }

    #[test]
    fn test_layer_removal_invalidates_resolution() {
        let mut set = LayerSet::new();
        set.insert(Layer::new("Towns", GeometryKind::Point, vec![]));
        assert!(set.features("Towns").is_some());

        set.remove("Towns");
        assert!(set.features("Towns").is_none());
    }
}
