//! GeoJSON loading: each input file becomes one layer.

use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use geoquery_core::models::{Feature, Geometry, GeometryKind, Layer, LayerSet};

/// Load every input file into a layer set. Layers are named after the file
/// stem; a later file with the same stem replaces the earlier layer.
pub fn load_layers(paths: &[impl AsRef<Path>]) -> Result<LayerSet> {
    let mut layers = LayerSet::new();
    for path in paths {
        layers.insert(load_layer(path.as_ref())?);
    }
    Ok(layers)
}

/// Load a single GeoJSON FeatureCollection as a layer. Features with
/// unsupported geometry kinds (multi-part, collections) are skipped with a
/// warning rather than failing the whole file.
pub fn load_layer(path: &Path) -> Result<Layer> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let geojson: GeoJson = text
        .parse()
        .with_context(|| format!("{} is not valid GeoJSON", path.display()))?;
    let collection = FeatureCollection::try_from(geojson)
        .with_context(|| format!("{} is not a FeatureCollection", path.display()))?;

    let mut features = Vec::new();
    let mut kind = None;
    for feature in collection.features {
        let Some(geometry) = feature.geometry.as_ref().and_then(|g| convert_geometry(&g.value))
        else {
            warn!(file = %path.display(), "skipping feature with unsupported geometry");
            continue;
        };
        let properties: BTreeMap<String, serde_json::Value> = feature
            .properties
            .map(|map| map.into_iter().collect())
            .unwrap_or_default();

        kind.get_or_insert(geometry.kind());
        features.push(Feature::with_properties(geometry, properties));
    }

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("layer")
        .to_string();
    Ok(Layer::new(name, kind.unwrap_or(GeometryKind::Point), features))
}

/// Parse a source geometry for intersect queries: inline GeoJSON text, or a
/// path to a file holding a single geometry object.
pub fn parse_source_geometry(raw: &str) -> Result<Geometry> {
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        fs::read_to_string(raw).with_context(|| format!("failed to read {}", raw))?
    };

    let value: serde_json::Value =
        serde_json::from_str(&text).context("source geometry is not valid JSON")?;
    Geometry::from_geojson(&value)
        .context("source geometry must be a Point, LineString or Polygon")
}

fn convert_geometry(value: &geojson::Value) -> Option<Geometry> {
    match value {
        geojson::Value::Point(coords) => {
            let [lng, lat] = pair(coords)?;
            Some(Geometry::point(lng, lat))
        }
        geojson::Value::LineString(coords) => Some(Geometry::line_string(
            coords.iter().map(|p| pair(p)).collect::<Option<Vec<_>>>()?,
        )),
        geojson::Value::Polygon(rings) => Some(Geometry::polygon(
            rings
                .iter()
                .map(|ring| ring.iter().map(|p| pair(p)).collect::<Option<Vec<_>>>())
                .collect::<Option<Vec<_>>>()?,
        )),
        _ => None,
    }
}

fn pair(position: &[f64]) -> Option<[f64; 2]> {
    Some([*position.first()?, *position.get(1)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-15.55, 14.1]},
                "properties": {"Nom": "Kaffrine"}
            },
            {
                "type": "Feature",
                "geometry": {"type": "MultiPoint", "coordinates": [[0, 0]]},
                "properties": {"Nom": "Skipped"}
            }
        ]
    }"#;

    #[test]
    fn test_load_layer_named_after_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("towns.geojson");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(COLLECTION.as_bytes()).unwrap();

        let layer = load_layer(&path).unwrap();
        assert_eq!(layer.name, "towns");
        assert_eq!(layer.kind, GeometryKind::Point);
        // The multi-part feature is skipped, not an error.
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.features[0].property_text("Nom").as_deref(), Some("Kaffrine"));
    }

    #[test]
    fn test_parse_inline_source_geometry() {
        let geometry =
            parse_source_geometry(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).unwrap();
        assert_eq!(geometry, Geometry::point(1.0, 2.0));
    }

    #[test]
    fn test_parse_source_geometry_rejects_unsupported_kind() {
        let raw = r#"{"type": "MultiPolygon", "coordinates": []}"#;
        assert!(parse_source_geometry(raw).is_err());
    }

    #[test]
    fn test_load_layer_rejects_bare_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("point.geojson");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(br#"{"type": "Point", "coordinates": [0, 0]}"#).unwrap();

        assert!(load_layer(&path).is_err());
    }
}
