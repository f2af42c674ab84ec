//! Port trait definitions.
//!
//! The engine is a library consumed by UI code; these traits are its
//! boundary. The map/rendering subsystem supplies the implementations: a
//! resolver over the layers it renders, a source of user-supplied trigger
//! points, and the visual side effects (highlights, drawn radii, viewport
//! fits). The engine itself does no network or file I/O and persists
//! nothing.

use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::models::Feature;

/// Handle to a transient drawn artifact (e.g. a buffer radius circle)
/// owned by the query session and disposed of on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub u64);

/// Resolves a layer name to its current feature snapshot.
///
/// Implementations return an owned, consistent snapshot of the layer as it
/// stands right now; the engine never caches it across calls, so layer
/// removal is observed immediately.
pub trait LayerResolver {
    fn features(&self, layer: &str) -> Option<Vec<Feature>>;

    /// Whether the layer currently exists.
    fn contains(&self, layer: &str) -> bool {
        self.features(layer).is_some()
    }
}

/// One-shot registration against the external trigger-point source (the
/// map's click event).
///
/// At most one registration is pending at a time: the session calls `arm`
/// when it starts waiting and `cancel` when a newer configuration or a
/// reset supersedes the wait. Delivery of the actual point goes through
/// `QuerySession::deliver_trigger` with a ticket, so a registration that
/// was cancelled here can never fire an evaluation.
pub trait TriggerSource {
    fn arm(&mut self);
    fn cancel(&mut self);
}

/// Visual side effects delegated to the rendering subsystem.
pub trait MapCanvas {
    /// Push the highlight style onto one feature of a layer.
    fn apply_highlight(&mut self, layer: &str, feature_index: usize);

    /// Restore the feature's layer style.
    fn clear_highlight(&mut self, layer: &str, feature_index: usize);

    /// Draw a radius circle around `center`; the returned id is owned by
    /// the session.
    fn draw_radius(&mut self, center: Point<f64>, radius_m: f64) -> ArtifactId;

    /// Remove a previously drawn artifact.
    fn remove_artifact(&mut self, artifact: ArtifactId);

    /// Fit the viewport to `bounds`, padded by `padding` as a fraction of
    /// the extent.
    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: f64);

    /// Center the viewport on a single point (zero-radius fit).
    fn fit_point(&mut self, point: Point<f64>);
}
