//! Interactive query session.
//!
//! A session sequences one multi-step query at a time:
//! `Idle -> Configuring -> AwaitingTrigger -> Evaluating -> Presenting`,
//! with `reset()` returning to `Idle` from anywhere. The session owns every
//! transient the query produces - pushed highlight styles, a drawn buffer
//! radius, the pending trigger registration - and is responsible for
//! reverting all of them.
//!
//! Waiting for a map click is not a blocking wait: entering
//! `AwaitingTrigger` arms a one-shot registration and hands out a
//! generation-numbered [`TriggerTicket`]. Re-configuring cancels the old
//! registration and issues a new ticket, so a stale click delivered with an
//! old ticket is a provable no-op ("last configuration wins"). There is no
//! timeout; the session waits until the user clicks or cancels.

use geo::{Coord, Point, Rect};
use tracing::debug;

use geoquery_core::config::EngineConfig;
use geoquery_core::geom::{merge_bounds, radius_envelope, SpatialEntity};
use geoquery_core::models::{FieldSelector, Geometry, MatchOp, QueryResult, QuerySpec};
use geoquery_core::ports::{ArtifactId, LayerResolver, MapCanvas, TriggerSource};
use geoquery_core::{GeoqueryError, Result};

use crate::evaluator;
use crate::presenter::{self, ResultEntry};

/// Session life-cycle state. `Evaluating` is only observable from within a
/// call - evaluation runs synchronously to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Configuring,
    AwaitingTrigger,
    Evaluating,
    Presenting,
}

/// Proof of the *current* trigger registration. A ticket from a superseded
/// configuration no longer matches and its delivery does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerTicket(u64);

/// A query under construction. Parameters left as `None` fall back to the
/// configured defaults; a spatial draft without a center awaits the next
/// map click.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryDraft {
    Buffer {
        layer: String,
        radius_m: Option<f64>,
        center: Option<Point<f64>>,
    },
    /// Click-probe: "what is near this point?" - a buffer at the configured
    /// probe radius, always triggered by a click.
    Probe { layer: String },
    Nearest {
        layer: String,
        k: Option<usize>,
        center: Option<Point<f64>>,
    },
    IntersectBounds { layer: String, source: Geometry },
    Attribute {
        layer: String,
        field: FieldSelector,
        op: MatchOp,
        value: String,
    },
}

impl QueryDraft {
    /// Whether this draft still needs an externally supplied map point.
    pub fn needs_trigger(&self) -> bool {
        match self {
            QueryDraft::Buffer { center, .. } | QueryDraft::Nearest { center, .. } => {
                center.is_none()
            }
            QueryDraft::Probe { .. } => true,
            QueryDraft::IntersectBounds { .. } | QueryDraft::Attribute { .. } => false,
        }
    }

    /// Bind the trigger point (when one is required) and the configured
    /// defaults into an immutable spec.
    fn to_spec(&self, point: Option<Point<f64>>, config: &EngineConfig) -> Result<QuerySpec> {
        let spec = match self {
            QueryDraft::Buffer { layer, radius_m, center } => QuerySpec::Buffer {
                layer: layer.clone(),
                center: center.or(point).ok_or(GeoqueryError::MissingTriggerPoint)?,
                radius_m: radius_m.unwrap_or(config.buffer_radius_m.value),
            },
            QueryDraft::Probe { layer } => QuerySpec::Buffer {
                layer: layer.clone(),
                center: point.ok_or(GeoqueryError::MissingTriggerPoint)?,
                radius_m: config.probe_radius_m.value,
            },
            QueryDraft::Nearest { layer, k, center } => QuerySpec::Nearest {
                layer: layer.clone(),
                center: center.or(point).ok_or(GeoqueryError::MissingTriggerPoint)?,
                k: k.unwrap_or(config.nearest_count.value),
            },
            QueryDraft::IntersectBounds { layer, source } => QuerySpec::IntersectBounds {
                layer: layer.clone(),
                source: source.clone(),
            },
            QueryDraft::Attribute { layer, field, op, value } => QuerySpec::Attribute {
                layer: layer.clone(),
                field: field.clone(),
                op: *op,
                value: value.clone(),
            },
        };
        Ok(spec)
    }
}

/// The interactive query session. Owned by the caller (one per UI
/// controller); multiple independent sessions can coexist because no state
/// is global.
pub struct QuerySession<R, T, C>
where
    R: LayerResolver,
    T: TriggerSource,
    C: MapCanvas,
{
    resolver: R,
    trigger: T,
    canvas: C,
    config: EngineConfig,

    state: SessionState,
    draft: Option<QueryDraft>,
    result: Option<QueryResult>,

    /// Generation counter backing trigger tickets. Monotonic per session.
    generation: u64,
    pending: Option<TriggerTicket>,

    /// Highlights pushed during the most recent evaluation, for exact
    /// reversal.
    highlights: Vec<(String, usize)>,
    artifact: Option<ArtifactId>,
    /// Degree-space extent of the drawn buffer radius, folded into
    /// zoom-to-all.
    artifact_extent: Option<Rect<f64>>,
}

impl<R, T, C> QuerySession<R, T, C>
where
    R: LayerResolver,
    T: TriggerSource,
    C: MapCanvas,
{
    pub fn new(resolver: R, trigger: T, canvas: C, config: EngineConfig) -> Self {
        Self {
            resolver,
            trigger,
            canvas,
            config,
            state: SessionState::Idle,
            draft: None,
            result: None,
            generation: 0,
            pending: None,
            highlights: Vec::new(),
            artifact: None,
            artifact_extent: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    /// The ticket the UI must present with the next map click, if the
    /// session is awaiting one.
    pub fn pending_ticket(&self) -> Option<TriggerTicket> {
        self.pending
    }

    /// Begin a query. Drafts that need a trigger point leave the session in
    /// `AwaitingTrigger`; everything else evaluates immediately and lands in
    /// `Presenting`. A rejected spec leaves the session in `Configuring`
    /// with all prior visuals untouched.
    pub fn configure(&mut self, draft: QueryDraft) -> Result<SessionState> {
        // A newer configuration always supersedes a pending wait.
        self.cancel_pending();
        self.state = SessionState::Configuring;

        if draft.needs_trigger() {
            self.draft = Some(draft);
            self.generation += 1;
            self.pending = Some(TriggerTicket(self.generation));
            self.trigger.arm();
            self.state = SessionState::AwaitingTrigger;
            return Ok(self.state);
        }

        self.draft = Some(draft);
        self.run(None)?;
        Ok(self.state)
    }

    /// Deliver the next map point. Returns `Ok(true)` when the point was
    /// consumed and evaluation ran; `Ok(false)` when the ticket is stale
    /// (a superseded registration firing late) and nothing happened.
    pub fn deliver_trigger(&mut self, ticket: TriggerTicket, point: Point<f64>) -> Result<bool> {
        if self.pending != Some(ticket) {
            debug!(ticket = ticket.0, "stale trigger delivery ignored");
            return Ok(false);
        }
        // The registration is one-shot: consumed by this delivery.
        self.pending = None;
        self.run(Some(point))?;
        Ok(true)
    }

    /// Fit the viewport to every result plus the drawn buffer radius.
    /// A no-op for an empty result.
    pub fn zoom_all(&mut self) -> Result<()> {
        self.ensure_presentable()?;
        let result = self.result.as_ref().ok_or(GeoqueryError::NoActiveResult)?;

        let mut extent = self.artifact_extent;
        for hit in &result.hits {
            let hit_bounds = hit
                .feature
                .footprint()
                .or_else(|| hit.feature.center().map(point_rect));
            if let Some(b) = hit_bounds {
                extent = Some(match extent {
                    Some(e) => merge_bounds(e, b),
                    None => b,
                });
            }
        }

        if let Some(e) = extent {
            self.canvas.fit_bounds(e, self.config.fit_padding.value);
        }
        Ok(())
    }

    /// Fit the viewport to result `index` and return its display entry
    /// (name plus distance when present).
    pub fn zoom_to(&mut self, index: usize) -> Result<ResultEntry> {
        self.ensure_presentable()?;
        let result = self.result.as_ref().ok_or(GeoqueryError::NoActiveResult)?;
        let hit = result.hits.get(index).ok_or(GeoqueryError::ResultIndexOutOfRange {
            index,
            len: result.hits.len(),
        })?;

        let entry = presenter::entry(hit, &self.config.name_fields.value);
        match (hit.feature.footprint(), hit.feature.center()) {
            (Some(bounds), _) => self.canvas.fit_bounds(bounds, self.config.fit_padding.value),
            (None, Some(center)) => self.canvas.fit_point(center),
            (None, None) => {}
        }
        Ok(entry)
    }

    /// Display entries for the current result, in result order.
    pub fn entries(&self) -> Vec<ResultEntry> {
        self.result
            .as_ref()
            .map(|r| presenter::present(r, &self.config.name_fields.value))
            .unwrap_or_default()
    }

    /// Return to `Idle`: cancel any pending trigger wait, revert all
    /// highlights, remove the drawn radius, and discard spec and result.
    /// Safe to call from any state, any number of times.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.clear_visuals();
        self.draft = None;
        self.result = None;
        self.state = SessionState::Idle;
    }

    fn run(&mut self, point: Option<Point<f64>>) -> Result<()> {
        self.state = SessionState::Evaluating;
        match self.run_inner(point) {
            Ok(()) => {
                self.state = SessionState::Presenting;
                Ok(())
            }
            // No failure wedges the session: it returns to Configuring with
            // the draft intact for correction.
            Err(e) => {
                self.state = SessionState::Configuring;
                Err(e)
            }
        }
    }

    fn run_inner(&mut self, point: Option<Point<f64>>) -> Result<()> {
        let draft = self.draft.as_ref().ok_or(GeoqueryError::NoActiveResult)?;
        let spec = draft.to_spec(point, &self.config)?;

        // Fail fast: spec validation and layer resolution happen before any
        // visual state is touched.
        spec.validate()?;
        let features = self
            .resolver
            .features(spec.layer())
            .ok_or_else(|| GeoqueryError::UnknownLayer { name: spec.layer().to_string() })?;

        let result = evaluator::evaluate_with_aliases(
            &spec,
            &features,
            Some(&self.config.field_aliases.value),
        )?;

        // Mutation phase: revert the previous run's visuals, then apply this
        // run's. Nothing below can fail.
        self.clear_visuals();
        for hit in &result.hits {
            self.canvas.apply_highlight(&result.layer, hit.feature_index);
            self.highlights.push((result.layer.clone(), hit.feature_index));
        }
        if let QuerySpec::Buffer { center, radius_m, .. } = &spec {
            self.artifact = Some(self.canvas.draw_radius(*center, *radius_m));
            self.artifact_extent = Some(radius_envelope(*center, *radius_m));
        }

        debug!(layer = %result.layer, hits = result.hits.len(), "session presenting result");
        self.result = Some(result);
        Ok(())
    }

    /// Results must not outlive the layer they reference: if the target
    /// layer has been removed since evaluation, the stale result is
    /// discarded instead of re-used for zoom or highlight.
    fn ensure_presentable(&mut self) -> Result<()> {
        let Some(result) = self.result.as_ref() else {
            return Err(GeoqueryError::NoActiveResult);
        };
        if self.resolver.contains(&result.layer) {
            return Ok(());
        }

        let name = result.layer.clone();
        // The layer's rendering is gone with the layer itself; only drop the
        // bookkeeping and the session-owned artifact.
        self.highlights.clear();
        if let Some(id) = self.artifact.take() {
            self.canvas.remove_artifact(id);
        }
        self.artifact_extent = None;
        self.result = None;
        self.state = SessionState::Configuring;
        Err(GeoqueryError::UnknownLayer { name })
    }

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.trigger.cancel();
        }
    }

    fn clear_visuals(&mut self) {
        for (layer, index) in self.highlights.drain(..) {
            self.canvas.clear_highlight(&layer, index);
        }
        if let Some(id) = self.artifact.take() {
            self.canvas.remove_artifact(id);
        }
        self.artifact_extent = None;
    }
}

/// Degenerate rect for zero-radius fit semantics around a point.
fn point_rect(p: Point<f64>) -> Rect<f64> {
    let c = Coord { x: p.x(), y: p.y() };
    Rect::new(c, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_trigger_requirements() {
        let buffered = QueryDraft::Buffer {
            layer: "Towns".to_string(),
            radius_m: Some(800.0),
            center: None,
        };
        assert!(buffered.needs_trigger());

        let parameterized = QueryDraft::Buffer {
            layer: "Towns".to_string(),
            radius_m: Some(800.0),
            center: Some(Point::new(0.0, 0.0)),
        };
        assert!(!parameterized.needs_trigger());

        let probe = QueryDraft::Probe { layer: "Towns".to_string() };
        assert!(probe.needs_trigger());

        let attribute = QueryDraft::Attribute {
            layer: "Towns".to_string(),
            field: FieldSelector::Any,
            op: MatchOp::Contains,
            value: "x".to_string(),
        };
        assert!(!attribute.needs_trigger());
    }

    #[test]
    fn test_draft_defaults_come_from_config() {
        let config = EngineConfig::with_defaults();
        let draft = QueryDraft::Probe { layer: "Towns".to_string() };
        let spec = draft.to_spec(Some(Point::new(1.0, 2.0)), &config).unwrap();
        match spec {
            QuerySpec::Buffer { radius_m, .. } => assert_eq!(radius_m, 500.0),
            other => panic!("expected buffer spec, got {other:?}"),
        }

        let nearest =
            QueryDraft::Nearest { layer: "Towns".to_string(), k: None, center: None };
        match nearest.to_spec(Some(Point::new(0.0, 0.0)), &config).unwrap() {
            QuerySpec::Nearest { k, .. } => assert_eq!(k, 3),
            other => panic!("expected nearest spec, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_without_point_is_rejected() {
        let config = EngineConfig::with_defaults();
        let draft = QueryDraft::Probe { layer: "Towns".to_string() };
        assert!(matches!(
            draft.to_spec(None, &config),
            Err(GeoqueryError::MissingTriggerPoint)
        ));
    }
}
