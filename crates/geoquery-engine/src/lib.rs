//! GeoQuery Engine - Query evaluation, interactive sessions, and result
//! presentation.
//!
//! The evaluator is a pure function over a feature snapshot; the session is
//! the small state machine that sequences a multi-step interactive query
//! (configure, await a map click, evaluate, present, reset) and owns every
//! transient visual the query produces.

pub mod evaluator;
pub mod presenter;
pub mod session;

pub use evaluator::{evaluate, evaluate_with_aliases};
pub use presenter::{feature_label, format_distance, present, ResultEntry};
pub use session::{QueryDraft, QuerySession, SessionState, TriggerTicket};
