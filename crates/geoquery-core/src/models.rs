//! Domain models: geometry, features, layers, and query specifications.

pub mod feature;
pub mod geometry;
pub mod layer;
pub mod query;

pub use feature::Feature;
pub use geometry::{Geometry, GeometryKind};
pub use layer::{Layer, LayerSet, LayerStyle};
pub use query::{FieldSelector, MatchOp, QueryHit, QueryResult, QuerySpec};
