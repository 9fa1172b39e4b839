//! # Path Module
//!
//! Template compilation and path matching. A route template such as
//! `:controller/:action(/:id)` is decomposed into [`Segment`]s (static,
//! parametrized, optional group, wildcard) which a [`PathModel`] aggregates
//! into a full anchored matcher plus the counters used for priority ranking.
//!
//! Compilation happens once per template; matching renders the pattern and
//! tests the candidate path. Query and fragment content appended to a
//! candidate never participates in matching.

mod model;
mod segment;

pub use model::{PathModel, SegmentCounts};
pub use segment::Segment;
