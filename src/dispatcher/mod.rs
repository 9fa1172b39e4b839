//! # Dispatcher Module
//!
//! Resolution of a request path against a tree of nested routers.
//!
//! ## Overview
//!
//! A [`Dispatcher`] owns a route table and router-scoped middleware. To
//! resolve a request, the dispatcher tree is *flattened* into a list of
//! candidate [`RouteContext`]s (each splicing the ancestor segment prefix
//! with a leaf's template and carrying the effective middleware chain),
//! *ranked* by specificity, and walked in order until the first context
//! whose model matches the request path textually.
//!
//! ## Resolution Flow
//!
//! 1. `resolve(request)` flattens the nested-router tree (cycle-guarded)
//! 2. Candidates are ranked: `required_static` descending, `total` ascending
//! 3. The first candidate whose matcher tests true wins
//! 4. `run_chain` extracts route arguments and executes the middleware chain
//!
//! A miss is a normal `None` outcome; only structural mistakes (circular
//! nesting, mode conflicts) surface as errors, and they surface at
//! registration or flattening time rather than mid-match.

mod core;
mod params;

pub use core::{rank_contexts, run_chain, Dispatcher, Registration, RouteContext};
pub(crate) use core::first_match;
pub use params::extract_args;
