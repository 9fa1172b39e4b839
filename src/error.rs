//! Structural error taxonomy for route registration and resolution.
//!
//! These errors indicate programming mistakes in route setup (circular
//! nesting, mutating a delegate's middleware, incompatible re-registration).
//! They fail fast at the offending call and are never retried. A resolution
//! miss is *not* an error; it is the `None` outcome of
//! [`crate::arena::DispatcherArena::resolve`].

use thiserror::Error;

use crate::arena::DispatcherId;

/// Errors raised synchronously at registration or resolution time.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A dispatcher was encountered twice in one nesting chain or one
    /// flattening pass. The nested-router graph must be acyclic.
    #[error("circular nesting detected at dispatcher {0}")]
    CircularNesting(DispatcherId),

    /// `add_middleware` / `remove_middleware` / `clear_middlewares` was
    /// called on an entry currently delegating to a nested dispatcher.
    #[error("cannot modify the middleware list of a router-delegate entry")]
    DelegateMiddleware,

    /// A path was re-registered under the other mode (leaf vs. delegate).
    /// Mode changes must go through `set_router`, never through `register`.
    #[error("route `{path}` is already registered as a {existing} entry")]
    ModeConflict {
        /// Normalized route-table key of the conflicting registration.
        path: String,
        /// Mode of the entry already occupying the slot.
        existing: &'static str,
    },

    /// An operation referenced a dispatcher id the arena does not hold.
    #[error("unknown dispatcher {0}")]
    UnknownDispatcher(DispatcherId),

    /// A delegation rewire targeted a path with no registered entry.
    #[error("no route registered under `{path}`")]
    UnknownRoute {
        /// Normalized table key that was looked up.
        path: String,
    },
}
