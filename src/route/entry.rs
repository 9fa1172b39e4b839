//! A single slot in a route table: either a leaf middleware chain or a
//! delegation to a nested dispatcher.

use std::collections::HashSet;

use crate::arena::{DispatcherArena, DispatcherId};
use crate::chain::Middleware;
use crate::dispatcher::RouteContext;
use crate::error::RouterError;
use crate::path::{PathModel, Segment};

/// The two mutually exclusive states of a route entry.
///
/// A leaf owns its middleware list; a delegate holds the id of a nested
/// dispatcher and no middleware of its own. Transitions go through
/// [`RouteEntry::set_router`] only.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// Terminal route with an ordered handler chain.
    Leaf(Vec<Middleware>),
    /// Delegation to a nested dispatcher in the arena.
    Delegate(DispatcherId),
}

/// A leaf route or router-delegate registered under one template path.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    key: String,
    template: PathModel,
    target: RouteTarget,
}

impl RouteEntry {
    /// Create a leaf entry owning the given handler chain.
    #[must_use]
    pub fn leaf(key: String, template: PathModel, middlewares: Vec<Middleware>) -> Self {
        Self {
            key,
            template,
            target: RouteTarget::Leaf(middlewares),
        }
    }

    /// Create an entry delegating to a nested dispatcher.
    #[must_use]
    pub fn delegate(key: String, template: PathModel, dispatcher: DispatcherId) -> Self {
        Self {
            key,
            template,
            target: RouteTarget::Delegate(dispatcher),
        }
    }

    /// Normalized route-table key this entry was registered under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The entry's own compiled template.
    #[must_use]
    pub fn template(&self) -> &PathModel {
        &self.template
    }

    /// Whether this entry delegates to a nested dispatcher.
    #[must_use]
    pub fn is_router(&self) -> bool {
        matches!(self.target, RouteTarget::Delegate(_))
    }

    /// The nested dispatcher id, when delegating.
    #[must_use]
    pub fn delegate_id(&self) -> Option<DispatcherId> {
        match self.target {
            RouteTarget::Delegate(id) => Some(id),
            RouteTarget::Leaf(_) => None,
        }
    }

    /// The owned middleware list, when a leaf.
    #[must_use]
    pub fn middlewares(&self) -> Option<&[Middleware]> {
        match &self.target {
            RouteTarget::Leaf(middlewares) => Some(middlewares),
            RouteTarget::Delegate(_) => None,
        }
    }

    fn leaf_middlewares_mut(&mut self) -> Result<&mut Vec<Middleware>, RouterError> {
        match &mut self.target {
            RouteTarget::Leaf(middlewares) => Ok(middlewares),
            RouteTarget::Delegate(_) => Err(RouterError::DelegateMiddleware),
        }
    }

    /// Append a middleware to the leaf chain. Fails on a delegate.
    pub fn add_middleware(&mut self, middleware: Middleware) -> Result<(), RouterError> {
        self.leaf_middlewares_mut()?.push(middleware);
        Ok(())
    }

    /// Remove a middleware (by identity) from the leaf chain. Fails on a
    /// delegate; returns whether anything was removed.
    pub fn remove_middleware(&mut self, middleware: &Middleware) -> Result<bool, RouterError> {
        let middlewares = self.leaf_middlewares_mut()?;
        let before = middlewares.len();
        middlewares.retain(|candidate| candidate != middleware);
        Ok(middlewares.len() != before)
    }

    /// Whether the leaf chain contains the middleware (by identity). Fails
    /// on a delegate.
    pub fn has_middleware(&self, middleware: &Middleware) -> Result<bool, RouterError> {
        match &self.target {
            RouteTarget::Leaf(middlewares) => {
                Ok(middlewares.iter().any(|candidate| candidate == middleware))
            }
            RouteTarget::Delegate(_) => Err(RouterError::DelegateMiddleware),
        }
    }

    /// Empty the leaf chain. Fails on a delegate.
    pub fn clear_middlewares(&mut self) -> Result<(), RouterError> {
        self.leaf_middlewares_mut()?.clear();
        Ok(())
    }

    /// Change delegation state.
    ///
    /// `Some(id)` is a no-op when already delegating to `id`; otherwise the
    /// middleware list is discarded and the entry becomes a delegate.
    /// `None` returns the entry to an empty leaf; previously cleared
    /// middleware is not restored. Cycle validation happens at the arena
    /// level before this is called.
    pub fn set_router(&mut self, dispatcher: Option<DispatcherId>) {
        match dispatcher {
            Some(id) => {
                if self.delegate_id() != Some(id) {
                    self.target = RouteTarget::Delegate(id);
                }
            }
            None => {
                if self.is_router() {
                    self.target = RouteTarget::Leaf(Vec::new());
                }
            }
        }
    }

    /// Whether `candidate` appears anywhere in this entry's delegation
    /// chain, transitively. Used to reject cycles at registration time.
    #[must_use]
    pub fn has_nested_dispatcher(
        &self,
        arena: &DispatcherArena,
        candidate: DispatcherId,
    ) -> bool {
        match self.delegate_id() {
            Some(id) => id == candidate || arena.reaches(id, candidate),
            None => false,
        }
    }

    /// Expand this entry into route contexts.
    ///
    /// A delegate recurses into the nested dispatcher's collection, passing
    /// the concatenated segment prefix and accumulated global middleware
    /// through. A leaf yields a single context whose model is the parent
    /// prefix spliced with its own template segments.
    pub(crate) fn collect_route_contexts(
        &self,
        arena: &DispatcherArena,
        prefix: &[Segment],
        inherited: &[Middleware],
        visited: &mut HashSet<DispatcherId>,
    ) -> Result<Vec<RouteContext>, RouterError> {
        match &self.target {
            RouteTarget::Delegate(id) => {
                let mut nested_prefix = prefix.to_vec();
                nested_prefix.extend_from_slice(self.template.segments());
                arena
                    .get(*id)?
                    .collect_contexts(arena, &nested_prefix, inherited, visited)
            }
            RouteTarget::Leaf(middlewares) => {
                let mut segments = prefix.to_vec();
                segments.extend_from_slice(self.template.segments());
                let mut effective = inherited.to_vec();
                effective.extend_from_slice(middlewares);
                Ok(vec![RouteContext {
                    route_key: self.key.clone(),
                    path: PathModel::from_segments(segments),
                    middlewares: effective,
                }])
            }
        }
    }
}
