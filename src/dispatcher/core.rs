//! Dispatcher state, nested-tree flattening, ranking, and matching.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::arena::{DispatcherArena, DispatcherId};
use crate::chain::{self, Middleware};
use crate::error::RouterError;
use crate::path::{PathModel, Segment};
use crate::request::Request;
use crate::response::Response;
use crate::route::{RouteEntry, RouteTable};

use super::params::extract_args;

/// What a registration call binds a path to.
#[derive(Clone)]
pub enum Registration {
    /// A leaf route with an ordered handler chain.
    Handlers(Vec<Middleware>),
    /// Delegation to a nested dispatcher.
    Router(DispatcherId),
}

/// One candidate produced by flattening, computed fresh per resolution
/// attempt and never persisted.
#[derive(Debug, Clone)]
pub struct RouteContext {
    /// Table key of the leaf entry this context expands.
    pub route_key: String,
    /// Full path model: ancestor segment prefix spliced with the leaf's own
    /// template segments.
    pub path: PathModel,
    /// Effective chain: ancestor-to-descendant global middleware followed by
    /// the leaf's local middleware.
    pub middlewares: Vec<Middleware>,
}

/// A router instance: a route table plus router-scoped middleware.
///
/// Dispatchers live in a [`DispatcherArena`] and are addressed by
/// [`DispatcherId`]; registration and resolution go through the arena so
/// nested-router cycle checks can see the whole graph.
#[derive(Debug)]
pub struct Dispatcher {
    id: DispatcherId,
    table: RouteTable,
    middlewares: Vec<Middleware>,
}

impl Dispatcher {
    pub(crate) fn new(id: DispatcherId) -> Self {
        Self {
            id,
            table: RouteTable::new(),
            middlewares: Vec::new(),
        }
    }

    /// This dispatcher's arena id.
    #[must_use]
    pub fn id(&self) -> DispatcherId {
        self.id
    }

    /// The route table, in insertion order.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut RouteTable {
        &mut self.table
    }

    /// Router-scoped middleware, in registration order.
    #[must_use]
    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    /// Append a router-scoped middleware. It runs, in ancestor-first order,
    /// ahead of every route below this dispatcher.
    pub fn use_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    /// Remove a router-scoped middleware by identity.
    pub fn remove_middleware(&mut self, middleware: &Middleware) -> bool {
        let before = self.middlewares.len();
        self.middlewares.retain(|candidate| candidate != middleware);
        self.middlewares.len() != before
    }

    pub(crate) fn build_entry(&self, key: String, registration: Registration) -> RouteEntry {
        let template = PathModel::from_template(&key);
        match registration {
            Registration::Handlers(middlewares) => RouteEntry::leaf(key, template, middlewares),
            Registration::Router(nested) => RouteEntry::delegate(key, template, nested),
        }
    }

    /// Recursively expand this dispatcher's table into route contexts.
    ///
    /// `inherited` carries every ancestor's global middleware in
    /// ancestor-to-descendant order; this dispatcher's own global middleware
    /// is appended before descending. Revisiting a dispatcher within one
    /// pass raises [`RouterError::CircularNesting`] immediately instead of
    /// expanding forever.
    pub(crate) fn collect_contexts(
        &self,
        arena: &DispatcherArena,
        prefix: &[Segment],
        inherited: &[Middleware],
        visited: &mut HashSet<DispatcherId>,
    ) -> Result<Vec<RouteContext>, RouterError> {
        if !visited.insert(self.id) {
            return Err(RouterError::CircularNesting(self.id));
        }
        let mut scoped = inherited.to_vec();
        scoped.extend_from_slice(&self.middlewares);

        let mut contexts = Vec::new();
        for entry in self.table.entries() {
            contexts.extend(entry.collect_route_contexts(arena, prefix, &scoped, visited)?);
        }
        Ok(contexts)
    }
}

/// Sort flattened contexts most-specific first.
///
/// Two keys only: `required_static` descending (literal segments are less
/// likely to swallow another route's traffic), then `total` ascending
/// (shorter templates first among equals). The sort is stable, so full ties
/// keep flattening order.
pub fn rank_contexts(contexts: &mut [RouteContext]) {
    contexts.sort_by(|a, b| {
        let (ca, cb) = (a.path.counts(), b.path.counts());
        cb.required_static
            .cmp(&ca.required_static)
            .then(ca.total.cmp(&cb.total))
    });
}

/// Walk ranked contexts in order and return the first structural + textual
/// match against the request path.
pub(crate) fn first_match(contexts: Vec<RouteContext>, path: &str) -> Option<RouteContext> {
    for context in contexts {
        if context.path.test(path) {
            info!(
                path = %path,
                route = %context.path,
                chain_len = context.middlewares.len(),
                "Route matched"
            );
            return Some(context);
        }
        debug!(path = %path, route = %context.path, "Candidate rejected");
    }
    warn!(path = %path, "No route matched");
    None
}

/// Execute a matched context's chain.
///
/// Route arguments are extracted from the winning template against the
/// concrete path and merged into the request before the first middleware
/// runs, so every middleware sees final parameter values. Middleware errors
/// propagate to the caller unwrapped.
pub fn run_chain(
    context: &RouteContext,
    request: &mut Request,
    response: &mut Response,
) -> anyhow::Result<Value> {
    let args = extract_args(&context.path.path(), &request.path);
    request.merge_args(args);
    chain::run(request, response, &context.middlewares)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(template: &str) -> RouteContext {
        RouteContext {
            route_key: template.to_string(),
            path: PathModel::from_template(template),
            middlewares: Vec::new(),
        }
    }

    #[test]
    fn static_specificity_outranks_registration_order() {
        let mut contexts = vec![context("foo/:bar"), context("foo/bar")];
        rank_contexts(&mut contexts);
        assert_eq!(contexts[0].route_key, "foo/bar");
    }

    #[test]
    fn shorter_template_wins_among_equal_static_counts() {
        let mut contexts = vec![context(":foo(/bar)/:zoo"), context(":foo/:zoo")];
        rank_contexts(&mut contexts);
        assert_eq!(contexts[0].route_key, ":foo/:zoo");
    }

    #[test]
    fn full_ties_keep_flattening_order() {
        let mut contexts = vec![context(":a/:b"), context(":c/:d")];
        rank_contexts(&mut contexts);
        assert_eq!(contexts[0].route_key, ":a/:b");
    }
}
