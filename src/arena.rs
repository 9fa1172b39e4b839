//! Arena of dispatchers addressed by opaque id.
//!
//! Nested routers never hold live references to each other; a delegating
//! route entry stores a [`DispatcherId`] and cycle detection walks the arena
//! graph by id. Registration, delegation rewiring, and resolution are all
//! arena-level operations so cycle checks can see the whole graph.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::chain::Middleware;
use crate::dispatcher::{Dispatcher, Registration, RouteContext};
use crate::error::RouterError;
use crate::normalize::table_key;
use crate::request::Request;
use crate::response::Response;
use crate::route::RouteEntry;

/// Opaque handle of one dispatcher in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatcherId(u32);

impl DispatcherId {
    /// Build an id from its raw index. Intended for tests and bookkeeping;
    /// ids handed out by [`DispatcherArena::create_dispatcher`] are the ones
    /// the arena will actually resolve.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DispatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns every dispatcher and mediates all nested-router operations.
#[derive(Debug, Default)]
pub struct DispatcherArena {
    dispatchers: Vec<Dispatcher>,
}

impl DispatcherArena {
    /// An empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh dispatcher and return its id.
    pub fn create_dispatcher(&mut self) -> DispatcherId {
        let id = DispatcherId(u32::try_from(self.dispatchers.len()).unwrap_or(u32::MAX));
        self.dispatchers.push(Dispatcher::new(id));
        debug!(dispatcher = %id, "Dispatcher created");
        id
    }

    /// Borrow a dispatcher by id.
    pub fn get(&self, id: DispatcherId) -> Result<&Dispatcher, RouterError> {
        self.dispatchers
            .get(id.slot())
            .ok_or(RouterError::UnknownDispatcher(id))
    }

    /// Mutably borrow a dispatcher by id.
    pub fn get_mut(&mut self, id: DispatcherId) -> Result<&mut Dispatcher, RouterError> {
        self.dispatchers
            .get_mut(id.slot())
            .ok_or(RouterError::UnknownDispatcher(id))
    }

    /// Whether `needle` is reachable from `from` through delegation,
    /// transitively. `from` itself does not count as reached.
    #[must_use]
    pub fn reaches(&self, from: DispatcherId, needle: DispatcherId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Ok(dispatcher) = self.get(current) else {
                continue;
            };
            for entry in dispatcher.table().entries() {
                if let Some(nested) = entry.delegate_id() {
                    if nested == needle {
                        return true;
                    }
                    stack.push(nested);
                }
            }
        }
        false
    }

    fn ensure_acyclic(
        &self,
        owner: DispatcherId,
        nested: DispatcherId,
    ) -> Result<(), RouterError> {
        if nested == owner || self.reaches(nested, owner) {
            return Err(RouterError::CircularNesting(nested));
        }
        Ok(())
    }

    /// Register a path on a dispatcher.
    ///
    /// An absent path creates a new entry, leaf or delegate per the
    /// registration argument. Re-registering an existing leaf with more
    /// handlers appends them; re-registering a delegate with the same
    /// dispatcher is a no-op. Registering an existing path under the other
    /// mode is a hard [`RouterError::ModeConflict`]; mode changes go through
    /// [`DispatcherArena::set_entry_router`]. Nesting a dispatcher inside
    /// itself, directly or transitively, fails before the table is touched.
    pub fn register(
        &mut self,
        owner: DispatcherId,
        path: &str,
        registration: Registration,
        prepend: bool,
    ) -> Result<(), RouterError> {
        if let Registration::Router(nested) = &registration {
            self.get(*nested)?;
            self.ensure_acyclic(owner, *nested)?;
        }
        let key = table_key(path);
        let dispatcher = self.get_mut(owner)?;

        if let Some(entry) = dispatcher.table_mut().get_mut(&key) {
            return match (entry.is_router(), registration) {
                (false, Registration::Handlers(middlewares)) => {
                    for middleware in middlewares {
                        entry.add_middleware(middleware)?;
                    }
                    Ok(())
                }
                (true, Registration::Router(nested)) if entry.delegate_id() == Some(nested) => {
                    Ok(())
                }
                (true, _) => Err(RouterError::ModeConflict {
                    path: key,
                    existing: "router-delegate",
                }),
                (false, _) => Err(RouterError::ModeConflict {
                    path: key,
                    existing: "leaf",
                }),
            };
        }

        let entry = dispatcher.build_entry(key.clone(), registration);
        dispatcher.table_mut().add(entry, prepend);
        info!(
            dispatcher = %owner,
            path = %key,
            routes = self.get(owner)?.table().len(),
            "Route registered"
        );
        Ok(())
    }

    /// Mutably borrow the entry registered under `path`, for leaf-chain
    /// middleware maintenance (`add_middleware`, `remove_middleware`,
    /// `clear_middlewares`).
    pub fn entry_mut(
        &mut self,
        owner: DispatcherId,
        path: &str,
    ) -> Result<&mut RouteEntry, RouterError> {
        let key = table_key(path);
        self.get_mut(owner)?
            .table_mut()
            .get_mut(&key)
            .ok_or(RouterError::UnknownRoute { path: key })
    }

    /// Rewire an existing entry's delegation state, with cycle validation.
    ///
    /// `Some(id)` turns the entry into a delegate of `id` (discarding its
    /// middleware); `None` returns it to an empty leaf.
    pub fn set_entry_router(
        &mut self,
        owner: DispatcherId,
        path: &str,
        target: Option<DispatcherId>,
    ) -> Result<(), RouterError> {
        if let Some(nested) = target {
            self.get(nested)?;
            self.ensure_acyclic(owner, nested)?;
        }
        self.entry_mut(owner, path)?.set_router(target);
        Ok(())
    }

    /// Remove and return the entry registered under `path`.
    pub fn remove_route(
        &mut self,
        owner: DispatcherId,
        path: &str,
    ) -> Result<Option<RouteEntry>, RouterError> {
        let key = table_key(path);
        Ok(self.get_mut(owner)?.table_mut().remove(&key))
    }

    /// Clear delegation to `nested` from every entry of `owner` that points
    /// at it, returning how many entries were released.
    pub fn release_router(
        &mut self,
        owner: DispatcherId,
        nested: DispatcherId,
    ) -> Result<usize, RouterError> {
        let mut released = 0;
        for entry in self.get_mut(owner)?.table_mut().entries_mut() {
            if entry.delegate_id() == Some(nested) {
                entry.set_router(None);
                released += 1;
            }
        }
        Ok(released)
    }

    /// Append a router-scoped middleware to a dispatcher.
    pub fn use_middleware(
        &mut self,
        owner: DispatcherId,
        middleware: Middleware,
    ) -> Result<(), RouterError> {
        self.get_mut(owner)?.use_middleware(middleware);
        Ok(())
    }

    /// Remove a router-scoped middleware (by identity) from a dispatcher.
    pub fn remove_middleware(
        &mut self,
        owner: DispatcherId,
        middleware: &Middleware,
    ) -> Result<bool, RouterError> {
        Ok(self.get_mut(owner)?.remove_middleware(middleware))
    }

    /// Flatten the nested-router tree under `root` into route contexts.
    ///
    /// Ancestor global middleware precedes descendant middleware in every
    /// context. Encountering a dispatcher twice in one pass is a fatal
    /// [`RouterError::CircularNesting`].
    pub fn collect_all_contexts(
        &self,
        root: DispatcherId,
    ) -> Result<Vec<RouteContext>, RouterError> {
        let mut visited = HashSet::new();
        self.get(root)?
            .collect_contexts(self, &[], &[], &mut visited)
    }

    /// Resolve a request to the highest-ranked matching route context.
    ///
    /// A miss is the normal `Ok(None)` outcome, not an error; only
    /// structural failures surface as `Err`.
    pub fn resolve(
        &self,
        root: DispatcherId,
        request: &Request,
    ) -> Result<Option<RouteContext>, RouterError> {
        let mut contexts = self.collect_all_contexts(root)?;
        crate::dispatcher::rank_contexts(&mut contexts);
        debug!(
            path = %request.path,
            candidates = contexts.len(),
            "Resolving request against ranked contexts"
        );
        Ok(crate::dispatcher::first_match(contexts, &request.path))
    }

    /// Run a matched context's middleware chain, merging extracted route
    /// arguments into the request first.
    pub fn run_chain(
        &self,
        context: &RouteContext,
        request: &mut Request,
        response: &mut Response,
    ) -> anyhow::Result<Value> {
        crate::dispatcher::run_chain(context, request, response)
    }
}
