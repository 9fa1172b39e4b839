//! Explicit routing-session state.
//!
//! Replaces the implicit "current URL / is started" globals an embedding
//! application would otherwise keep: the session owns the dispatcher arena,
//! the root dispatcher id, the hash-mode flag, and the last navigated path,
//! with explicit [`RoutingSession::init`] and [`RoutingSession::teardown`].

use serde_json::Value;
use tracing::info;

use crate::arena::{DispatcherArena, DispatcherId};
use crate::error::RouterError;
use crate::normalize::normalize_path;
use crate::request::Request;
use crate::response::Response;

/// Outcome of one navigation: the request as the chain saw it, the response
/// with its error channel, and the chain's result value when one ran.
#[derive(Debug)]
pub struct Navigation {
    /// The request, with extracted route arguments merged in.
    pub request: Request,
    /// The response; `error` holds `notfound` on a miss or the propagated
    /// middleware error.
    pub response: Response,
    /// The chain result, when a route matched and the chain completed.
    pub value: Option<Value>,
}

/// Explicit session handle for an embedding application.
#[derive(Debug)]
pub struct RoutingSession {
    arena: DispatcherArena,
    root: DispatcherId,
    use_hash_mode: bool,
    current_path: Option<String>,
    started: bool,
}

impl RoutingSession {
    /// Create a session with a fresh arena and root dispatcher.
    #[must_use]
    pub fn init(use_hash_mode: bool) -> Self {
        let mut arena = DispatcherArena::new();
        let root = arena.create_dispatcher();
        info!(root = %root, use_hash_mode, "Routing session initialized");
        Self {
            arena,
            root,
            use_hash_mode,
            current_path: None,
            started: true,
        }
    }

    /// The root dispatcher id.
    #[must_use]
    pub fn root(&self) -> DispatcherId {
        self.root
    }

    /// Shared access to the arena.
    #[must_use]
    pub fn arena(&self) -> &DispatcherArena {
        &self.arena
    }

    /// Mutable access to the arena, for registration calls.
    pub fn arena_mut(&mut self) -> &mut DispatcherArena {
        &mut self.arena
    }

    /// Whether the session is live.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The most recently navigated normalized path.
    #[must_use]
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    /// Normalize a raw input, resolve it, and run the matched chain.
    ///
    /// A miss marks the response `notfound` without running anything. A
    /// middleware error is caught here, exactly once, and placed into the
    /// response error channel. Structural errors (circular nesting detected
    /// during flattening) propagate as `Err`. A torn-down session resolves
    /// nothing and reports `notfound`.
    pub fn navigate(&mut self, raw: &str) -> Result<Navigation, RouterError> {
        let path = normalize_path(raw, self.use_hash_mode);
        let mut request = Request::new(path.clone());
        let mut response = Response::new();

        if !self.started {
            response.set_not_found();
            return Ok(Navigation {
                request,
                response,
                value: None,
            });
        }

        let resolved = self.arena.resolve(self.root, &request)?;
        let value = match resolved {
            Some(context) => {
                match self.arena.run_chain(&context, &mut request, &mut response) {
                    Ok(value) => Some(value),
                    Err(error) => {
                        response.set_exception(error);
                        None
                    }
                }
            }
            None => {
                response.set_not_found();
                None
            }
        };

        self.current_path = Some(path);
        Ok(Navigation {
            request,
            response,
            value,
        })
    }

    /// Tear the session down: no further navigation resolves until a new
    /// session is initialized.
    pub fn teardown(&mut self) {
        self.started = false;
        self.current_path = None;
        info!(root = %self.root, "Routing session torn down");
    }
}
