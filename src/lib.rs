//! # Waymark
//!
//! **Waymark** is a nested route-matching and middleware-dispatch engine. It
//! compiles route-path templates (static segments, named parameters,
//! optional groups, wildcard captures) into matching patterns, ranks
//! overlapping routes by specificity, flattens trees of nested routers into
//! candidate lists, and executes the winning route's middleware chain with
//! explicit continue/stop semantics.
//!
//! ## Architecture
//!
//! - **[`path`]** - Template segmentation, matcher rendering, ranking counters
//! - **[`route`]** - Route entries (leaf vs. router-delegate) and the route table
//! - **[`dispatcher`]** - Flattening, specificity ranking, matching, argument extraction
//! - **[`arena`]** - Id-addressed dispatcher storage and cycle-checked registration
//! - **[`chain`]** - Sequential middleware executor with `proceed` signaling
//! - **[`normalize`]** - Path/URL normalization shared by registration and matching
//! - **[`session`]** - Explicit session state (`init`/`teardown`, `navigate`)
//!
//! ## Resolution Flow
//!
//! `resolve(request)` flattens the nested-router tree into route contexts,
//! sorts them most-specific first (`required_static` descending, then
//! `total` ascending), and picks the first context whose rendered matcher
//! tests true against the request path. `run_chain` then merges the
//! extracted route arguments into the request and runs the effective
//! middleware list: ancestor-to-descendant router-scoped middleware first,
//! then the leaf's own handlers, each advancing the chain only by calling
//! `proceed` during its turn.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use waymark::chain::Middleware;
//! use waymark::dispatcher::Registration;
//! use waymark::session::RoutingSession;
//!
//! let mut session = RoutingSession::init(false);
//! let root = session.root();
//! let show_user = Middleware::new(|req, _res, _next| {
//!     Ok(json!({ "user": req.arg("id") }))
//! });
//! session
//!     .arena_mut()
//!     .register(root, "users/:id", Registration::Handlers(vec![show_user]), false)
//!     .expect("registration succeeds");
//!
//! let nav = session.navigate("/users/42").expect("no structural errors");
//! assert_eq!(nav.value, Some(json!({ "user": "42" })));
//! ```
//!
//! ## Error Model
//!
//! Structural mistakes (circular nesting, mutating a delegate's middleware,
//! incompatible re-registration) fail fast at the offending call. A
//! resolution miss is a normal `None`/`notfound` outcome. Middleware errors
//! propagate unwrapped out of the chain and are caught exactly once at the
//! session boundary, landing in the response's error channel.

pub mod arena;
pub mod chain;
pub mod dispatcher;
pub mod error;
pub mod normalize;
pub mod path;
pub mod request;
pub mod response;
pub mod route;
pub mod session;

pub use arena::{DispatcherArena, DispatcherId};
pub use chain::{Middleware, Proceed};
pub use dispatcher::{Dispatcher, Registration, RouteContext};
pub use error::RouterError;
pub use path::{PathModel, Segment, SegmentCounts};
pub use request::Request;
pub use response::{Response, ResponseError};
pub use route::{RouteEntry, RouteTable, RouteTarget};
pub use session::{Navigation, RoutingSession};
