//! Sequential middleware-chain executor with explicit continue/stop
//! signaling.
//!
//! Middlewares run strictly in order. Each is invoked with the request, the
//! response, and a [`Proceed`] handle; the chain advances to the next
//! middleware only if the current one calls [`Proceed::proceed`] during its
//! own turn. A middleware that never proceeds stops the chain and its own
//! return value becomes the chain result. Errors propagate unwrapped to the
//! caller; nothing is swallowed or retried here.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::request::Request;
use crate::response::Response;

/// Continue/stop signal handed to each middleware for its turn.
///
/// The signal is consulted immediately after the middleware returns, so a
/// `proceed` call stashed for later (after the middleware's own turn has
/// settled) cannot retroactively resume the chain.
#[derive(Default)]
pub struct Proceed {
    requested: Cell<bool>,
}

impl Proceed {
    /// Request that the chain continue with the next middleware.
    pub fn proceed(&self) {
        self.requested.set(true);
    }

    fn requested(&self) -> bool {
        self.requested.get()
    }
}

type MiddlewareFn =
    dyn Fn(&mut Request, &mut Response, &Proceed) -> anyhow::Result<Value> + Send + Sync;

/// A cloneable handler in a route's middleware list.
///
/// Identity, not structure, distinguishes middlewares: `has`/`remove`
/// operations compare the underlying function pointer, so the same handle
/// must be reused when a middleware is registered in several places.
#[derive(Clone)]
pub struct Middleware {
    func: Arc<MiddlewareFn>,
}

impl Middleware {
    /// Wrap a handler function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Request, &mut Response, &Proceed) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Invoke the handler for one turn of the chain.
    pub fn call(
        &self,
        request: &mut Request,
        response: &mut Response,
        proceed: &Proceed,
    ) -> anyhow::Result<Value> {
        (self.func)(request, response, proceed)
    }
}

impl PartialEq for Middleware {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("ptr", &Arc::as_ptr(&self.func))
            .finish()
    }
}

/// Run a flattened middleware list against a request/response pair.
///
/// Returns the last executed middleware's return value: the final one when
/// the whole chain proceeded, or the stopping middleware's value on
/// short-circuit. An error from any middleware aborts the chain and
/// propagates to the caller.
pub fn run(
    request: &mut Request,
    response: &mut Response,
    middlewares: &[Middleware],
) -> anyhow::Result<Value> {
    let mut result = Value::Null;
    for (index, middleware) in middlewares.iter().enumerate() {
        let proceed = Proceed::default();
        result = middleware.call(request, response, &proceed)?;
        if !proceed.requested() {
            debug!(
                path = %request.path,
                stopped_at = index,
                chain_len = middlewares.len(),
                "Middleware chain stopped without proceed"
            );
            break;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn chain_runs_in_sequence_when_proceeding() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let make = |tag: &'static str, order: Arc<std::sync::Mutex<Vec<&'static str>>>| {
            Middleware::new(move |_req, _res, next| {
                order.lock().map_err(|_| anyhow!("poisoned"))?.push(tag);
                next.proceed();
                Ok(json!(tag))
            })
        };
        let chain = vec![
            make("first", Arc::clone(&order)),
            make("second", Arc::clone(&order)),
        ];
        let mut req = Request::new("/x");
        let mut res = Response::new();
        let result = run(&mut req, &mut res, &chain).expect("chain runs");
        assert_eq!(result, json!("second"));
        assert_eq!(*order.lock().expect("lock"), vec!["first", "second"]);
    }

    #[test]
    fn chain_short_circuits_without_proceed() {
        let second_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&second_calls);
        let chain = vec![
            Middleware::new(|_req, _res, _next| Ok(json!("stopped-here"))),
            Middleware::new(move |_req, _res, next| {
                counter.fetch_add(1, Ordering::SeqCst);
                next.proceed();
                Ok(Value::Null)
            }),
        ];
        let mut req = Request::new("/x");
        let mut res = Response::new();
        let result = run(&mut req, &mut res, &chain).expect("chain runs");
        assert_eq!(result, json!("stopped-here"));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn errors_propagate_unwrapped() {
        let chain = vec![
            Middleware::new(|_req, _res, next| {
                next.proceed();
                Ok(Value::Null)
            }),
            Middleware::new(|_req, _res, _next| Err(anyhow!("handler exploded"))),
        ];
        let mut req = Request::new("/x");
        let mut res = Response::new();
        let err = run(&mut req, &mut res, &chain).expect_err("second middleware fails");
        assert_eq!(err.to_string(), "handler exploded");
    }

    #[test]
    fn empty_chain_yields_null() {
        let mut req = Request::new("/x");
        let mut res = Response::new();
        let result = run(&mut req, &mut res, &[]).expect("empty chain");
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn middleware_identity_is_pointer_based() {
        let a = Middleware::new(|_req, _res, _next| Ok(Value::Null));
        let b = Middleware::new(|_req, _res, _next| Ok(Value::Null));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
