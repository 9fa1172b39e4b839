use serde_json::{json, Value};
use waymark::chain::Middleware;
use waymark::dispatcher::Registration;
use waymark::response::{ResponseError, EXCEPTION_KEY, NOT_FOUND};
use waymark::session::RoutingSession;

mod tracing_util;
use tracing_util::TestTracing;

fn show(value: Value) -> Middleware {
    Middleware::new(move |_req, _res, _next| Ok(value.clone()))
}

#[test]
fn navigation_runs_the_matched_chain() {
    let _tracing = TestTracing::init();
    let mut session = RoutingSession::init(false);
    let root = session.root();
    session
        .arena_mut()
        .register(root, "home", Registration::Handlers(vec![show(json!("home"))]), false)
        .expect("registration succeeds");

    let nav = session.navigate("home").expect("no structural errors");
    assert_eq!(nav.value, Some(json!("home")));
    assert!(!nav.response.has_error());
    assert_eq!(session.current_path(), Some("/home"));
}

#[test]
fn a_miss_marks_notfound_without_running_anything() {
    let _tracing = TestTracing::init();
    let mut session = RoutingSession::init(false);
    let nav = session.navigate("/nowhere").expect("no structural errors");
    assert_eq!(nav.value, None);
    assert_eq!(
        nav.response.error.as_ref().map(ResponseError::dispatch_key),
        Some(NOT_FOUND)
    );
}

#[test]
fn middleware_errors_land_in_the_response_error_channel() {
    let _tracing = TestTracing::init();
    let mut session = RoutingSession::init(false);
    let root = session.root();
    let failing = Middleware::new(|_req, _res, _next| Err(anyhow::anyhow!("boom")));
    session
        .arena_mut()
        .register(root, "explode", Registration::Handlers(vec![failing]), false)
        .expect("registration succeeds");

    let nav = session.navigate("/explode").expect("no structural errors");
    assert_eq!(nav.value, None);
    assert_eq!(
        nav.response.error.as_ref().map(ResponseError::dispatch_key),
        Some(EXCEPTION_KEY)
    );
}

#[test]
fn hash_mode_resolves_the_fragment_path() {
    let _tracing = TestTracing::init();
    let mut session = RoutingSession::init(true);
    let root = session.root();
    let echo_id = Middleware::new(|req, _res, _next| Ok(req.arg("id").cloned().unwrap_or(Value::Null)));
    session
        .arena_mut()
        .register(root, "users/:id", Registration::Handlers(vec![echo_id]), false)
        .expect("registration succeeds");

    let nav = session
        .navigate("/app#/users/5?tab=posts")
        .expect("no structural errors");
    assert_eq!(nav.value, Some(json!("5")));
    assert_eq!(session.current_path(), Some("/users/5"));
}

#[test]
fn teardown_stops_resolution() {
    let _tracing = TestTracing::init();
    let mut session = RoutingSession::init(false);
    let root = session.root();
    session
        .arena_mut()
        .register(root, "home", Registration::Handlers(vec![show(json!("home"))]), false)
        .expect("registration succeeds");

    session.teardown();
    assert!(!session.is_started());
    assert_eq!(session.current_path(), None);

    let nav = session.navigate("/home").expect("no structural errors");
    assert_eq!(nav.value, None);
    assert_eq!(
        nav.response.error.as_ref().map(ResponseError::dispatch_key),
        Some(NOT_FOUND)
    );
}
