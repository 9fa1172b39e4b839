//! Concrete response value carrying the error channel.

use serde_json::Value;

/// Error tag set when resolution finds no matching context.
pub const NOT_FOUND: &str = "notfound";

/// Error tag set when a matched route refuses the navigation.
pub const NOT_ALLOWED: &str = "notallowed";

/// Dispatch key used for thrown/rejected middleware errors.
pub const EXCEPTION_KEY: &str = "exception";

/// Dispatch key used for error values that are neither tags nor exceptions.
pub const DEFAULT_KEY: &str = "default";

/// A value placed into the response error channel.
///
/// Structural errors never land here; they fail fast at registration time.
/// This channel carries the normal "miss" outcomes and errors caught exactly
/// once at the outermost request boundary.
#[derive(Debug)]
pub enum ResponseError {
    /// A named outcome such as [`NOT_FOUND`] or [`NOT_ALLOWED`]; string tags
    /// dispatch to the handler of the same name.
    Tag(String),
    /// An error propagated out of a middleware chain; dispatches to the
    /// [`EXCEPTION_KEY`] handler.
    Exception(anyhow::Error),
    /// Any other error value; dispatches to the [`DEFAULT_KEY`] handler.
    Other(Value),
}

impl ResponseError {
    /// The error-dispatch key this value maps to: exceptions map to a fixed
    /// `"exception"` key, string tags map to themselves, anything else maps
    /// to `"default"`.
    #[must_use]
    pub fn dispatch_key(&self) -> &str {
        match self {
            Self::Tag(tag) => tag,
            Self::Exception(_) => EXCEPTION_KEY,
            Self::Other(_) => DEFAULT_KEY,
        }
    }
}

/// Response value the chain executor and the embedding application share.
#[derive(Debug, Default)]
pub struct Response {
    /// The error channel; `None` while the navigation is still healthy.
    pub error: Option<ResponseError>,
}

impl Response {
    /// A fresh response with an empty error channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the "no matching context" outcome.
    pub fn set_not_found(&mut self) {
        self.error = Some(ResponseError::Tag(NOT_FOUND.to_string()));
    }

    /// Mark the "matched but not allowed" outcome.
    pub fn set_not_allowed(&mut self) {
        self.error = Some(ResponseError::Tag(NOT_ALLOWED.to_string()));
    }

    /// Place a propagated middleware error into the channel.
    pub fn set_exception(&mut self, error: anyhow::Error) {
        self.error = Some(ResponseError::Exception(error));
    }

    /// Whether the error channel is occupied.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    #[test]
    fn tags_dispatch_to_themselves() {
        let mut res = Response::new();
        res.set_not_found();
        assert_eq!(res.error.as_ref().map(ResponseError::dispatch_key), Some(NOT_FOUND));

        res.set_not_allowed();
        assert_eq!(res.error.as_ref().map(ResponseError::dispatch_key), Some(NOT_ALLOWED));
    }

    #[test]
    fn exceptions_dispatch_to_the_exception_key() {
        let mut res = Response::new();
        res.set_exception(anyhow!("boom"));
        assert_eq!(res.error.as_ref().map(ResponseError::dispatch_key), Some(EXCEPTION_KEY));
    }

    #[test]
    fn other_values_dispatch_to_default() {
        let err = ResponseError::Other(json!({ "code": 42 }));
        assert_eq!(err.dispatch_key(), DEFAULT_KEY);
    }
}
