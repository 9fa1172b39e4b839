//! Concrete request value resolved against the route table.

use serde::Serialize;
use serde_json::{Map, Value};

/// The path being resolved plus the mutable route-argument map the
/// dispatcher and chain executor populate.
///
/// The path is expected to be pre-normalized (leading slash, hash/query
/// stripped) by [`crate::normalize::normalize_path`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Request {
    /// Normalized request path, e.g. `/users/42`.
    pub path: String,
    /// Route arguments extracted from the matched template. Values are
    /// strings, `null` for absent optional parameters, or arrays when a
    /// parameter name repeats in the template.
    pub args: Map<String, Value>,
}

impl Request {
    /// Build a request for an already-normalized path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Map::new(),
        }
    }

    /// Merge extracted route arguments into the argument map. Existing keys
    /// are replaced; the merge happens once, before the chain executes, so
    /// every middleware sees final parameter values.
    pub fn merge_args(&mut self, args: Map<String, Value>) {
        for (name, value) in args {
            self.args.insert(name, value);
        }
    }

    /// Look up a single extracted argument.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }
}
