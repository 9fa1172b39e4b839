//! Route-argument extraction from a winning template.

use regex::Regex;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use tracing::warn;

/// Parameter counts above this spill to the heap; real templates rarely
/// carry more than a handful of tokens.
const MAX_INLINE_PARAMS: usize = 8;

type NameVec = SmallVec<[String; MAX_INLINE_PARAMS]>;

/// Derive each named parameter's textual value by re-matching the winning
/// *template* against the concrete request path.
///
/// The derived pattern escapes literal text, turns each `(group)` into a
/// non-capturing optional group, each `:name` into a capture of anything but
/// `/`, `#`, `?`, and each `*name` into a lazy any-character capture
/// (newlines included) that may be absent along with its separator.
/// Captures are zipped back to token order. A repeated parameter name merges
/// by the add-value rule: the first occurrence stays scalar, later
/// occurrences convert the slot to an array and append.
///
/// An absent optional parameter or wildcard is reported as `null`. A
/// template whose derived pattern does not match the path (possible only for
/// malformed authored templates) yields an empty map.
#[must_use]
pub fn extract_args(template: &str, path: &str) -> Map<String, Value> {
    let (pattern, names) = derive_extraction_pattern(template);
    if names.is_empty() {
        return Map::new();
    }
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(error) => {
            warn!(
                template = %template,
                pattern = %pattern,
                error = %error,
                "Argument-extraction pattern failed to compile"
            );
            return Map::new();
        }
    };
    let Some(captures) = regex.captures(path) else {
        return Map::new();
    };

    let mut args = Map::new();
    for (index, name) in names.iter().enumerate() {
        let value = captures
            .get(index + 1)
            .map_or(Value::Null, |capture| Value::String(capture.as_str().to_string()));
        add_value(&mut args, name, value);
    }
    args
}

/// Build the extraction regex and the ordered list of `:name`/`*name`
/// tokens found in the template.
fn derive_extraction_pattern(template: &str) -> (String, NameVec) {
    let mut pattern = String::with_capacity(template.len() + 8);
    pattern.push('^');
    let mut names = NameVec::new();

    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '(' => pattern.push_str("(?:"),
            ')' => pattern.push_str(")?"),
            ':' | '*' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    // A bare `:`/`*` is literal text, not a token.
                    pattern.push_str(&regex::escape(&ch.to_string()));
                } else {
                    if ch == ':' {
                        pattern.push_str("([^/#?]+)");
                    } else if pattern.ends_with('/') {
                        // The matcher lets a wildcard swallow its own
                        // separator, so the extraction group must make the
                        // preceding slash optional too.
                        pattern.pop();
                        pattern.push_str("(?:/((?s:.*?)))?");
                    } else {
                        pattern.push_str("((?s:.*?))");
                    }
                    names.push(name);
                }
            }
            _ => pattern.push_str(&regex::escape(&ch.to_string())),
        }
    }
    pattern.push_str("/?$");
    (pattern, names)
}

/// Merge one extracted value into the argument map: scalar on first sight,
/// array append on repeats.
fn add_value(args: &mut Map<String, Value>, name: &str, value: Value) {
    match args.get_mut(name) {
        None => {
            args.insert(name.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}
