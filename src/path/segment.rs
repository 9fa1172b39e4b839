//! Compilation of a single `/`-delimited template chunk.

use once_cell::sync::Lazy;
use regex::Regex;

/// `:name` parameter token inside a segment.
static PARAM_TOKEN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r":\w+").expect("param token pattern is valid")
});

/// `*name` wildcard token inside a segment.
static WILDCARD_TOKEN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\*\w+").expect("wildcard token pattern is valid")
});

/// Character class a `:name` parameter value must satisfy when testing a
/// candidate path: one or more word/hyphen characters.
const PARAM_VALUE_CLASS: &str = r"([\w-]+)";

/// Catch-all fragment for wildcard segments. Consumes any remainder of the
/// input, newlines included, as well as the empty remainder.
const WILDCARD_FRAGMENT: &str = "(?s:.+)?";

/// One compiled `/`-delimited chunk of a route template.
///
/// Optionality and parametrization are independent axes: a segment is exactly
/// one of static-required, static-optional, param-required or param-optional.
/// Wildcard is an orthogonal override that replaces the whole matcher
/// fragment. Segments are immutable once compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    raw: String,
    is_optional: bool,
    is_parametrized: bool,
    is_wildcard: bool,
    is_root: bool,
}

impl Segment {
    /// Compile one template chunk into a segment descriptor.
    ///
    /// The chunk is normalized to carry its own leading separator: `foo`
    /// becomes `/foo` and `(foo)` becomes `(/foo)`. Concatenating rendered
    /// segments therefore needs no separator logic.
    ///
    /// There are no compile-time errors: a malformed chunk produces a
    /// matcher fragment that never matches (or over-matches), which is an
    /// authoring mistake rather than a runtime failure.
    #[must_use]
    pub fn compile(raw: &str) -> Self {
        let raw = Self::normalize(raw);
        let is_root = raw.is_empty() || raw == "/" || raw == "(/)";
        let is_optional = raw.len() > 2 && raw.starts_with('(') && raw.ends_with(')');
        let is_parametrized = raw.contains(':');
        let is_wildcard = WILDCARD_TOKEN.is_match(&raw);
        Self {
            raw,
            is_optional,
            is_parametrized,
            is_wildcard,
            is_root,
        }
    }

    /// Prefix the chunk with its separator unless it already carries one.
    fn normalize(raw: &str) -> String {
        if raw.is_empty() || raw.starts_with('/') || raw.starts_with("(/") {
            raw.to_string()
        } else if let Some(body) = raw.strip_prefix('(') {
            format!("(/{body}")
        } else {
            format!("/{raw}")
        }
    }

    /// The normalized original text, separator included.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the whole segment is wrapped in one parenthesis pair.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// Whether the segment contains a `:name` token.
    #[must_use]
    pub fn is_parametrized(&self) -> bool {
        self.is_parametrized
    }

    /// Whether the segment contains a `*name` token.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    /// Whether the value reduces to `""`, `"/"` or `"(/)"`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Render this segment as a matching-pattern fragment.
    ///
    /// Wildcard segments render the catch-all fragment. Otherwise each
    /// `:name` token becomes a word/hyphen capture and an optional group is
    /// wrapped as a non-capturing optional group.
    #[must_use]
    pub fn matcher_fragment(&self) -> String {
        if self.is_wildcard {
            return WILDCARD_FRAGMENT.to_string();
        }
        let replaced = PARAM_TOKEN.replace_all(&self.raw, PARAM_VALUE_CLASS);
        if self.is_optional {
            // "(/foo)" renders as "(?:/foo)?" so the group may be absent.
            let inner = &replaced[1..replaced.len() - 1];
            format!("(?:{inner})?")
        } else {
            replaced.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_idempotent_across_separator_styles() {
        let bare = Segment::compile("foo");
        let slashed = Segment::compile("/foo");
        assert_eq!(bare.raw(), slashed.raw());
        assert_eq!(bare.is_optional(), slashed.is_optional());
        assert_eq!(bare.is_parametrized(), slashed.is_parametrized());
    }

    #[test]
    fn optional_group_gains_inner_separator() {
        let seg = Segment::compile("(foo)");
        assert_eq!(seg.raw(), "(/foo)");
        assert!(seg.is_optional());
        assert!(!seg.is_parametrized());
    }

    #[test]
    fn classification_axes_are_independent() {
        let static_required = Segment::compile("/users");
        assert!(!static_required.is_optional() && !static_required.is_parametrized());

        let param_required = Segment::compile("/:id");
        assert!(!param_required.is_optional() && param_required.is_parametrized());

        let static_optional = Segment::compile("(/archive)");
        assert!(static_optional.is_optional() && !static_optional.is_parametrized());

        let param_optional = Segment::compile("(/:id)");
        assert!(param_optional.is_optional() && param_optional.is_parametrized());
    }

    #[test]
    fn root_forms_are_detected() {
        assert!(Segment::compile("").is_root());
        assert!(Segment::compile("/").is_root());
        assert!(Segment::compile("(/)").is_root());
        assert!(!Segment::compile("/foo").is_root());
    }

    #[test]
    fn wildcard_overrides_the_whole_fragment() {
        let seg = Segment::compile("/*rest");
        assert!(seg.is_wildcard());
        assert_eq!(seg.matcher_fragment(), "(?s:.+)?");
    }

    #[test]
    fn param_fragment_captures_word_and_hyphen() {
        let seg = Segment::compile("/:slug");
        assert_eq!(seg.matcher_fragment(), r"/([\w-]+)");
    }

    #[test]
    fn optional_fragment_is_non_capturing_optional() {
        let seg = Segment::compile("(/:id)");
        assert_eq!(seg.matcher_fragment(), r"(?:/([\w-]+))?");
    }
}
