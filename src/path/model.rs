//! Compiled representation of a full route template or concrete path.

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::segment::Segment;

/// Tolerance group appended to every rendered matcher: an optional trailing
/// slash followed by an optional `#`/`?` suffix and anything after it.
/// Query and fragment content never participates in matching.
const SUFFIX_TOLERANCE: &str = "/?([?#].*)?$";

/// Per-model segment counters, computed once at construction.
///
/// Invariant: `total == statik + parametrized == required + optional`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SegmentCounts {
    /// Number of non-root segments.
    pub total: usize,
    /// Segments without a `:name` token.
    pub statik: usize,
    /// Segments with a `:name` token.
    pub parametrized: usize,
    /// Non-optional segments.
    pub required: usize,
    /// Non-optional segments without a `:name` token. Primary ranking key.
    pub required_static: usize,
    /// Non-optional segments with a `:name` token.
    pub required_parametrized: usize,
    /// Optional segments.
    pub optional: usize,
    /// Optional segments without a `:name` token.
    pub optional_static: usize,
    /// Optional segments with a `:name` token.
    pub optional_parametrized: usize,
}

impl SegmentCounts {
    fn tally(segments: &[Segment]) -> Self {
        let mut counts = Self::default();
        for seg in segments {
            counts.total += 1;
            if seg.is_parametrized() {
                counts.parametrized += 1;
            } else {
                counts.statik += 1;
            }
            if seg.is_optional() {
                counts.optional += 1;
                if seg.is_parametrized() {
                    counts.optional_parametrized += 1;
                } else {
                    counts.optional_static += 1;
                }
            } else {
                counts.required += 1;
                if seg.is_parametrized() {
                    counts.required_parametrized += 1;
                } else {
                    counts.required_static += 1;
                }
            }
        }
        counts
    }
}

/// Ordered list of compiled non-root segments for a full route path.
///
/// Built fresh each time a route context is computed (nested-router
/// flattening splices parent and child segment lists into a new model) and
/// never mutated in place.
#[derive(Debug, Clone)]
pub struct PathModel {
    segments: Vec<Segment>,
    counts: SegmentCounts,
}

impl PathModel {
    /// Build a model from a raw string template.
    ///
    /// The template is split into chunks at top-level `/` boundaries; a
    /// parenthesized group forms its own chunk so `(/:id)` survives the
    /// split intact. Root-only chunks are filtered out.
    #[must_use]
    pub fn from_template(template: &str) -> Self {
        let segments = split_template(template)
            .iter()
            .map(|chunk| Segment::compile(chunk))
            .filter(|seg| !seg.is_root())
            .collect();
        Self::from_segments(segments)
    }

    /// Build a model from an already-compiled segment list, used when
    /// concatenating a parent router's accumulated segments with a child's.
    #[must_use]
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let segments: Vec<Segment> = segments.into_iter().filter(|s| !s.is_root()).collect();
        let counts = SegmentCounts::tally(&segments);
        Self { segments, counts }
    }

    /// The compiled segments, in template order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The derived counters used for priority ranking.
    #[must_use]
    pub fn counts(&self) -> SegmentCounts {
        self.counts
    }

    /// True iff the segment list is empty (the template reduced to root).
    #[must_use]
    pub fn is_root_path(&self) -> bool {
        self.segments.is_empty()
    }

    /// The join of raw segment values; the empty join renders as `/`.
    #[must_use]
    pub fn path(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut joined = String::new();
        for seg in &self.segments {
            joined.push_str(seg.raw());
        }
        joined
    }

    /// Render the full matching pattern: anchored at the start, every
    /// fragment in order, then the trailing-slash/suffix tolerance group.
    #[must_use]
    pub fn render_matcher(&self) -> String {
        let mut pattern = String::with_capacity(self.path().len() + 16);
        pattern.push('^');
        for seg in &self.segments {
            pattern.push_str(&seg.matcher_fragment());
        }
        pattern.push_str(SUFFIX_TOLERANCE);
        pattern
    }

    /// Test a concrete candidate path against this model's matcher.
    ///
    /// A rendered pattern that fails to compile (possible only for malformed
    /// authored templates) is treated as never matching.
    #[must_use]
    pub fn test(&self, candidate: &str) -> bool {
        let pattern = self.render_matcher();
        match Regex::new(&pattern) {
            Ok(re) => re.is_match(candidate),
            Err(error) => {
                warn!(
                    pattern = %pattern,
                    error = %error,
                    "Route matcher failed to compile; treating as non-matching"
                );
                false
            }
        }
    }
}

impl std::fmt::Display for PathModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Split a template into segment chunks.
///
/// `/` separates chunks only at parenthesis depth zero, and an opening
/// parenthesis at depth zero starts a new chunk, so optional groups such as
/// `(/:id)` come out whole.
fn split_template(template: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in template.chars() {
        match ch {
            '/' if depth == 0 => {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
            }
            '(' => {
                if depth == 0 && !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
                if depth == 0 {
                    chunks.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_counter_invariant(model: &PathModel) {
        let c = model.counts();
        assert_eq!(c.total, c.statik + c.parametrized);
        assert_eq!(c.total, c.required + c.optional);
        assert_eq!(c.required, c.required_static + c.required_parametrized);
        assert_eq!(c.optional, c.optional_static + c.optional_parametrized);
    }

    #[test]
    fn counters_hold_for_mixed_templates() {
        for template in [
            "",
            "/",
            "foo/bar",
            "foo/:bar",
            ":controller/:action(/:id)",
            "a/(b)/:c(/:d)/e",
            "docs/*rest",
        ] {
            let model = PathModel::from_template(template);
            assert_counter_invariant(&model);
        }
    }

    #[test]
    fn counters_classify_each_axis() {
        let model = PathModel::from_template(":controller/:action(/:id)");
        let c = model.counts();
        assert_eq!(c.total, 3);
        assert_eq!(c.parametrized, 3);
        assert_eq!(c.statik, 0);
        assert_eq!(c.required, 2);
        assert_eq!(c.optional, 1);
        assert_eq!(c.optional_parametrized, 1);
    }

    #[test]
    fn root_templates_yield_empty_models() {
        for template in ["", "/", "(/)"] {
            let model = PathModel::from_template(template);
            assert!(model.is_root_path(), "template {template:?}");
            assert!(model.segments().is_empty());
            assert_eq!(model.path(), "/");
        }
    }

    #[test]
    fn optional_groups_survive_the_split() {
        let model = PathModel::from_template(":controller/:action(/:id)");
        let raws: Vec<&str> = model.segments().iter().map(|s| s.raw()).collect();
        assert_eq!(raws, vec!["/:controller", "/:action", "(/:id)"]);
    }

    #[test]
    fn matcher_accepts_optional_absence_and_presence() {
        let model = PathModel::from_template(":controller/:action(/:id)");
        assert!(model.test("/users/edit/42"));
        assert!(model.test("/users/list"));
        assert!(!model.test("/users"));
    }

    #[test]
    fn matcher_tolerates_trailing_slash_and_suffix() {
        let model = PathModel::from_template("foo/bar");
        assert!(model.test("/foo/bar"));
        assert!(model.test("/foo/bar/"));
        assert!(model.test("/foo/bar?page=2"));
        assert!(model.test("/foo/bar#section"));
        assert!(!model.test("/foo/bar/baz"));
    }

    #[test]
    fn root_matcher_accepts_bare_root() {
        let model = PathModel::from_template("/");
        assert!(model.test("/"));
        assert!(model.test(""));
        assert!(!model.test("/foo"));
    }

    #[test]
    fn wildcard_consumes_remainder() {
        let model = PathModel::from_template("docs/*rest");
        assert!(model.test("/docs/a/b/c"));
        assert!(model.test("/docs"));
        assert!(model.test("/docs/a\nb"));
        assert!(!model.test("/api/docs"));
    }

    #[test]
    fn splice_equals_template_of_concatenation() {
        let parent = PathModel::from_template("admin");
        let child = PathModel::from_template(":id");
        let mut spliced = parent.segments().to_vec();
        spliced.extend(child.segments().to_vec());
        let combined = PathModel::from_segments(spliced);
        assert_eq!(combined.path(), "/admin/:id");
        assert!(combined.test("/admin/7"));
    }
}
