//! Path normalization shared by registration and matching.
//!
//! Registration keys and matching candidates must normalize identically so
//! `foo/bar` and `/foo/bar` land in the same route-table slot, and so the
//! path extracted from a full URL matches what was registered.

use url::Url;

/// Normalize a raw input into a matching candidate / registration key.
///
/// Accepts bare paths as well as full URLs (parsed with the `url` crate).
/// In hash mode the effective path lives in the fragment (`/app#/users/5`
/// resolves to `/users/5`); in path mode the fragment is stripped. Query
/// content is stripped in both modes. The result always begins with `/`.
#[must_use]
pub fn normalize_path(input: &str, use_hash_mode: bool) -> String {
    if let Ok(parsed) = Url::parse(input) {
        if !parsed.cannot_be_a_base() {
            let raw = if use_hash_mode {
                parsed.fragment().unwrap_or("").to_string()
            } else {
                parsed.path().to_string()
            };
            return ensure_leading_slash(strip_suffixes(&raw));
        }
    }

    let raw = if use_hash_mode {
        match input.split_once('#') {
            Some((_, fragment)) => fragment,
            // No fragment present: the whole input is already the path.
            None => input,
        }
    } else {
        input
    };
    ensure_leading_slash(strip_suffixes(raw))
}

/// Normalize a route template into its table key: leading slash ensured
/// (unless the template opens with an optional group), query/hash stripped.
#[must_use]
pub fn table_key(template: &str) -> String {
    let stripped = strip_suffixes(template);
    if stripped.starts_with('(') {
        stripped.to_string()
    } else {
        ensure_leading_slash(stripped)
    }
}

fn strip_suffixes(raw: &str) -> &str {
    let end = raw
        .find(['?', '#'])
        .unwrap_or(raw.len());
    &raw[..end]
}

fn ensure_leading_slash(raw: &str) -> String {
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_paths_gain_a_leading_slash() {
        assert_eq!(normalize_path("foo/bar", false), "/foo/bar");
        assert_eq!(normalize_path("/foo/bar", false), "/foo/bar");
        assert_eq!(normalize_path("", false), "/");
    }

    #[test]
    fn query_and_fragment_are_stripped_in_path_mode() {
        assert_eq!(normalize_path("/users/5?tab=posts", false), "/users/5");
        assert_eq!(normalize_path("/users/5#bio", false), "/users/5");
    }

    #[test]
    fn hash_mode_resolves_the_fragment() {
        assert_eq!(normalize_path("/app#/users/5", true), "/users/5");
        assert_eq!(normalize_path("/app#/users/5?tab=posts", true), "/users/5");
        // No fragment: the input is already the path.
        assert_eq!(normalize_path("/users/5", true), "/users/5");
    }

    #[test]
    fn full_urls_are_parsed() {
        assert_eq!(
            normalize_path("https://example.com/users/5?tab=posts", false),
            "/users/5"
        );
        assert_eq!(
            normalize_path("https://example.com/app#/users/5", true),
            "/users/5"
        );
        assert_eq!(normalize_path("https://example.com", true), "/");
    }

    #[test]
    fn table_keys_match_across_separator_styles() {
        assert_eq!(table_key("foo/bar"), table_key("/foo/bar"));
        assert_eq!(table_key("(/:id)"), "(/:id)");
    }
}
