//! Endpoint key normalization, performed before every `check_limit` call.

/// The fixed set of paths that bypass every gate.
pub const EXEMPT_PATHS: &[&str] = &["/health", "/ready", "/live", "/metrics"];

pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

/// Strips a trailing slash, then replaces any path segment longer than
/// 8 characters made up only of `[A-Za-z0-9_-]` with the literal token
/// `{id}` — collapsing per-resource identifiers so distinct resources
/// under the same route share one endpoint bucket.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed
        .split('/')
        .map(|segment| {
            if segment.len() > 8 && segment.chars().all(is_id_char) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Builds the `METHOD:normalized_path` endpoint key.
pub fn endpoint_key(method: &str, path: &str) -> String {
    format!("{}:{}", method, normalize_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        assert_eq!(normalize_path("/api/v1/sessions/"), "/api/v1/sessions");
    }

    #[test]
    fn replaces_long_alnum_segments_with_id_token() {
        assert_eq!(
            normalize_path("/api/v1/sessions/abcdef1234567890"),
            "/api/v1/sessions/{id}"
        );
    }

    #[test]
    fn short_segments_are_left_alone() {
        assert_eq!(normalize_path("/api/v1/sessions/abc"), "/api/v1/sessions/abc");
    }

    #[test]
    fn segments_with_non_id_characters_are_left_alone() {
        assert_eq!(
            normalize_path("/api/v1/sessions/has.a.dot.in.it"),
            "/api/v1/sessions/has.a.dot.in.it"
        );
    }

    #[test]
    fn endpoint_key_combines_method_and_normalized_path() {
        assert_eq!(
            endpoint_key("GET", "/api/v1/sessions/abcdef1234567890/"),
            "GET:/api/v1/sessions/{id}"
        );
    }

    #[test]
    fn exempt_paths_are_recognized() {
        assert!(is_exempt("/health"));
        assert!(is_exempt("/metrics"));
        assert!(!is_exempt("/api/v1/sessions"));
    }
}
