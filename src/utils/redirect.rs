/// Where notice mutations land when no usable `next` target was given.
pub const NOTICES_PATH: &str = "/api/v1/notices";

/// Pick the redirect target for a notice mutation.
///
/// Only same-origin absolute paths are honoured; anything else (full URLs,
/// protocol-relative `//host` paths, backslashes, control characters) falls
/// back to the notice list.
pub fn safe_next(next: Option<&str>) -> &str {
    match next.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(|c| c.is_ascii_control()) =>
        {
            path
        }
        _ => NOTICES_PATH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::{IntoResponse, Redirect};

    #[test]
    fn keeps_local_paths() {
        assert_eq!(safe_next(Some("/inbox?page=2")), "/inbox?page=2");
    }

    #[test]
    fn falls_back_when_missing() {
        assert_eq!(safe_next(None), NOTICES_PATH);
        assert_eq!(safe_next(Some("")), NOTICES_PATH);
    }

    #[test]
    fn rejects_offsite_targets() {
        assert_eq!(safe_next(Some("https://evil.example")), NOTICES_PATH);
        assert_eq!(safe_next(Some("//evil.example/x")), NOTICES_PATH);
        assert_eq!(safe_next(Some("/\\evil.example")), NOTICES_PATH);
    }

    #[test]
    fn rejects_control_characters() {
        // Browsers drop tabs, turning this into `//evil.example`
        assert_eq!(safe_next(Some("/\t/evil.example")), NOTICES_PATH);
        assert_eq!(safe_next(Some("/inbox\nx")), NOTICES_PATH);
        assert_eq!(safe_next(Some("/inbox\r\nSet-Cookie: a=b")), NOTICES_PATH);
        assert_eq!(safe_next(Some("/inbox\u{7f}")), NOTICES_PATH);
    }

    #[test]
    fn chosen_target_is_a_valid_location() {
        for next in ["/inbox", "/x\ny", "/\t/evil.example", "https://evil.example"] {
            let response = Redirect::to(safe_next(Some(next))).into_response();
            assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
            assert!(response
                .headers()
                .contains_key(axum::http::header::LOCATION));
        }
    }
}
