use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}

/// Parse an `Authorization: Basic <base64(user:pass)>` header value.
///
/// The scheme name is matched case-insensitively. The password may itself
/// contain colons; only the first colon separates it from the username.
pub fn parse_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() {
        return None;
    }

    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn parses_basic_header() {
        assert_eq!(
            parse_basic_credentials(&basic("alice:s3cret")),
            Some(("alice".to_string(), "s3cret".to_string()))
        );
    }

    #[test]
    fn password_may_contain_colons() {
        assert_eq!(
            parse_basic_credentials(&basic("bob:a:b:c")),
            Some(("bob".to_string(), "a:b:c".to_string()))
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let header = format!("basic {}", STANDARD.encode("carol:pw"));
        assert!(parse_basic_credentials(&header).is_some());
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(parse_basic_credentials("Bearer abc"), None);
        assert_eq!(parse_basic_credentials("Basic !!!not-base64"), None);
        assert_eq!(parse_basic_credentials(&basic("no-colon")), None);
        assert_eq!(parse_basic_credentials(&basic(":empty-user")), None);
        assert_eq!(parse_basic_credentials("Basic"), None);
    }
}
