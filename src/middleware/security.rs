use crate::config::parse_bool_env;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::{env, sync::OnceLock};

/// JSON API plus the Swagger UI, which loads its own scripts and inline styles.
const DEFAULT_CSP_POLICY: &str = "default-src 'self'; base-uri 'self'; frame-ancestors 'none'; object-src 'none'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Response headers added to every reply.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    csp: HeaderValue,
    enable_hsts: bool,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            csp: HeaderValue::from_static(DEFAULT_CSP_POLICY),
            enable_hsts: true,
        }
    }
}

impl SecurityHeaders {
    /// Reads `CSP_POLICY` and `ENABLE_HSTS`. An unusable policy falls back to the default.
    pub fn from_env() -> Self {
        let csp = match env::var("CSP_POLICY") {
            Ok(raw) => HeaderValue::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(%err, "invalid CSP_POLICY, using the default policy");
                HeaderValue::from_static(DEFAULT_CSP_POLICY)
            }),
            Err(_) => HeaderValue::from_static(DEFAULT_CSP_POLICY),
        };

        Self {
            csp,
            enable_hsts: parse_bool_env("ENABLE_HSTS", true),
        }
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert("content-security-policy", self.csp.clone());
        headers.insert(
            "x-content-type-options",
            HeaderValue::from_static("nosniff"),
        );
        headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
        headers.insert("referrer-policy", HeaderValue::from_static("same-origin"));
        headers.insert(
            "cross-origin-resource-policy",
            HeaderValue::from_static("same-origin"),
        );

        if self.enable_hsts {
            headers.insert(
                "strict-transport-security",
                HeaderValue::from_static(HSTS_VALUE),
            );
        }
    }
}

fn security_headers() -> &'static SecurityHeaders {
    static CONFIG: OnceLock<SecurityHeaders> = OnceLock::new();
    CONFIG.get_or_init(SecurityHeaders::from_env)
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    security_headers().apply(response.headers_mut());
    response
}
