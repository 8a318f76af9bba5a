pub mod auth;
pub mod basic_auth;
pub mod security;

pub use auth::AuthUser;
pub use basic_auth::BasicAuthUser;
pub use security::security_headers_middleware;
