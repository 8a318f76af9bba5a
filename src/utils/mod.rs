pub mod cookie;
pub mod credentials;
pub mod jwt;
pub mod redirect;

pub use credentials::{hash_password, parse_basic_credentials, verify_password};
pub use jwt::encode_access_token;
pub use redirect::safe_next;
