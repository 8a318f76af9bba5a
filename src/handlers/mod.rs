pub mod auth;
pub mod feed;
pub mod notice;
pub mod notice_type;
pub mod settings;

pub use auth::*;
