pub mod auth;
pub mod feed;
pub mod notice;
pub mod notice_setting;
pub mod notice_type;
