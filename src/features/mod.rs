pub mod accounts;
pub mod auth;
pub mod comments;
pub mod posts;
