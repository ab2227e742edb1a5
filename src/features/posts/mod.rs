//! Posts feature: the discussion board's top-level entries.
//!
//! Posts are public to read; reading the detail endpoint counts a view.
//! Writing requires authentication, and edits are restricted to the author.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::PostService;
