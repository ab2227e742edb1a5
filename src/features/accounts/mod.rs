//! Account feature: profiles, email change, password change and reset.
//!
//! Profile editing is restricted to the account owner (or a superuser) and
//! handles avatar replacement, including cleanup of the previous image in
//! object storage. Email changes and password resets are confirmed through
//! signed, expiring tokens delivered by mail.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/users/{id}` | No | Public profile |
//! | PUT | `/api/users/{id}` | Yes | Update profile (multipart, avatar) |
//! | POST | `/api/account/email-change` | Yes | Start email change |
//! | POST | `/api/account/email-change/confirm` | Yes | Confirm email change |
//! | POST | `/api/account/password-change` | Yes | Change password |
//! | POST | `/api/account/password-reset` | No | Request reset mail |
//! | POST | `/api/account/password-reset/confirm` | No | Complete reset |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
