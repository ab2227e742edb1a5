//! Mail module for transactional account mail
//!
//! Provides an HTTP mail API client and embedded minijinja templates for
//! the activation, email-change, and password-reset mails.

mod mailer;
pub mod templates;

pub use mailer::Mailer;
