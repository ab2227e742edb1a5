//! Mail template rendering using Jinja2 syntax.
//!
//! Templates are embedded into the binary from `templates/mail/` and rendered
//! with minijinja. Every mail has a `*_subject.txt` and a `*_body.txt`
//! template; subjects are collapsed to a single line after rendering.

use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

const TEMPLATES: &[(&str, &str)] = &[
    (
        "signup_subject.txt",
        include_str!("../../../templates/mail/signup_subject.txt"),
    ),
    (
        "signup_body.txt",
        include_str!("../../../templates/mail/signup_body.txt"),
    ),
    (
        "email_change_subject.txt",
        include_str!("../../../templates/mail/email_change_subject.txt"),
    ),
    (
        "email_change_body.txt",
        include_str!("../../../templates/mail/email_change_body.txt"),
    ),
    (
        "password_reset_subject.txt",
        include_str!("../../../templates/mail/password_reset_subject.txt"),
    ),
    (
        "password_reset_body.txt",
        include_str!("../../../templates/mail/password_reset_body.txt"),
    ),
];

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, content) in TEMPLATES {
        if let Err(e) = env.add_template(name, content) {
            tracing::warn!("Failed to load mail template {}: {}", name, e);
        }
    }

    env
}

/// Get the global template environment
fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a mail template with the given context.
///
/// # Arguments
/// * `template_name` - The template file name (e.g., "signup_body.txt")
/// * `ctx` - A HashMap of variable names to values
pub fn render(template_name: &str, ctx: &HashMap<&str, Value>) -> Result<String, TemplateError> {
    let env = get_environment();

    let template = env
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Render a subject template and collapse it to a single line.
///
/// Subject templates may carry trailing newlines from the file; mail
/// providers reject multi-line subjects.
pub fn render_subject(
    template_name: &str,
    ctx: &HashMap<&str, Value>,
) -> Result<String, TemplateError> {
    let rendered = render(template_name, ctx)?;
    Ok(rendered
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with_link() -> HashMap<&'static str, Value> {
        let mut ctx = HashMap::new();
        ctx.insert("username", Value::from("taro"));
        ctx.insert("link", Value::from("http://localhost:3000/activate?token=abc"));
        ctx
    }

    #[test]
    fn test_render_signup_body_contains_link() {
        let body = render("signup_body.txt", &ctx_with_link()).unwrap();
        assert!(body.contains("http://localhost:3000/activate?token=abc"));
        assert!(body.contains("taro"));
    }

    #[test]
    fn test_render_subject_is_single_line() {
        let subject = render_subject("signup_subject.txt", &ctx_with_link()).unwrap();
        assert!(!subject.contains('\n'));
        assert!(!subject.is_empty());
    }

    #[test]
    fn test_render_unknown_template() {
        let err = render("nope.txt", &HashMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }
}
