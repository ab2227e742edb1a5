//! Transactional mail delivery over an HTTP JSON API.
//!
//! Speaks a Postmark-compatible wire format: a single `POST {base_url}/email`
//! with the server token in the `X-Server-Token` header. Rendering happens
//! through the embedded minijinja templates in [`super::templates`].

use minijinja::Value;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::config::MailConfig;
use crate::core::error::{AppError, Result};
use crate::modules::mail::templates;

/// Outgoing mail request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
}

/// HTTP mail API client
pub struct Mailer {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
    sender: String,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create mail HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
            api_token: config.api_token,
            sender: config.sender,
        })
    }

    /// Render the subject/body template pair and send the mail.
    ///
    /// # Arguments
    /// * `to` - Recipient address
    /// * `template_base` - Template pair prefix (e.g., "signup" renders
    ///   `signup_subject.txt` and `signup_body.txt`)
    /// * `ctx` - Template context
    pub async fn send_templated(
        &self,
        to: &str,
        template_base: &str,
        ctx: &HashMap<&str, Value>,
    ) -> Result<()> {
        let subject = templates::render_subject(&format!("{}_subject.txt", template_base), ctx)
            .map_err(|e| AppError::Internal(format!("Mail template error: {}", e)))?;
        let body = templates::render(&format!("{}_body.txt", template_base), ctx)
            .map_err(|e| AppError::Internal(format!("Mail template error: {}", e)))?;

        self.send(to, &subject, &body).await
    }

    /// Send a single plain-text mail through the delivery API.
    pub async fn send(&self, to: &str, subject: &str, text_body: &str) -> Result<()> {
        let url = format!("{}/email", self.base_url);

        let request_body = SendEmailRequest {
            from: &self.sender,
            to,
            subject,
            text_body,
        };

        let response = self
            .http_client
            .post(&url)
            .header("X-Server-Token", &self.api_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach mail API: {}", e);
                AppError::ExternalServiceError(format!("Failed to send mail: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Mail API error: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Failed to send mail: HTTP {}",
                status
            )));
        }

        tracing::info!("Mail sent: to={}, subject={}", to, subject);
        Ok(())
    }
}
