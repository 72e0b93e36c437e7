//! Outbound email.
//!
//! Delivery goes through an HTTP mail relay that accepts a JSON message at
//! `{base_url}/email`. When mail is disabled the message is logged instead,
//! which keeps local signups usable without a relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail relay rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    sender: String,
    api_token: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let base_url = format!("{}/", config.base_url.trim_end_matches('/'));
        let base = Url::parse(&base_url)
            .map_err(|e| anyhow::anyhow!("Invalid mail base URL '{}': {e}", config.base_url))?;
        let endpoint = base
            .join("email")
            .map_err(|e| anyhow::anyhow!("Invalid mail endpoint: {e}"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Ballotbox/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build mail HTTP client: {e}"))?;

        Ok(Self {
            client,
            endpoint,
            sender: config.sender.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let body = SendEmailRequest {
            from: &self.sender,
            to: &mail.to,
            subject: &mail.subject,
            html_body: &mail.html_body,
            text_body: &mail.text_body,
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %mail.to, "Mail accepted by relay");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            "Mail delivery disabled; message follows:\n{}",
            mail.text_body
        );
        Ok(())
    }
}

pub fn build_mailer(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.enabled {
        Ok(Arc::new(HttpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}

/// Builds the signup verification message.
#[must_use]
pub fn verification_mail(username: &str, email: &str, link: &str) -> OutgoingMail {
    let html_body = format!(
        "<p>Hello {name},</p>\
         <p>Thanks for signing up. Please confirm your email address to activate your account:</p>\
         <p><a href=\"{href}\">Verify my email</a></p>\
         <p>If the button does not work, open this link: {text}</p>",
        name = html_escape::encode_text(username),
        href = html_escape::encode_double_quoted_attribute(link),
        text = html_escape::encode_text(link),
    );

    let text_body = html2text::from_read(html_body.as_bytes(), 80).unwrap_or_else(|_| {
        format!("Hello {username},\n\nConfirm your email address by opening: {link}\n")
    });

    OutgoingMail {
        to: email.to_string(),
        subject: "Verify your Online Voting System account".to_string(),
        html_body,
        text_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_mail_escapes_username() {
        let mail = verification_mail("<b>eve</b>", "eve@x.com", "http://h/verify_email/abc");
        assert!(mail.html_body.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(!mail.html_body.contains("<b>eve</b>"));
        assert_eq!(mail.to, "eve@x.com");
    }

    #[test]
    fn verification_mail_text_part_carries_link() {
        let mail = verification_mail("alice", "a@x.com", "http://h/verify_email/abc");
        assert!(mail.text_body.contains("http://h/verify_email/abc"));
        assert!(mail.text_body.contains("alice"));
    }

    #[test]
    fn disabled_mail_builds_log_mailer() {
        assert!(build_mailer(&MailConfig::default()).is_ok());
    }

    #[test]
    fn http_mailer_rejects_bad_base_url() {
        let config = MailConfig {
            enabled: true,
            base_url: "not a url".to_string(),
            ..MailConfig::default()
        };
        assert!(HttpMailer::new(&config).is_err());
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mail = verification_mail("bob", "b@x.com", "http://h/verify_email/xyz");
        assert!(LogMailer.send(&mail).await.is_ok());
    }
}
