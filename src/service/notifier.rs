//! Notifier Service
//!
//! Outbound email for the auth flows: verification codes, welcome mail,
//! reset links, and reset confirmations. Every send is best effort from the
//! caller's point of view; a lost email never fails the operation that
//! triggered it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Datelike;
use lettre::{
    message::{header, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{debug, info};
use tera::{Context, Tera};
use thiserror::Error;

/// Notifier failure, logged and swallowed by callers
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("notifier configuration: {0}")]
    Configuration(String),

    #[error("template rendering: {0}")]
    Template(String),

    #[error("message assembly: {0}")]
    Message(String),

    #[error("smtp transport: {0}")]
    Transport(String),
}

/// Outbound notification seam
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the signup verification code
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
        validity: Duration,
    ) -> Result<(), NotifierError>;

    /// Send the welcome mail after the account is created
    async fn send_welcome(&self, to_email: &str, username: &str) -> Result<(), NotifierError>;

    /// Send the password reset link
    async fn send_reset_link(&self, to_email: &str, reset_url: &str) -> Result<(), NotifierError>;

    /// Confirm that a password reset went through
    async fn send_reset_confirmation(&self, to_email: &str) -> Result<(), NotifierError>;
}

/// SMTP configuration for the production notifier
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// From email address
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
}

impl SmtpConfig {
    /// Create SMTP configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME")
                .map_err(|_| anyhow::anyhow!("SMTP_USERNAME environment variable is required"))?,
            smtp_password: std::env::var("SMTP_PASSWORD")
                .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD environment variable is required"))?,
            from_email: std::env::var("FROM_EMAIL")
                .map_err(|_| anyhow::anyhow!("FROM_EMAIL environment variable is required"))?,
            from_name: std::env::var("FROM_NAME").unwrap_or_else(|_| "Resonate".to_string()),
        })
    }
}

/// SMTP-backed notifier with embedded templates
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Tera,
    config: SmtpConfig,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier
    pub fn new(config: SmtpConfig) -> Result<Self, NotifierError> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| {
                NotifierError::Configuration(format!("Failed to configure SMTP relay: {}", e))
            })?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let mut templates = Tera::default();
        Self::add_embedded_templates(&mut templates)?;

        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    /// Add embedded email templates
    fn add_embedded_templates(tera: &mut Tera) -> Result<(), NotifierError> {
        let verification_html = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Verify Your Email Address</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .code { font-size: 32px; font-weight: bold; color: #1db954; letter-spacing: 4px; text-align: center; margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 4px; }
        .footer { font-size: 12px; color: #666; text-align: center; margin-top: 30px; }
    </style>
</head>
<body>
    <h1>Verify Your Email Address</h1>
    <p>Hello,</p>
    <p>Use the code below to finish creating your {{ app_name }} account:</p>
    <div class="code">{{ verification_code }}</div>
    <p>This code is valid for {{ expires_in_minutes }} minutes.</p>
    <p>If you didn't sign up, you can safely ignore this email.</p>
    <div class="footer">© {{ current_year }} {{ app_name }}. All rights reserved.</div>
</body>
</html>
        "#;

        let verification_text = r#"
Verify Your Email Address

Hello,

Use the code below to finish creating your {{ app_name }} account:

{{ verification_code }} (valid for {{ expires_in_minutes }} minutes)

If you didn't sign up, you can safely ignore this email.

© {{ current_year }} {{ app_name }}. All rights reserved.
        "#;

        let reset_html = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Reset Your Password</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .button { display: inline-block; padding: 12px 24px; background: #1db954; color: white; text-decoration: none; border-radius: 4px; margin: 20px 0; }
        .footer { font-size: 12px; color: #666; text-align: center; margin-top: 30px; }
    </style>
</head>
<body>
    <h1>Reset Your Password</h1>
    <p>Hello,</p>
    <p>Someone asked to reset the password for your {{ app_name }} account. If that was you, follow the link below within the next hour:</p>
    <p><a class="button" href="{{ reset_url }}">Reset password</a></p>
    <p>Or paste this address into your browser: {{ reset_url }}</p>
    <p>If you didn't ask for a reset, ignore this email and your password stays as it is.</p>
    <div class="footer">© {{ current_year }} {{ app_name }}. All rights reserved.</div>
</body>
</html>
        "#;

        let reset_text = r#"
Reset Your Password

Hello,

Someone asked to reset the password for your {{ app_name }} account. If that
was you, open the link below within the next hour:

{{ reset_url }}

If you didn't ask for a reset, ignore this email and your password stays as
it is.

© {{ current_year }} {{ app_name }}. All rights reserved.
        "#;

        for (name, body) in [
            ("verification_email.html", verification_html),
            ("verification_email.txt", verification_text),
            ("reset_email.html", reset_html),
            ("reset_email.txt", reset_text),
        ] {
            tera.add_raw_template(name, body).map_err(|e| {
                NotifierError::Configuration(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(())
    }

    fn from_mailbox(&self) -> Result<Mailbox, NotifierError> {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| NotifierError::Configuration(format!("Invalid from address: {}", e)))
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("app_name", &self.config.from_name);
        context.insert("current_year", &chrono::Utc::now().year());
        context
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, NotifierError> {
        self.templates.render(template, context).map_err(|e| {
            NotifierError::Template(format!("Failed to render {}: {}", template, e))
        })
    }

    /// Assemble and send a text plus HTML alternative message
    async fn send_multipart(
        &self,
        to_email: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), NotifierError> {
        let message = Message::builder()
            .from(self.from_mailbox()?)
            .to(to_email
                .parse()
                .map_err(|e| NotifierError::Message(format!("Invalid recipient email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| NotifierError::Message(format!("Failed to build email message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))?;

        info!("Sent '{}' email to: {}", subject, to_email);
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
        validity: Duration,
    ) -> Result<(), NotifierError> {
        let mut context = self.base_context();
        context.insert("verification_code", code);
        context.insert("expires_in_minutes", &(validity.as_secs() / 60));

        let html_body = self.render("verification_email.html", &context)?;
        let text_body = self.render("verification_email.txt", &context)?;

        self.send_multipart(to_email, "Verify Your Email Address", text_body, html_body)
            .await
    }

    async fn send_welcome(&self, to_email: &str, username: &str) -> Result<(), NotifierError> {
        let app = &self.config.from_name;
        let html_body = format!(
            "<h1>Welcome to {}!</h1>\
             <p>Hey {},</p>\
             <p>Your email is verified and your account is live. Upload a track or dig \
             through the feed.</p>\
             <p>The {} Team</p>",
            app, username, app
        );
        let text_body = format!(
            "Welcome to {}!\n\nHey {},\n\nYour email is verified and your account is live. \
             Upload a track or dig through the feed.\n\nThe {} Team",
            app, username, app
        );

        self.send_multipart(to_email, "Welcome! Your account is live", text_body, html_body)
            .await
    }

    async fn send_reset_link(&self, to_email: &str, reset_url: &str) -> Result<(), NotifierError> {
        let mut context = self.base_context();
        context.insert("reset_url", reset_url);

        let html_body = self.render("reset_email.html", &context)?;
        let text_body = self.render("reset_email.txt", &context)?;

        self.send_multipart(to_email, "Reset Your Password", text_body, html_body)
            .await
    }

    async fn send_reset_confirmation(&self, to_email: &str) -> Result<(), NotifierError> {
        let app = &self.config.from_name;
        let html_body = format!(
            "<h1>Password changed</h1>\
             <p>The password on your {} account was just changed. If this wasn't you, \
             request a new reset immediately.</p>\
             <p>The {} Team</p>",
            app, app
        );
        let text_body = format!(
            "Password changed\n\nThe password on your {} account was just changed. If this \
             wasn't you, request a new reset immediately.\n\nThe {} Team",
            app, app
        );

        self.send_multipart(to_email, "Your password was changed", text_body, html_body)
            .await
    }
}

/// Notifier that only logs, for development without an SMTP relay
#[derive(Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
        validity: Duration,
    ) -> Result<(), NotifierError> {
        info!(
            "verification code for {}: {} (valid for {} minutes)",
            to_email,
            code,
            validity.as_secs() / 60
        );
        Ok(())
    }

    async fn send_welcome(&self, to_email: &str, username: &str) -> Result<(), NotifierError> {
        info!("welcome email for {} ({})", to_email, username);
        Ok(())
    }

    async fn send_reset_link(&self, to_email: &str, reset_url: &str) -> Result<(), NotifierError> {
        info!("reset link for {}: {}", to_email, reset_url);
        Ok(())
    }

    async fn send_reset_confirmation(&self, to_email: &str) -> Result<(), NotifierError> {
        debug!("reset confirmation for {}", to_email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SmtpConfig {
        SmtpConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "test@example.com".to_string(),
            smtp_password: "password".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Resonate".to_string(),
        }
    }

    #[tokio::test]
    async fn test_templates_are_registered() {
        let notifier = SmtpNotifier::new(test_config()).unwrap();

        for name in [
            "verification_email.html",
            "verification_email.txt",
            "reset_email.html",
            "reset_email.txt",
        ] {
            assert!(
                notifier.templates.get_template_names().any(|n| n == name),
                "missing template {}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_verification_template_renders_code() {
        let notifier = SmtpNotifier::new(test_config()).unwrap();

        let mut context = notifier.base_context();
        context.insert("verification_code", "123456");
        context.insert("expires_in_minutes", &60u64);

        let text = notifier.render("verification_email.txt", &context).unwrap();
        assert!(text.contains("123456"));
        assert!(text.contains("60 minutes"));
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new();

        notifier
            .send_verification_code("a@example.com", "123456", Duration::from_secs(3600))
            .await
            .unwrap();
        notifier.send_welcome("a@example.com", "songbird").await.unwrap();
        notifier
            .send_reset_link("a@example.com", "http://localhost:3000/reset-password/abc")
            .await
            .unwrap();
        notifier.send_reset_confirmation("a@example.com").await.unwrap();
    }
}
