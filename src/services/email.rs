/// Email delivery for verification codes, welcome mail and password resets.
/// Uses lettre over SMTP.
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::SmtpTransport;
use lettre::{Message, Transport};
use std::sync::Arc;

use crate::config::EmailConfig;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        EmailService {
            config: Arc::new(config),
        }
    }

    fn create_transport(&self) -> Result<SmtpTransport> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }

    fn send(&self, to_email: &str, subject: &str, html_body: String) -> Result<()> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|_| AppError::Email("Invalid sender address".to_string()))?;
        let to = to_email
            .parse()
            .map_err(|_| AppError::Email("Invalid recipient address".to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)?;

        let mailer = self.create_transport()?;
        mailer.send(&message)?;

        Ok(())
    }

    /// The OTP mail sent on registration.
    pub fn send_verification_code(&self, to_email: &str, username: &str, code: &str) -> Result<()> {
        let body = format!(
            "<p>Hi <strong>{username}</strong>,</p>\
             <p>Your email verification code is:</p>\
             <h2>{code}</h2>\
             <p>The code expires in 10 minutes. If you didn't create this account, \
             you can ignore this email.</p>"
        );
        self.send(to_email, "OTP verification code", body)
    }

    /// Sent once the account is verified.
    pub fn send_welcome(&self, to_email: &str, username: &str) -> Result<()> {
        let body = format!(
            "<p>Hi <strong>{username}</strong>,</p>\
             <p>Your email is verified and your account is ready. Welcome aboard!</p>"
        );
        self.send(to_email, "Successfully Registered", body)
    }

    /// The OTP mail for the password reset flow.
    pub fn send_password_reset_code(&self, to_email: &str, username: &str, code: &str) -> Result<()> {
        let body = format!(
            "<p>Hi <strong>{username}</strong>,</p>\
             <p>Your password reset code is:</p>\
             <h2>{code}</h2>\
             <p>The code expires in 10 minutes. If you didn't request a reset, \
             you can ignore this email.</p>"
        );
        self.send(to_email, "Password reset code", body)
    }
}
