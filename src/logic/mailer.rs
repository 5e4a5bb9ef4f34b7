//! Report Mailer - sends the report artifact as an email attachment
//!
//! One message per request: fixed subject and body, with the plain-text
//! report attached. Credentials come from the environment; a missing
//! credential pair means email is simply unavailable, not an error.

use std::env;
use std::fs;
use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::constants;

const REPORT_SUBJECT: &str = "Customer Churn Risk Report";
const REPORT_BODY: &str = "Attached is the churn explanation report.";

/// SMTP credentials and endpoint
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub address: String,
    pub password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl EmailConfig {
    /// Read the config from the environment. Returns `None` unless both
    /// `EMAIL_ADDRESS` and `EMAIL_PASSWORD` are set; host and port have
    /// working defaults.
    pub fn from_env() -> Option<Self> {
        let address = env::var("EMAIL_ADDRESS").ok()?;
        let password = env::var("EMAIL_PASSWORD").ok()?;
        let smtp_host =
            env::var("SMTP_HOST").unwrap_or_else(|_| constants::DEFAULT_SMTP_HOST.to_string());
        let smtp_port = env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(constants::DEFAULT_SMTP_PORT);
        Some(Self {
            address,
            password,
            smtp_host,
            smtp_port,
        })
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address '{address}': {reason}")]
    BadAddress { address: String, reason: String },

    #[error("failed to read report {0}")]
    Attachment(std::path::PathBuf),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP failure: {0}")]
    Smtp(String),
}

/// Sending abstraction so the delivery path is swappable in tests.
pub trait ReportMailer: Send + Sync {
    fn send_report(&self, recipient: &str, report_path: &Path) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, recipient: &str, report_path: &Path) -> Result<Message, MailError> {
        let bytes = fs::read(report_path)
            .map_err(|_| MailError::Attachment(report_path.to_path_buf()))?;
        let filename = report_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "churn_report.txt".to_string());

        Message::builder()
            .from(self.config.address.parse().map_err(|e| {
                MailError::BadAddress {
                    address: self.config.address.clone(),
                    reason: format!("{e}"),
                }
            })?)
            .to(recipient.parse().map_err(|e| MailError::BadAddress {
                address: recipient.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(REPORT_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(REPORT_BODY.to_string()))
                    .singlepart(
                        Attachment::new(filename).body(bytes, ContentType::TEXT_PLAIN),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

impl ReportMailer for SmtpMailer {
    fn send_report(&self, recipient: &str, report_path: &Path) -> Result<(), MailError> {
        let message = self.build_message(recipient, report_path)?;

        let credentials = Credentials::new(
            self.config.address.clone(),
            self.config.password.clone(),
        );
        let transport = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .credentials(credentials)
            .port(self.config.smtp_port)
            .build();

        transport
            .send(&message)
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        log::info!("Report emailed to {}", recipient);
        Ok(())
    }
}

/// Records send calls instead of delivering, for tests.
#[derive(Debug, Default)]
pub struct MockMailer {
    pub sent: std::sync::RwLock<Vec<(String, std::path::PathBuf)>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }
}

impl ReportMailer for MockMailer {
    fn send_report(&self, recipient: &str, report_path: &Path) -> Result<(), MailError> {
        self.sent
            .write()
            .unwrap()
            .push((recipient.to_string(), report_path.to_path_buf()));
        Ok(())
    }
}
