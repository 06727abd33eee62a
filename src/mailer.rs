use crate::config::{AppConfig, SmtpConfig};
use crate::engine::FailureRecord;
use crate::error::Error;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

/// Deferred per-pass failure notification. The engine never talks SMTP
/// itself; it hands its failure list to whichever notifier is wired in.
pub trait FailureNotifier {
    /// No-op when `failures` is empty. A failed send is the caller's
    /// problem to log; it is never retried within the same pass.
    fn send_failure_report(&self, failures: &[FailureRecord]) -> Result<(), Error>;
}

/// Used when no recipient or SMTP host is configured.
pub struct NoopMailer;

impl FailureNotifier for NoopMailer {
    fn send_failure_report(&self, failures: &[FailureRecord]) -> Result<(), Error> {
        if !failures.is_empty() {
            warn!(
                "{} failures this pass, but no mail recipient is configured.",
                failures.len()
            );
        }
        Ok(())
    }
}

/// Blocking SMTP delivery of the failure report, one message per pass.
pub struct SmtpMailer {
    smtp: SmtpConfig,
    recipient: String,
}

impl SmtpMailer {
    pub fn new(smtp: SmtpConfig, recipient: String) -> Self {
        Self { smtp, recipient }
    }

    fn compose_body(failures: &[FailureRecord]) -> String {
        let mut body = String::from("Errors occurred while organizing files:\n");
        for record in failures {
            body.push_str(&format!("- {}: {}\n", record.path.display(), record.error));
        }
        body
    }
}

impl FailureNotifier for SmtpMailer {
    fn send_failure_report(&self, failures: &[FailureRecord]) -> Result<(), Error> {
        if failures.is_empty() {
            return Ok(());
        }

        let from = self
            .smtp
            .user
            .clone()
            .unwrap_or_else(|| "neat-freak@localhost".to_string());
        let message = Message::builder()
            .from(from.parse::<Mailbox>()?)
            .to(self.recipient.parse::<Mailbox>()?)
            .subject("File Organizer Errors")
            .body(Self::compose_body(failures))?;

        let builder = if self.smtp.use_tls {
            SmtpTransport::starttls_relay(&self.smtp.host)?
        } else {
            SmtpTransport::builder_dangerous(&self.smtp.host)
        };
        let mut builder = builder.port(self.smtp.port);
        if let (Some(user), Some(password)) = (&self.smtp.user, &self.smtp.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        builder.build().send(&message)?;
        info!("Error report emailed to {}.", self.recipient);
        Ok(())
    }
}

/// Pick the notifier for this process: SMTP when both a recipient and a
/// host are configured, otherwise the no-op.
pub fn build_notifier(config: &AppConfig) -> Box<dyn FailureNotifier> {
    match (&config.email, &config.smtp) {
        (Some(email), Some(smtp)) => Box::new(SmtpMailer::new(smtp.clone(), email.clone())),
        (Some(_), None) => {
            warn!("EMAIL is set but SMTP_HOST is not; failure reports are disabled.");
            Box::new(NoopMailer)
        }
        _ => Box::new(NoopMailer),
    }
}
