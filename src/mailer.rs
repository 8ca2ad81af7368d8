//! Outcome notification over SMTP.
//!
//! The mailer carries a fixed sender and a default recipient list and sends
//! plain-text messages over a cleartext connection. In testing mode the
//! composed message goes to stdout and nothing is transmitted.

use std::fmt;

use lettre::message::header::ContentType;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

#[derive(Debug)]
pub enum MailError {
    NoRecipients,
    Address(lettre::address::AddressError),
    Message(lettre::error::Error),
    Transport(lettre::transport::smtp::Error),
}

impl From<lettre::address::AddressError> for MailError {
    fn from(e: lettre::address::AddressError) -> Self {
        MailError::Address(e)
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(e: lettre::error::Error) -> Self {
        MailError::Message(e)
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        MailError::Transport(e)
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::NoRecipients => write!(f, "a recipient list must be provided"),
            MailError::Address(e) => write!(f, "invalid email address: {e}"),
            MailError::Message(e) => write!(f, "failed to compose message: {e}"),
            MailError::Transport(e) => write!(f, "smtp transport error: {e}"),
        }
    }
}

impl std::error::Error for MailError {}

/// SMTP notifier with a fixed sender and a default recipient list.
#[derive(Debug)]
pub struct Mailer {
    server: String,
    port: u16,
    from_address: String,
    to_address: Vec<String>,
    testing: bool,
}

impl Mailer {
    /// Errors with [`MailError::NoRecipients`] when `to_address` is empty.
    pub fn new(
        server: impl Into<String>,
        port: u16,
        from_address: impl Into<String>,
        to_address: Vec<String>,
        testing: bool,
    ) -> Result<Self, MailError> {
        if to_address.is_empty() {
            return Err(MailError::NoRecipients);
        }
        if testing {
            warn!("Mailer in testing mode, no emails will be sent");
        }
        Ok(Mailer {
            server: server.into(),
            port,
            from_address: from_address.into(),
            to_address,
            testing,
        })
    }

    /// Sends a plain-text message to the default recipients, or to
    /// `recipients` when given. Transport errors propagate unchanged.
    pub fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipients: Option<&[String]>,
    ) -> Result<(), MailError> {
        let to = recipients.unwrap_or(&self.to_address);

        let mut builder = Message::builder()
            .from(self.from_address.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for address in to {
            builder = builder.to(address.parse()?);
        }
        let message = builder.body(body.to_string())?;

        if self.testing {
            println!("*** Test email message to {to:?} ***");
            println!("{}", String::from_utf8_lossy(&message.formatted()));
            println!("*** End email message ***");
            return Ok(());
        }

        info!(
            server = %self.server,
            port = self.port,
            to = ?to,
            subject = subject,
            "Sending notification email"
        );
        // The relay speaks plain SMTP, no TLS.
        let transport = SmtpTransport::builder_dangerous(&self.server)
            .port(self.port)
            .build();
        transport.send(&message)?;
        Ok(())
    }
}
