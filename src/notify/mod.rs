//! Late check-in notifications.
//!
//! Delivery is best-effort: nothing here can change an attendance record or
//! the outcome reported to the caller.

pub mod smtp;
pub mod spool;
pub mod worker;

use crate::errors::AppResult;
use chrono::{DateTime, FixedOffset};

pub use smtp::SmtpTransport;
pub use spool::SpoolTransport;
pub use worker::{DisabledNotifier, LateNotice, LateNotifier, NotificationWorker};

/// Connection strategy for one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    ImplicitTls,
    StartTls,
    Plain,
}

impl SmtpSecurity {
    /// Most secure first.
    pub const FALLBACK_ORDER: [SmtpSecurity; 3] = [
        SmtpSecurity::ImplicitTls,
        SmtpSecurity::StartTls,
        SmtpSecurity::Plain,
    ];

    /// Well-known port; relays may configure others.
    pub fn port(&self) -> u16 {
        match self {
            SmtpSecurity::ImplicitTls => 465,
            SmtpSecurity::StartTls | SmtpSecurity::Plain => 587,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SmtpSecurity::ImplicitTls => "implicit-tls",
            SmtpSecurity::StartTls => "starttls",
            SmtpSecurity::Plain => "plain",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Plain-text RFC 5322 rendering.
    pub fn render(&self, date: DateTime<FixedOffset>) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
            self.from,
            self.to,
            self.subject,
            date.to_rfc2822(),
            self.body.replace('\n', "\r\n"),
        )
    }
}

pub fn late_checkin_message(from: &str, to: &str, name: &str, time: &str) -> MailMessage {
    MailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Late Check-In Notification".to_string(),
        body: format!(
            "Dear {name},\n\n\
             Our records show that you checked in late at {time} today.\n\n\
             Please keep to your scheduled start time. If something is affecting your \
             arrival, let your supervisor or HR know.\n\n\
             Best regards,\nAttendance System"
        ),
    }
}

/// Delivers one message with one connection strategy.
pub trait MailTransport: Send {
    fn deliver(&self, message: &MailMessage, security: SmtpSecurity) -> AppResult<()>;
}

/// Walks the fallback chain until a strategy delivers.
pub struct NotificationDispatcher {
    transport: Box<dyn MailTransport>,
    from: String,
}

impl NotificationDispatcher {
    pub fn new(transport: Box<dyn MailTransport>, from: impl Into<String>) -> Self {
        Self {
            transport,
            from: from.into(),
        }
    }

    /// `true` once any strategy succeeds. Failures only reach the log.
    pub fn notify_late(&self, address: &str, name: &str, time: &str) -> bool {
        let message = late_checkin_message(&self.from, address, name, time);

        for security in SmtpSecurity::FALLBACK_ORDER {
            match self.transport.deliver(&message, security) {
                Ok(()) => {
                    tracing::info!(to = address, strategy = security.as_str(), "late notification sent");
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        to = address,
                        strategy = security.as_str(),
                        error = %e,
                        "delivery attempt failed"
                    );
                }
            }
        }

        tracing::error!(to = address, "all delivery strategies failed");
        false
    }
}
