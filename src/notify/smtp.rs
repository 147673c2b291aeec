use crate::config::SmtpConfig;
use crate::errors::{AppError, AppResult};
use crate::notify::{MailMessage, MailTransport, SmtpSecurity};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport as Relay, Transport};
use std::time::Duration;

/// Password variable read when the config file carries none.
pub const SMTP_PASSWORD_ENV: &str = "RATT_SMTP_PASSWORD";

/// Sends through an SMTP relay. Every strategy opens its own connection:
/// implicit TLS on the TLS port, STARTTLS or plain on the submission port.
pub struct SmtpTransport {
    host: String,
    tls_port: u16,
    submission_port: u16,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl SmtpTransport {
    pub fn new(cfg: &SmtpConfig) -> Self {
        let password = cfg
            .password
            .clone()
            .or_else(|| std::env::var(SMTP_PASSWORD_ENV).ok());

        let credentials = match (&cfg.username, password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user.clone(), pass)),
            (Some(user), None) => {
                tracing::warn!(user = %user, "smtp username without password, sending unauthenticated");
                None
            }
            _ => None,
        };

        Self {
            host: cfg.host.clone(),
            tls_port: cfg.tls_port,
            submission_port: cfg.submission_port,
            credentials,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn port(&self, security: SmtpSecurity) -> u16 {
        match security {
            SmtpSecurity::ImplicitTls => self.tls_port,
            SmtpSecurity::StartTls | SmtpSecurity::Plain => self.submission_port,
        }
    }

    fn relay(&self, security: SmtpSecurity) -> AppResult<Relay> {
        let builder = match security {
            SmtpSecurity::ImplicitTls => Relay::relay(&self.host).map_err(smtp_error)?,
            SmtpSecurity::StartTls => Relay::starttls_relay(&self.host).map_err(smtp_error)?,
            SmtpSecurity::Plain => Relay::builder_dangerous(self.host.as_str()),
        }
        .port(self.port(security))
        .timeout(Some(self.timeout));

        let builder = match &self.credentials {
            Some(c) => builder.credentials(c.clone()),
            None => builder,
        };
        Ok(builder.build())
    }
}

fn smtp_error(e: lettre::transport::smtp::Error) -> AppError {
    AppError::Mail(e.to_string())
}

fn mailbox(raw: &str) -> AppResult<Mailbox> {
    raw.parse::<Mailbox>()
        .map_err(|e| AppError::Mail(format!("address '{raw}': {e}")))
}

fn build_message(message: &MailMessage) -> AppResult<Message> {
    Message::builder()
        .from(mailbox(&message.from)?)
        .to(mailbox(&message.to)?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| AppError::Mail(e.to_string()))
}

impl MailTransport for SmtpTransport {
    fn deliver(&self, message: &MailMessage, security: SmtpSecurity) -> AppResult<()> {
        let email = build_message(message)?;
        self.relay(security)?.send(&email).map_err(smtp_error)?;

        tracing::debug!(
            host = %self.host,
            port = self.port(security),
            strategy = security.as_str(),
            "message relayed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationDispatcher, late_checkin_message};
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::thread;

    /// A port nothing listens on.
    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    /// Bare SMTP peer without extensions (so no STARTTLS and no AUTH).
    /// Each accepted DATA section is sent back through the channel.
    fn local_relay() -> (u16, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve(stream, &tx);
            }
        });
        (port, rx)
    }

    fn serve(stream: TcpStream, tx: &Sender<String>) {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut out = stream;
        let _ = out.write_all(b"220 relay.test ESMTP\r\n");

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                return;
            }
            let cmd = line.trim_end().to_ascii_uppercase();

            let reply: &[u8] = if cmd.starts_with("EHLO") || cmd.starts_with("HELO") {
                b"250 relay.test\r\n"
            } else if cmd.starts_with("MAIL") || cmd.starts_with("RCPT") || cmd == "RSET" || cmd == "NOOP" {
                b"250 OK\r\n"
            } else if cmd == "DATA" {
                let _ = out.write_all(b"354 go ahead\r\n");
                let mut data = String::new();
                loop {
                    line.clear();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 {
                        return;
                    }
                    if line == ".\r\n" {
                        break;
                    }
                    data.push_str(&line);
                }
                let _ = tx.send(data);
                b"250 queued\r\n"
            } else if cmd == "QUIT" {
                let _ = out.write_all(b"221 bye\r\n");
                return;
            } else {
                b"502 not implemented\r\n"
            };
            let _ = out.write_all(reply);
        }
    }

    fn config(tls_port: u16, submission_port: u16) -> SmtpConfig {
        SmtpConfig {
            host: "127.0.0.1".into(),
            username: None,
            password: None,
            tls_port,
            submission_port,
            timeout_secs: 5,
        }
    }

    #[test]
    fn refused_tls_and_missing_starttls_fall_through_to_plain() {
        let (port, received) = local_relay();
        let transport = SmtpTransport::new(&config(closed_port(), port));
        let msg = late_checkin_message("hr@example.com", "dave@example.com", "Dave", "09:45:00");

        assert!(transport.deliver(&msg, SmtpSecurity::ImplicitTls).is_err());
        assert!(transport.deliver(&msg, SmtpSecurity::StartTls).is_err());

        let dispatcher = NotificationDispatcher::new(Box::new(transport), "hr@example.com");
        assert!(dispatcher.notify_late("dave@example.com", "Dave", "09:45:00"));

        let data = received.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(data.contains("Subject: Late Check-In Notification"));
        assert!(data.contains("late at 09:45:00"));
        assert!(received.try_recv().is_err(), "only the plain attempt delivers");
    }

    #[test]
    fn unreachable_relay_reports_failure() {
        let closed = closed_port();
        let transport = SmtpTransport::new(&config(closed, closed));
        let dispatcher = NotificationDispatcher::new(Box::new(transport), "hr@example.com");
        assert!(!dispatcher.notify_late("dave@example.com", "Dave", "09:45:00"));
    }

    #[test]
    fn malformed_recipient_is_a_mail_error() {
        let transport = SmtpTransport::new(&config(closed_port(), closed_port()));
        let msg = late_checkin_message("hr@example.com", "not an address", "X", "10:00:00");
        assert!(matches!(
            transport.deliver(&msg, SmtpSecurity::Plain),
            Err(AppError::Mail(_))
        ));
    }
}
