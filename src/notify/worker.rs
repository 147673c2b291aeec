use crate::notify::NotificationDispatcher;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

/// What the recorder hands over after a late check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LateNotice {
    pub email: String,
    pub name: String,
    pub time: String,
}

/// Fire-and-forget scheduling: no result ever flows back to the caller.
pub trait LateNotifier {
    fn schedule(&self, notice: LateNotice);
}

/// Used when notifications are switched off or no transport is configured.
pub struct DisabledNotifier;

impl LateNotifier for DisabledNotifier {
    fn schedule(&self, notice: LateNotice) {
        tracing::info!(to = %notice.email, "notifications disabled, late notice skipped");
    }
}

/// Background thread draining a queue of late notices.
///
/// Dropping the worker closes the queue and waits for queued notices, so a
/// notice scheduled by a finished request is still delivered.
pub struct NotificationWorker {
    tx: Option<Sender<LateNotice>>,
    handle: Option<JoinHandle<()>>,
}

impl NotificationWorker {
    pub fn spawn(dispatcher: NotificationDispatcher) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<LateNotice>();

        let handle = thread::Builder::new()
            .name("late-notifier".into())
            .spawn(move || {
                for notice in rx {
                    // outcome intentionally unobserved
                    let _ = dispatcher.notify_late(&notice.email, &notice.name, &notice.time);
                }
            })?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Close the queue and wait for pending deliveries.
    pub fn shutdown(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("notification worker panicked");
        }
    }
}

impl LateNotifier for NotificationWorker {
    fn schedule(&self, notice: LateNotice) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(notice) {
            tracing::warn!(to = %e.0.email, "notification worker gone, late notice dropped");
        }
    }
}

impl Drop for NotificationWorker {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, AppResult};
    use crate::notify::{MailMessage, MailTransport, SmtpSecurity};
    use std::sync::{Arc, Mutex};

    struct Collect(Arc<Mutex<Vec<String>>>);

    impl MailTransport for Collect {
        fn deliver(&self, message: &MailMessage, _security: SmtpSecurity) -> AppResult<()> {
            self.0.lock().unwrap().push(message.to.clone());
            Ok(())
        }
    }

    struct Broken;

    impl MailTransport for Broken {
        fn deliver(&self, _message: &MailMessage, _security: SmtpSecurity) -> AppResult<()> {
            Err(AppError::Other("connection refused".into()))
        }
    }

    fn notice(email: &str) -> LateNotice {
        LateNotice {
            email: email.into(),
            name: "X".into(),
            time: "09:30:00".into(),
        }
    }

    #[test]
    fn shutdown_drains_queued_notices() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let worker = NotificationWorker::spawn(NotificationDispatcher::new(
            Box::new(Collect(Arc::clone(&sent))),
            "hr@example.com",
        ))
        .unwrap();

        worker.schedule(notice("a@example.com"));
        worker.schedule(notice("b@example.com"));
        worker.shutdown();

        assert_eq!(*sent.lock().unwrap(), vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn failing_transport_never_reaches_the_caller() {
        let worker = NotificationWorker::spawn(NotificationDispatcher::new(
            Box::new(Broken),
            "hr@example.com",
        ))
        .unwrap();

        worker.schedule(notice("a@example.com"));
        drop(worker);
    }
}
