use crate::errors::AppResult;
use crate::notify::{MailMessage, MailTransport, SmtpSecurity};
use chrono::Utc;
use chrono_tz::Tz;
use rand::RngCore;
use rand::rngs::OsRng;
use std::fs;
use std::path::PathBuf;

/// Drops rendered messages into a pickup directory served by the local MTA.
///
/// The MTA owns the onward connection, so the first strategy always lands.
pub struct SpoolTransport {
    dir: PathBuf,
    tz: Tz,
}

impl SpoolTransport {
    pub fn new(dir: impl Into<PathBuf>, tz: Tz) -> Self {
        Self { dir: dir.into(), tz }
    }
}

impl MailTransport for SpoolTransport {
    fn deliver(&self, message: &MailMessage, _security: SmtpSecurity) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;

        let now = Utc::now().with_timezone(&self.tz);
        let mut suffix = [0u8; 4];
        OsRng.fill_bytes(&mut suffix);

        let file = self.dir.join(format!(
            "{}-{}.eml",
            now.format("%Y%m%dT%H%M%S"),
            hex::encode(suffix)
        ));

        let body = message.render(now.fixed_offset());

        // write under a temp name so the MTA never picks up a partial file
        let partial = file.with_extension("part");
        fs::write(&partial, body)?;
        fs::rename(&partial, &file)?;

        tracing::debug!(path = %file.display(), "message spooled");
        Ok(())
    }
}
