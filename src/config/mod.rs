use crate::errors::{AppError, AppResult};
use crate::faces::scanner::MatchPolicy;
use crate::notify::SmtpSecurity;
use crate::utils::time::parse_time;
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// SMTP relay used for late notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Falls back to `RATT_SMTP_PASSWORD` when omitted.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Implicit TLS port.
    #[serde(default = "default_tls_port")]
    pub tls_port: u16,
    /// Submission port shared by STARTTLS and plain.
    #[serde(default = "default_submission_port")]
    pub submission_port: u16,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

/// Late-notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_from")]
    pub from: String,
    /// Relay to send through; takes precedence over `spool_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpConfig>,
    /// Pickup directory watched by the local MTA.
    #[serde(default)]
    pub spool_dir: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: default_from(),
            smtp: None,
            spool_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_late_cutoff")]
    pub late_cutoff: String,
    #[serde(default)]
    pub match_policy: MatchPolicy,
    #[serde(default = "default_min_image_bytes")]
    pub min_image_bytes: usize,
    #[serde(default = "default_face_threshold")]
    pub face_threshold: f64,
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,
    #[serde(default)]
    pub notify: NotifyConfig,
}

fn default_timezone() -> String {
    "Asia/Karachi".to_string()
}
fn default_late_cutoff() -> String {
    "09:00:00".to_string()
}
fn default_min_image_bytes() -> usize {
    1000
}
fn default_face_threshold() -> f64 {
    0.30
}
fn default_seed_defaults() -> bool {
    true
}
fn default_from() -> String {
    "attendance@localhost".to_string()
}
fn default_tls_port() -> u16 {
    SmtpSecurity::ImplicitTls.port()
}
fn default_submission_port() -> u16 {
    SmtpSecurity::StartTls.port()
}
fn default_smtp_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            timezone: default_timezone(),
            late_cutoff: default_late_cutoff(),
            match_policy: MatchPolicy::default(),
            min_image_bytes: default_min_image_bytes(),
            face_threshold: default_face_threshold(),
            seed_defaults: default_seed_defaults(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rattendance")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rattendance")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fail early on values the engine would otherwise reject at first use.
    pub fn validate(&self) -> AppResult<()> {
        self.tz()?;
        self.cutoff()?;
        if !(0.0..=2.0).contains(&self.face_threshold) {
            return Err(AppError::Config(format!(
                "face_threshold must be within 0.0..=2.0, got {}",
                self.face_threshold
            )));
        }
        if let Some(smtp) = &self.notify.smtp
            && smtp.host.trim().is_empty()
        {
            return Err(AppError::Config("notify.smtp.host must not be empty".into()));
        }
        Ok(())
    }

    /// Civil timezone used for attendance keys, the late cutoff and reports.
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Config(format!("unknown timezone '{}'", self.timezone)))
    }

    pub fn cutoff(&self) -> AppResult<NaiveTime> {
        parse_time(&self.late_cutoff)
            .ok_or_else(|| AppError::Config(format!("invalid late_cutoff '{}'", self.late_cutoff)))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> io::Result<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = PathBuf::from(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(io::Error::other)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\n").unwrap();
        assert_eq!(cfg.timezone, "Asia/Karachi");
        assert_eq!(cfg.cutoff().unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(cfg.match_policy, MatchPolicy::FirstMatch);
        assert_eq!(cfg.min_image_bytes, 1000);
        assert!(!cfg.notify.enabled);
    }

    #[test]
    fn rejects_unknown_timezone() {
        let cfg = Config {
            timezone: "Mars/Olympus".into(),
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn policy_uses_kebab_case() {
        let cfg: Config =
            serde_yaml::from_str("database: x\nmatch_policy: best-match\n").unwrap();
        assert_eq!(cfg.match_policy, MatchPolicy::BestMatch);
    }

    #[test]
    fn smtp_block_takes_port_defaults() {
        let cfg: Config = serde_yaml::from_str(
            "database: x\nnotify:\n  enabled: true\n  smtp:\n    host: mail.example.com\n    username: hr@example.com\n",
        )
        .unwrap();
        let smtp = cfg.notify.smtp.as_ref().unwrap();
        assert_eq!(smtp.tls_port, 465);
        assert_eq!(smtp.submission_port, 587);
        assert_eq!(smtp.password, None);
        assert!(cfg.validate().is_ok());
    }
}
