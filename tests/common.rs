#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use image::{ImageFormat, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const EMPLOYEE_EMAIL: &str = "employee@test.com";
pub const EMPLOYEE_PASSWORD: &str = "emp123";

/// Isolated home directory plus database for one test.
///
/// `HOME` points at the temp dir so no real configuration file is read.
pub struct TestEnv {
    pub home: TempDir,
    pub db: String,
}

impl TestEnv {
    pub fn new(name: &str) -> Self {
        let home = TempDir::new().expect("temp home");
        let db = home
            .path()
            .join(format!("{name}_rattendance.sqlite"))
            .to_string_lossy()
            .to_string();
        Self { home, db }
    }

    /// Binary with `--db` and the isolated environment, no session.
    pub fn ratt(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rattendance");
        cmd.env("HOME", self.home.path())
            .env_remove("RATT_SESSION")
            .env_remove("RATT_PASSWORD")
            .env_remove("RUST_LOG")
            .env_remove("RATT_CLOCK")
            .env_remove("RATT_SMTP_PASSWORD")
            .args(["--db", &self.db]);
        cmd
    }

    /// Same as `ratt` with `--token`.
    pub fn as_user(&self, token: &str) -> Command {
        let mut cmd = self.ratt();
        cmd.args(["--token", token]);
        cmd
    }

    /// `init` in test mode (schema plus default accounts).
    pub fn init(&self) {
        self.ratt().args(["--test", "init"]).assert().success();
    }

    /// Log in and return the raw session token.
    pub fn login(&self, email: &str, password: &str) -> String {
        let out = self
            .ratt()
            .args(["login", email, "--password", password, "--raw"])
            .output()
            .expect("run login");
        assert!(out.status.success(), "login failed: {out:?}");
        String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .expect("token line")
            .to_string()
    }

    pub fn admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD)
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.home.path().join(file)
    }

    /// Write a synthetic face photo and return its path.
    pub fn photo(&self, file: &str, seed: u32) -> String {
        let path = self.path(file);
        fs::write(&path, noisy_png(seed)).expect("write photo");
        path.to_string_lossy().to_string()
    }

    /// Register an employee with the photo generated from `seed`.
    pub fn register(&self, admin: &str, name: &str, email: &str, seed: u32) {
        let photo = self.photo(&format!("ref_{seed}.png"), seed);
        self.as_user(admin)
            .args(["identity", "register", "--name", name, "--email", email, "--photo", &photo])
            .assert()
            .success();
    }

    /// `attend` at a pinned clock reading (debug builds, admin sessions).
    pub fn attend(&self, token: &str, action: &str, photo: &str, at: &str) -> Command {
        let mut cmd = self.as_user(token);
        cmd.env("RATT_CLOCK", at)
            .args(["attend", action, "--photo", photo]);
        cmd
    }
}

/// 64x64 grayscale noise, stable per seed; different seeds do not match.
pub fn noisy_png(seed: u32) -> Vec<u8> {
    let mut state = seed;
    let img = RgbImage::from_fn(64, 64, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let v = (state >> 24) as u8;
        image::Rgb([v, v, v])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

pub fn spool_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "eml"))
            .collect(),
        Err(_) => Vec::new(),
    }
}
