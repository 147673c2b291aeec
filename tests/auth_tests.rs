use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD, TestEnv};

#[test]
fn test_init_seeds_default_accounts() {
    let env = TestEnv::new("init_seeds");

    env.ratt()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized").and(contains("2 default account(s) created")));

    // second init finds the accounts already there
    env.ratt()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("default account(s) created").not());
}

#[test]
fn test_login_and_whoami() {
    let env = TestEnv::new("login_whoami");
    env.init();

    let token = env.admin();
    assert_eq!(token.len(), 64);

    env.as_user(&token)
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("admin@admin.com").and(contains("Admin")).and(contains("/admin")));
}

#[test]
fn test_login_with_wrong_password_fails() {
    let env = TestEnv::new("login_wrong_pw");
    env.init();

    env.ratt()
        .args(["login", "admin@admin.com", "--password", "nope"])
        .assert()
        .failure()
        .stderr(contains("Invalid credentials"));
}

#[test]
fn test_logout_revokes_token() {
    let env = TestEnv::new("logout");
    env.init();
    let token = env.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD);

    env.as_user(&token).arg("logout").assert().success();

    env.as_user(&token)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(contains("Not authenticated"));
}

#[test]
fn test_missing_token_points_to_login() {
    let env = TestEnv::new("no_token");
    env.init();

    env.ratt()
        .args(["identity", "list"])
        .assert()
        .failure()
        .stderr(contains("Not authenticated").and(contains("rattendance login")));
}

#[test]
fn test_employee_is_sent_to_attendance_page() {
    let env = TestEnv::new("employee_forbidden");
    env.init();
    let token = env.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD);

    env.as_user(&token)
        .args(["records", "list"])
        .assert()
        .failure()
        .stderr(contains("Forbidden").and(contains("/attendance")));
}

#[test]
fn test_token_from_environment() {
    let env = TestEnv::new("token_env");
    env.init();
    let token = env.admin();

    env.ratt()
        .env("RATT_SESSION", &token)
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("Administrator"));
}
