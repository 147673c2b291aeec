use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::TestEnv;

#[test]
fn test_db_info_and_check() {
    let env = TestEnv::new("db_info");
    env.init();

    env.ratt()
        .args(["db", "--info", "--check"])
        .assert()
        .success()
        .stdout(
            contains("Accounts:")
                .and(contains("Integrity check passed"))
                .and(contains("Attendance records:")),
        );
}

#[test]
fn test_db_migrate_is_idempotent() {
    let env = TestEnv::new("db_migrate");
    env.init();

    env.ratt()
        .args(["db", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Migration completed").and(contains("Migration applied").not()));
}

#[test]
fn test_db_vacuum() {
    let env = TestEnv::new("db_vacuum");
    env.init();

    env.ratt()
        .args(["db", "--vacuum"])
        .assert()
        .success()
        .stdout(contains("Vacuum completed"));
}
