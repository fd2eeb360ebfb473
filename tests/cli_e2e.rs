//! End-to-end CLI tests for the offline command paths (argument handling,
//! provider table, error reporting). Network-backed commands are covered
//! by the wiremock integration tests instead.

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn cdnget() -> Command {
    Command::cargo_bin("cdnget").unwrap()
}

#[test]
fn test_no_arguments_lists_providers_with_site_urls() {
    cdnget()
        .assert()
        .success()
        .stdout(predicate::str::contains("cdnjs       # https://cdnjs.com/"))
        .stdout(predicate::str::contains(
            "jsdelivr    # https://www.jsdelivr.com/",
        ))
        .stdout(predicate::str::contains("unpkg       # https://unpkg.com/"))
        .stdout(predicate::str::contains(
            "google      # https://developers.google.com/speed/libraries/",
        ));
}

#[test]
fn test_quiet_provider_listing_is_codes_only() {
    cdnget()
        .arg("-q")
        .assert()
        .success()
        .stdout("cdnjs\njsdelivr\nunpkg\ngoogle\n");
}

#[test]
fn test_unknown_cdn_code_reports_and_fails() {
    cdnget()
        .arg("blablabla")
        .assert()
        .failure()
        .stderr("blablabla: no such CDN.\n")
        .stdout("");
}

#[test]
fn test_five_positional_arguments_are_rejected() {
    cdnget()
        .args(["cdnjs", "jquery", "2.2.4", "/tmp", "extra"])
        .assert()
        .failure()
        .stderr("'extra': Too many arguments.\n");
}

#[test]
fn test_surplus_argument_beats_unknown_provider() {
    // Arity is checked before the registry is consulted.
    cdnget()
        .args(["no-such-cdn", "jquery", "2.2.4", "/tmp", "extra"])
        .assert()
        .failure()
        .stderr("'extra': Too many arguments.\n");
}

#[test]
fn test_malformed_library_argument_is_rejected_offline() {
    cdnget()
        .args(["cdnjs", "bad name!"])
        .assert()
        .failure()
        .stderr("bad name!: Unexpected library name.\n");
}

#[test]
fn test_malformed_version_argument_is_rejected_offline() {
    cdnget()
        .args(["cdnjs", "jquery", "1 2 3"])
        .assert()
        .failure()
        .stderr("1 2 3: Unexpected version number.\n");
}

#[test]
fn test_download_into_missing_directory_fails_fast() {
    // The destination check happens before any version resolution, so
    // this path never touches the network.
    cdnget()
        .args(["cdnjs", "jquery", "2.2.4", "./no/such/dir"])
        .assert()
        .failure()
        .stderr("./no/such/dir: not exist.\n");
}

#[test]
fn test_help_shows_usage_and_examples() {
    cdnget()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("cdnjs jquery 2.2.4"));
}

#[test]
fn test_version_flag_prints_crate_version() {
    cdnget()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
