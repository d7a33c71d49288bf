// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the repairbase CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Bundled sample datasets
fn dataset_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// repairbase with an isolated state directory, config file and the sample datasets
fn repairbase(state: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repairbase").unwrap();
    cmd.env("REPAIRBASE_DATA_DIR", state.path())
        .env("REPAIRBASE_CONFIG", state.path().join("config.toml"))
        .env("REPAIRBASE_DATASET", dataset_dir())
        .env_remove("NO_COLOR")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn test_devices_list_and_filter() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .arg("devices")
        .assert()
        .success()
        .stdout(predicate::str::contains("Devices (5):"))
        .stdout(predicate::str::contains("iPhone 13 Pro"));

    repairbase(&state)
        .args(["devices", "--category", "macbook air"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MacBook Air M1"))
        .stdout(predicate::str::contains("iPhone").not());
}

#[test]
fn test_device_show_resolves_prices() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["device", "iphone 13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("processor: A15 Bionic"))
        .stdout(predicate::str::contains("6,500.00 UAH"))
        .stdout(predicate::str::contains("Tigris"));
}

#[test]
fn test_categories() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["--json", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""iPhone": 3"#));
}

#[test]
fn test_parts_marks_price_source() {
    let state = TempDir::new().unwrap();

    // rear_camera has only an EU price, so UA falls back across regions
    repairbase(&state)
        .args(["parts", "iPhone 12", "--region", "ua"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5,200.00 UAH"))
        .stdout(predicate::str::contains("3,555.00 UAH"))
        .stdout(predicate::str::contains("cross-region"));
}

#[test]
fn test_calc_quote() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["calc", "iPhone 13", "-p", "battery", "-p", "display"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parts:  8,300.00 UAH"))
        .stdout(predicate::str::contains("Labor:  1,000.00 UAH"))
        .stdout(predicate::str::contains("Total:  12,090.00 UAH"));
}

#[test]
fn test_calc_reports_unpriced_parts() {
    let state = TempDir::new().unwrap();

    let output = repairbase(&state)
        .args(["--json", "calc", "iPhone 13", "-p", "taptic_engine", "-p", "battery", "--margin", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let quote: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(quote["items"][0]["price"], serde_json::Value::Null);
    assert_eq!(quote["parts_cost"], 1800.0);
    // Unpriced lines still carry labor
    assert_eq!(quote["labor_cost"], 1000.0);
    assert_eq!(quote["total"], 2800.0);
}

#[test]
fn test_convert() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["convert", "100", "usd", "uah"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.00 USD = 4,150.00 UAH"));
}

#[test]
fn test_ic_and_diagnostics() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["ic", "show", "1610a3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("U2 Tristar"));

    repairbase(&state)
        .args(["error", "4013"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cause: NAND, cable or baseband"));

    repairbase(&state)
        .args(["diag", "rails", "820-02016"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PP_VDD_BOOST"));

    repairbase(&state)
        .args(["diag", "region", "MLPF3ZD/A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ZD/A"))
        .stdout(predicate::str::contains("region: Europe"));
}

#[test]
fn test_regional_code_files_are_merged() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["diag", "region", "J/A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("country: Japan"));
}

#[test]
fn test_status_lists_every_dataset() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("9/9 datasets loaded"))
        .stdout(predicate::str::contains("regional_codes     6 records"));
}

#[test]
fn test_missing_dataset_degrades() {
    let state = TempDir::new().unwrap();
    let empty = TempDir::new().unwrap();

    repairbase(&state)
        .arg("--dataset")
        .arg(empty.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/9 datasets loaded"));
}

#[test]
fn test_failure_is_logged_with_fix() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["device", "Pixel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No device matches 'Pixel'"))
        .stderr(predicate::str::contains("hint (low)"));

    assert!(state.path().join("healer_log.json").exists());

    repairbase(&state)
        .args(["healer", "log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Error log (1/50):"))
        .stdout(predicate::str::contains("[device]"));

    repairbase(&state).args(["healer", "clear"]).assert().success();

    repairbase(&state)
        .args(["healer", "log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Error log is empty."));
}

#[test]
fn test_healer_match() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["healer", "match", "HTTP 503 from tracker API (fetch-live)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("try again later"));
}

#[test]
fn test_bad_argument_is_logged_with_fix() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["calc", "iPhone 13", "-p", "battery", "--region", "mars"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown region: mars"))
        .stderr(predicate::str::contains("hint (low): Valid regions: ua, eu"));

    repairbase(&state)
        .args(["healer", "log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[cli]"))
        .stdout(predicate::str::contains("Unknown region: mars"));
}

#[test]
fn test_help_is_not_logged() {
    let state = TempDir::new().unwrap();

    repairbase(&state).arg("--help").assert().success();

    assert!(!state.path().join("healer_log.json").exists());
}

#[test]
fn test_unknown_action_fails() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["diag", "teleport"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown action: teleport"));
}

#[test]
fn test_tracker_without_api_url() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .env_remove("REPAIRBASE_TRACKER__API_URL")
        .args(["tracker", "live"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config set tracker.api_url"));

    repairbase(&state)
        .args(["tracker", "stations"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EcoFlow Delta 2"));
}

#[test]
fn test_watchlist_lifecycle() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["watch", "add", "buy", "661-22336", "--note", "two pieces"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 661-22336 to buy list"));

    repairbase(&state)
        .args(["watch", "add", "buy", "661-22336"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in buy list"));

    repairbase(&state)
        .args(["watch", "list", "buy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("661-22336 - two pieces"));

    repairbase(&state)
        .args(["watch", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The watch list is empty."));

    repairbase(&state)
        .args(["watch", "remove", "buy", "661-22336"])
        .assert()
        .success();
}

#[test]
fn test_config_set_and_get() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["config", "set", "rates.usd_to_uah", "42"])
        .assert()
        .success();

    repairbase(&state)
        .args(["config", "get", "rates.usd_to_uah"])
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));

    repairbase(&state)
        .args(["convert", "1", "usd", "uah"])
        .assert()
        .success()
        .stdout(predicate::str::contains("= 42.00 UAH"));

    repairbase(&state)
        .args(["config", "set", "rates.usd_to_uah", "0"])
        .assert()
        .failure();

    repairbase(&state)
        .args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration key"));
}

#[test]
fn test_environment_overrides_config_file() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .env("REPAIRBASE_CALCULATOR__MARGIN_PERCENT", "0")
        .args(["--json", "calc", "iPhone 13", "-p", "battery"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total": 2300.0"#));
}

#[test]
fn test_completions() {
    let state = TempDir::new().unwrap();

    repairbase(&state)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("repairbase"));
}
