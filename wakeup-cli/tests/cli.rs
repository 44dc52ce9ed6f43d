use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "wakeup-cli-{label}-{}.json",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn run(state: &PathBuf, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wakeup-cli"))
        .arg("--state")
        .arg(state)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn ticket_prices_a_one_off_flight() {
    let state = temp_path("ticket");
    let out = json(&run(
        &state,
        &["--json", "ticket", "--prev", "08:30", "--curr", "9:00am"],
    ));
    let ticket = &out["time_delta"];
    assert_eq!(ticket["deltaMin"], 30);
    assert_eq!(ticket["distanceKm"], 86);
    assert_eq!(ticket["fuelUsed"], 10);
    assert_eq!(ticket["direction"], "WESTBOUND");
    assert!(!state.exists());
}

#[test]
fn ticket_rejects_bad_times() {
    let state = temp_path("bad");
    let output = run(&state, &["ticket", "--curr", "25:99"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid --curr"));
}

#[test]
fn fly_charges_once_per_day_and_status_reports_it() {
    let state = temp_path("fly");
    json(&run(
        &state,
        &["--json", "--date", "2024-06-01", "fly", "--at", "0830"],
    ));
    let second = json(&run(
        &state,
        &["--json", "--date", "2024-06-02", "fly", "--at", "0900"],
    ));
    assert_eq!(second["time_delta"]["prevTime"], "0830");
    json(&run(
        &state,
        &["--json", "--date", "2024-06-02", "fly", "--at", "0930"],
    ));

    let status = json(&run(&state, &["--json", "--date", "2024-06-02", "status"]));
    assert_eq!(status["fuel"], 85);
    assert_eq!(status["flights"], 2);
    assert_eq!(status["chargedToday"], true);
    assert_eq!(status["lastEvent"]["clock"], "0930");

    let _ = std::fs::remove_file(state);
}

#[test]
fn reset_and_refuel_edit_the_state_file() {
    let state = temp_path("reset");
    json(&run(
        &state,
        &["--json", "--date", "2024-06-01", "fly", "--at", "0600"],
    ));
    assert!(run(&state, &["refuel", "500"]).status.success());
    let status = json(&run(&state, &["--json", "status"]));
    assert_eq!(status["fuel"], 120);

    assert!(run(&state, &["set-fuel", "7"]).status.success());
    assert_eq!(json(&run(&state, &["--json", "status"]))["fuel"], 7);

    assert!(run(&state, &["reset", "--all"]).status.success());
    let status = json(&run(&state, &["--json", "status"]));
    assert_eq!(status["fuel"], 100);
    assert_eq!(status["flights"], 0);

    let _ = std::fs::remove_file(state);
}

#[test]
fn legacy_economy_flies_between_places() {
    let state = temp_path("legacy");
    let first = json(&run(
        &state,
        &[
            "--legacy",
            "--json",
            "fly",
            "--place",
            "Tokyo,Japan,35.6762,139.6503",
        ],
    ));
    assert_eq!(first["geo"]["fromCity"], "Taipei");
    assert_eq!(first["geo"]["fuelUsed"], 30);

    let status = json(&run(&state, &["--legacy", "--json", "status"]));
    assert_eq!(status["fuel"], 970);
    assert_eq!(status["engine"], "geo");

    let output = run(&state, &["--legacy", "fly", "--at", "0700"]);
    assert!(!output.status.success());

    let _ = std::fs::remove_file(state);
}

#[test]
fn boarding_pass_is_seeded() {
    let state = temp_path("pass");
    let a = json(&run(&state, &["--json", "boarding-pass", "--seed", "42"]));
    let b = json(&run(&state, &["--json", "boarding-pass", "--seed", "42"]));
    assert_eq!(a, b);
    assert!(a["flightNumber"].as_str().unwrap().starts_with("WU"));
}

#[test]
fn three_digit_times_are_rejected() {
    let state = temp_path("short");
    for args in [
        &["ticket", "--prev", "0800", "--curr", "123"][..],
        &["--date", "2024-06-01", "fly", "--at", "930"][..],
    ] {
        let output = run(&state, args);
        assert!(!output.status.success(), "{args:?}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("invalid"));
    }
    assert!(!state.exists());
}

#[test]
fn corrupt_state_file_starts_fresh() {
    let state = temp_path("corrupt");
    std::fs::write(&state, r#"{"WUM_FUEL": "9"#).unwrap();

    let status = json(&run(&state, &["--json", "status"]));
    assert_eq!(status["fuel"], 100);
    assert_eq!(status["flights"], 0);

    let ticket = json(&run(
        &state,
        &["--json", "--date", "2024-06-01", "fly", "--at", "0800"],
    ));
    assert_eq!(ticket["time_delta"]["fuelUsed"], 5);
    assert_eq!(json(&run(&state, &["--json", "status"]))["fuel"], 95);

    let mut aside = state.clone().into_os_string();
    aside.push(".corrupt");
    let _ = std::fs::remove_file(aside);
    let _ = std::fs::remove_file(state);
}

#[test]
fn concurrent_flights_never_lose_a_debit() {
    let state = temp_path("race");
    let config = temp_path("race-config");
    std::fs::write(&config, r#"{"debitPolicy":"every_call"}"#).unwrap();

    let children: Vec<_> = (0..6)
        .map(|_| {
            Command::new(env!("CARGO_BIN_EXE_wakeup-cli"))
                .arg("--state")
                .arg(&state)
                .arg("--config")
                .arg(&config)
                .args(["--json", "--date", "2024-06-01", "fly", "--at", "0700"])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .expect("spawn cli")
        })
        .collect();
    for child in children {
        let output = child.wait_with_output().expect("wait for cli");
        json(&output);
    }

    let output = Command::new(env!("CARGO_BIN_EXE_wakeup-cli"))
        .arg("--state")
        .arg(&state)
        .arg("--config")
        .arg(&config)
        .args(["--json", "status"])
        .output()
        .expect("run cli");
    let status = json(&output);
    assert_eq!(status["flights"], 6);
    assert_eq!(status["fuel"], 100 - 6 * 5);

    let _ = std::fs::remove_file(config);
    let _ = std::fs::remove_file(state);
}
