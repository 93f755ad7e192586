use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};

fn demo(name: &str) -> String {
    format!("{}/demos/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn ledger() -> Command {
    let mut cmd = Command::cargo_bin("ledger").unwrap();
    cmd.env_remove("LEDGER_FILE")
        .env_remove("LEDGER_LEVEL")
        .env_remove("LEDGER_FORMAT")
        .env_remove("LEDGER_STRICT_MEMBERS");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn split_equal_prints_each_share() {
    ledger()
        .args(["split", "--total", "1.00", "-p", "a", "-p", "b", "-p", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Equal split of 1.00"))
        .stdout(predicate::str::contains("0.34"));
}

#[test]
fn split_percentages_as_json() {
    let value = json_output(ledger().args([
        "--format", "json", "split", "--total", "1.01", "--policy", "percent", "-p", "a=34",
        "-p", "b=33", "-p", "c=33",
    ]));
    assert_eq!(
        value,
        json!({
            "split_method": "PERCENTAGES",
            "total_minor": 101,
            "lines": [
                { "member": "a", "owed_minor": 35 },
                { "member": "b", "owed_minor": 33 },
                { "member": "c", "owed_minor": 33 },
            ],
        })
    );
}

#[test]
fn split_errors_carry_their_code() {
    ledger()
        .args(["split", "--total", "1.00", "--policy", "shares", "-p", "a=0", "-p", "b=0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SHARES_MUST_BE_POSITIVE"));

    ledger()
        .args(["split", "--total", "1,00", "-p", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INVALID_MONEY_FORMAT"));

    ledger()
        .args(["split", "--total", "1.00", "-p", "a", "-p", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DUPLICATE_PARTICIPANT"));
}

#[test]
fn settle_demo_trip() {
    let value = json_output(
        ledger()
            .args(["--format", "json", "settle", "--ledger"])
            .arg(demo("trip.json")),
    );

    assert_eq!(
        value["balances"],
        json!([
            { "member": "alice", "name": "Alice", "net_minor": -5750 },
            { "member": "bob", "name": "Bob", "net_minor": 16000 },
            { "member": "carol", "name": "Carol", "net_minor": -10250 },
        ])
    );
    assert_eq!(
        value["suggestions"],
        json!([
            { "from": "carol", "to": "bob", "amount_minor": 10250 },
            { "from": "alice", "to": "bob", "amount_minor": 5750 },
        ])
    );
}

#[test]
fn balances_as_of_ignores_later_events() {
    let value = json_output(
        ledger()
            .args(["--format", "json", "balances", "--as-of", "2025-05-02", "--ledger"])
            .arg(demo("trip.json")),
    );
    let nets: Vec<i64> = value["balances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["net_minor"].as_i64().unwrap())
        .collect();
    assert_eq!(nets, [-4500, 21000, -16500]);
    assert!(value.get("suggestions").is_none());
}

#[test]
fn strict_mode_rejects_undeclared_members() {
    ledger()
        .args(["--strict", "balances", "--ledger"])
        .arg(demo("stranger.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("UNKNOWN_MEMBER"));

    let value = json_output(
        ledger()
            .args(["--format", "json", "balances", "--ledger"])
            .arg(demo("stranger.json")),
    );
    assert_eq!(value["balances"][2]["member"], "dave");
    assert_eq!(value["balances"][2]["net_minor"], -1000);
}

#[test]
fn text_settle_output() {
    ledger()
        .args(["settle", "--ledger"])
        .arg(demo("trip.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Lisbon trip balances (EUR)"))
        .stdout(predicate::str::contains("carol -> bob: 102.50"))
        .stdout(predicate::str::contains("alice -> bob: 57.50"));
}

#[test]
fn balances_too_large_for_money_fail_cleanly() {
    ledger()
        .args(["balances", "--ledger"])
        .arg(demo("overflow.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("AMOUNT_OVERFLOW"))
        .stderr(predicate::str::contains("panicked").not());
}
