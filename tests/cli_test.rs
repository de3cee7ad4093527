use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

fn command_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", common::HEADER.join(", ")).unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg("tests/fixtures/commands.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "transaction_id,order_id,status,amount,paid_amount,currency,source_service",
        ))
        .stdout(predicate::str::contains("tx-1,order-1,PAID,10000,10000,KRW,glycopharm"))
        .stdout(predicate::str::contains("tx-2,order-2,FAILED,2500.5,0,KRW,kpa"));

    Ok(())
}

#[test]
fn test_illegal_transition_is_reported_and_skipped() {
    let file = command_file(&[
        "create, tx-1, order-1, 10000, glycopharm, , , ",
        "transition, tx-1, , , , CONFIRMING, , ",
        "transition, tx-1, , , , PAID, pk-1, ",
        "transition, tx-1, , , , CANCELLED, , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command"))
        .stderr(predicate::str::contains("PAID -> CANCELLED"))
        .stdout(predicate::str::contains("tx-1,order-1,PAID,10000,10000,KRW,glycopharm"));
}

#[test]
fn test_duplicate_create_keeps_first_record() {
    let file = command_file(&[
        "create, tx-1, order-1, 10000, glycopharm, , , ",
        "create, tx-1, order-9, 99999, glycopharm, , , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Duplicate transaction: tx-1"))
        .stdout(predicate::str::contains("tx-1,order-1,CREATED,10000,0,KRW,glycopharm"))
        .stdout(predicate::str::contains("order-9").not());
}

#[test]
fn test_refund_flow() {
    let file = command_file(&[
        "create, tx-1, order-1, 500, kpa, , , ",
        "transition, tx-1, , , , CONFIRMING, , ",
        "transition, tx-1, , , , PAID, , ",
        "transition, tx-1, , , , REFUNDED, , ",
    ]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tx-1,order-1,REFUNDED,500,500,KRW,kpa"));
}

#[test]
fn test_currency_option() {
    let file = command_file(&["create, tx-1, order-1, 12.5, storefront, , , "]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path()).arg("--currency").arg("usd");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tx-1,order-1,CREATED,12.5,0,USD,storefront"));
}

#[test]
fn test_currency_is_case_normalized() {
    let file = command_file(&["create, tx-1, order-1, 100, kpa, , , "]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path()).arg("--currency").arg("jpy");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tx-1,order-1,CREATED,100,0,JPY,kpa"));
}

#[test]
fn test_invalid_currency_fails() {
    let file = command_file(&[]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path()).arg("--currency").arg("WONS");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid currency code"));
}

#[test]
fn test_empty_log_prints_header() {
    let file = command_file(&[]);

    let output = Command::new(cargo_bin!("payment-core"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["transaction_id,order_id,status,amount,paid_amount,currency,source_service"]
    );
}

#[test]
fn test_rejected_rows_still_print_header() {
    let file = command_file(&["transition, tx-404, , , , PAID, , "]);

    let output = Command::new(cargo_bin!("payment-core"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("transaction_id,order_id,status"));
}

#[test]
fn test_lowercase_status_is_accepted() {
    let file = command_file(&[
        "create, tx-1, order-1, 10000, glycopharm, , , ",
        "transition, tx-1, , , , confirming, , ",
        "transition, tx-1, , , , paid, pk-1, ",
    ]);

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error").not())
        .stdout(predicate::str::contains("tx-1,order-1,PAID,10000,10000,KRW,glycopharm"));
}

#[test]
fn test_optional_trailing_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "{}, currency, payment_method, paid_amount, failure_code",
        common::HEADER.join(", ")
    )
    .unwrap();
    writeln!(file, "create, tx-1, order-1, 20, storefront, , , , usd, card, , ").unwrap();
    writeln!(file, "transition, tx-1, , , , CONFIRMING, , ").unwrap();
    writeln!(file, "transition, tx-1, , , , PAID, pk-1, , , , 19.5, ").unwrap();

    let mut cmd = Command::new(cargo_bin!("payment-core"));
    cmd.arg(file.path()).arg("--currency").arg("KRW");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tx-1,order-1,PAID,20,19.5,USD,storefront"));
}

#[test]
fn test_many_payments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paid.csv");
    common::generate_paid_commands(&path, 500).unwrap();

    let output = Command::new(cargo_bin!("payment-core"))
        .arg(&path)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 501);
    assert_eq!(stdout.lines().filter(|l| l.contains(",PAID,")).count(), 500);
}
