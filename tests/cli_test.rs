use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("order-lifecycle"));
    cmd.arg("tests/fixtures/commands.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "order,type,status,version,amount,approved_level",
        ))
        .stdout(predicate::str::contains("1,topup,PAYING,2,1.5,"))
        // Two audit levels for 15000 under the default thresholds
        .stdout(predicate::str::contains("2,settlement,APPROVED,6,15000,2"))
        .stdout(predicate::str::contains("3,refund,PROCESSING,2,20,"))
        .stderr(predicate::str::contains(
            "Error processing command: invalid transition: PROCESSING -> PENDING",
        ));

    Ok(())
}

#[test]
fn test_cli_with_threshold_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut thresholds = tempfile::NamedTempFile::new()?;
    writeln!(thresholds, r#"[{{"level": 1, "min_amount": "0"}}]"#)?;

    let mut csv = tempfile::NamedTempFile::new()?;
    writeln!(csv, "command, order, type, amount, target, actor, role, level, decision, version")?;
    writeln!(csv, "open, 9, settlement, 15000, , , , , ,")?;
    writeln!(csv, "transition, 9, settlement, , pending_audit, op-1, operator, , ,")?;
    writeln!(csv, "transition, 9, settlement, , auditing, a-1, auditor, 1, ,")?;
    writeln!(csv, "transition, 9, settlement, , approved, a-1, auditor, 1, approve,")?;

    let mut cmd = Command::new(cargo_bin!("order-lifecycle"));
    cmd.arg(csv.path()).arg("--thresholds").arg(thresholds.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("9,settlement,APPROVED,4,15000,1"));

    Ok(())
}

#[test]
fn test_cli_reports_authorization_failures() -> Result<(), Box<dyn std::error::Error>> {
    let mut csv = tempfile::NamedTempFile::new()?;
    writeln!(csv, "command, order, type, amount, target, actor, role, level, decision, version")?;
    writeln!(csv, "open, 1, topup, 10, , , , , ,")?;
    writeln!(csv, "transition, 1, topup, , paying, , , , ,")?;
    writeln!(csv, "transition, 1, topup, , paying, a-1, auditor, 1, ,")?;
    writeln!(csv, "transition, 1, topup, , paying, op-1, operator, , , 7")?;

    let mut cmd = Command::new(cargo_bin!("order-lifecycle"));
    cmd.arg(csv.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,topup,PENDING,1,10,"))
        .stderr(predicate::str::contains("no authenticated actor"))
        .stderr(predicate::str::contains("unauthorized"))
        .stderr(predicate::str::contains("concurrent modification of order 1"))
        // Each refusal is reported once, by the command loop.
        .stderr(predicate::str::contains("transition refused").not());

    Ok(())
}

#[test]
fn test_cli_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("order-lifecycle"));
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
