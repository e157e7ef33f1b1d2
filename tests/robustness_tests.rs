use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const HEADER: [&str; 10] = [
    "command", "order", "type", "amount", "target", "actor", "role", "level", "decision",
    "version",
];

#[test]
fn test_malformed_csv_handling() {
    let output_path = std::path::PathBuf::from("robustness_commands.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(HEADER).unwrap();

    // Valid open
    wtr.write_record(["open", "1", "topup", "1.0", "", "", "", "", "", ""])
        .unwrap();
    // Unknown command
    wtr.write_record(["cancel", "1", "topup", "", "", "", "", "", "", ""])
        .unwrap();
    // Missing amount for open (required)
    wtr.write_record(["open", "2", "topup", "", "", "", "", "", "", ""])
        .unwrap();
    // Status that does not belong to the order type
    wtr.write_record(["transition", "1", "topup", "", "auditing", "op", "operator", "", "", ""])
        .unwrap();
    // Valid transition
    wtr.write_record(["transition", "1", "topup", "", "paying", "op", "operator", "", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("order-lifecycle"));
    cmd.arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains("1,topup,PAYING,2,1,"))
        .stdout(predicate::str::contains("2,topup").not());

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_invalid_data_types() {
    let output_path = std::path::PathBuf::from("data_type_commands.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(HEADER).unwrap();

    // Text in amount field
    wtr.write_record(["open", "1", "refund", "not_a_number", "", "", "", "", "", ""])
        .unwrap();
    // Non-integer order id
    wtr.write_record(["open", "abc", "refund", "1.0", "", "", "", "", "", ""])
        .unwrap();
    // Negative amount
    wtr.write_record(["open", "2", "refund", "-5", "", "", "", "", "", ""])
        .unwrap();
    // Audit level out of range
    wtr.write_record(["open", "3", "refund", "5.0", "", "", "", "", "", ""])
        .unwrap();
    wtr.write_record(["transition", "3", "refund", "", "processing", "a", "auditor", "300", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("order-lifecycle"));
    cmd.arg(&output_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains("3,refund,PENDING,1,5,"))
        .stdout(predicate::str::contains("1,refund").not())
        .stdout(predicate::str::contains("2,refund").not());

    std::fs::remove_file(output_path).ok();
}
