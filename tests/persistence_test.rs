#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

const HEADER: &str = "command, order, type, amount, target, actor, role, level, decision, version";

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: open a settlement and queue it for audit
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "{HEADER}").unwrap();
    writeln!(csv1, "open, 1, settlement, 500, , , , , ,").unwrap();
    writeln!(csv1, "transition, 1, settlement, , pending_audit, op-1, operator, , ,").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("order-lifecycle"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,settlement,PENDING_AUDIT,2,500,0"));

    // 2. Second run: audit the same order using the same DB path
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "{HEADER}").unwrap();
    writeln!(csv2, "open, 1, settlement, 500, , , , , ,").unwrap();
    writeln!(csv2, "transition, 1, settlement, , auditing, a-1, auditor, 1, , 2").unwrap();
    writeln!(csv2, "transition, 1, settlement, , approved, a-1, auditor, 1, approve,").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("order-lifecycle"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    let stderr2 = String::from_utf8_lossy(&output2.stderr);

    // The recovered order keeps its version and audit progress; reopening it is refused.
    assert!(stderr2.contains("order 1 already exists"));
    assert!(stdout2.contains("1,settlement,APPROVED,4,500,1"));
}
