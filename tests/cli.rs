use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn capture(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

fn nvme_logpage() -> Command {
    Command::new(assert_cmd::cargo_bin!("nvme-logpage"))
}

#[test]
fn decodes_health_page() {
    let mut page = vec![0u8; 512];
    page[0] = 0x04;
    page[1..3].copy_from_slice(&310u16.to_le_bytes());
    page[3] = 100;
    page[4] = 10;
    let file = capture(&page);

    nvme_logpage()
        .args(["-p", "2"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SMART/Health Information Log\n"))
        .stdout(predicate::str::contains("310 K, 36.85 C, 98.33 F"))
        .stdout(predicate::str::contains("Critical Warning State:         0x04\n"));
}

#[test]
fn short_capture_is_zero_padded() {
    let file = capture(&[0x01]);

    nvme_logpage()
        .args(["-p", "0x03"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot 1: Empty\n"));
}

#[test]
fn namespace_only_for_health() {
    let file = capture(&[0; 512]);

    nvme_logpage()
        .args(["-p", "3", "-n", "1"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid only at controller level"));
}

#[test]
fn namespace_health_needs_controller_support() {
    let file = capture(&[0; 512]);

    nvme_logpage()
        .args(["-p", "2", "-n", "1"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("per namespace"));

    nvme_logpage()
        .args(["-p", "2", "-n", "1", "--ns-smart"])
        .arg(file.path())
        .assert()
        .success();
}

#[test]
fn missing_page_id_is_a_usage_error() {
    let file = capture(&[0; 16]);

    nvme_logpage()
        .arg(file.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--page"));
}

#[test]
fn unknown_page_dumps_hex() {
    let file = capture(&[0xde, 0xad, 0xbe, 0xef]);

    nvme_logpage()
        .args(["-p", "0x70"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Unknown Log Page (page 0x70), 4096 bytes\n0x0000: de ad be ef 00",
        ))
        .stdout(predicate::str::ends_with("*\n"));
}

#[test]
fn hex_override() {
    let file = capture(&[0; 512]);

    nvme_logpage()
        .args(["-p", "2", "-x"])
        .arg(file.path())
        .assert()
        .success()
        .stdout("SMART / Health Information (page 0x02), 4096 bytes\n*\n");
}

#[test]
fn error_log_size_follows_elpe() {
    let mut page = vec![0u8; 128];
    page[0..8].copy_from_slice(&9u64.to_le_bytes());
    page[64..72].copy_from_slice(&8u64.to_le_bytes());
    let file = capture(&page);

    nvme_logpage()
        .args(["-p", "1", "--elpe", "0"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry 01"))
        .stdout(predicate::str::contains("Entry 02").not());

    nvme_logpage()
        .args(["-p", "1"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry 02"));
}

#[test]
fn hgst_overrun_is_reported_inline() {
    let mut page = vec![1, 0];
    page.extend(8u16.to_le_bytes());
    page.extend([0x38, 0, 0x40, 0]);
    page.extend(5u32.to_le_bytes());
    let file = capture(&page);

    nvme_logpage()
        .args(["-p", "0xc1"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("HGST Extra Info Log\n"))
        .stdout(predicate::str::contains("Ooops! Off the end of the list"));
}

#[test]
fn missing_capture_file() {
    nvme_logpage()
        .args(["-p", "2", "/nonexistent/capture.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open capture file"));
}
