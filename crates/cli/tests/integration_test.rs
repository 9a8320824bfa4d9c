use std::fs;

use basehealth_cli::commands::{hash, records, share, submit, SessionArgs};
use basehealth_cli::render;
use basehealth_core::fingerprint::{digest_bytes, DigestAlgorithm};
use tempfile::tempdir;

const ZERO: &str = "0x0000000000000000000000000000000000000000";
const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

fn demo_session() -> SessionArgs {
    SessionArgs {
        account: ACCOUNT.to_string(),
        gateway_url: None,
        contract: Some(ZERO.to_string()),
    }
}

#[test]
fn test_hash_command() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("renamed.pdf");
    fs::write(&a, b"report-v1").unwrap();
    fs::write(&b, b"report-v1").unwrap();

    let fa = hash::run(&a, "sha256").unwrap();
    let fb = hash::run(&b, "sha256").unwrap();
    assert_eq!(fa, fb);
    assert_eq!(fa, digest_bytes(DigestAlgorithm::Sha256, b"report-v1"));

    let blake = hash::run(&a, "blake3").unwrap();
    assert_ne!(fa, blake);

    assert!(hash::run(&a, "md5").is_err());
    assert!(hash::run(&dir.path().join("missing"), "sha256").is_err());
}

#[tokio::test]
async fn test_demo_submit_and_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("B.pdf");
    fs::write(&path, b"lab results").unwrap();

    let view = submit::run(&demo_session(), &path).await.unwrap();
    assert!(view.demo_mode);
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].label, "B.pdf");
    assert!(view.records[0].tx.is_none());

    let table = render::records_table(&view.records).to_string();
    assert!(table.contains("B.pdf"));
    assert!(table.contains("local_only"));

    // Demo records live only in the session that made them.
    let view = records::run(&demo_session(), true).await.unwrap();
    assert!(view.records.is_empty());
}

#[tokio::test]
async fn test_failures_surface_as_errors() {
    let dir = tempdir().unwrap();

    let err = submit::run(&demo_session(), &dir.path().join("gone.pdf")).await.unwrap_err();
    assert!(err.to_string().starts_with("Could not hash file"));

    let err = share::run(&demo_session(), ACCOUNT).await.unwrap_err();
    assert!(err.to_string().contains("NoRecords"));

    let bad = SessionArgs { account: "0x12".to_string(), ..demo_session() };
    assert!(records::run(&bad, false).await.is_err());
}
