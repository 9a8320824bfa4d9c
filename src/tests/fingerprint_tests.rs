// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::io::Write;

use crate::error::CoreError;
use crate::fingerprint::{digest_bytes, digest_file, digest_reader, DigestAlgorithm};

#[test]
fn test_sha256_known_vector() {
    let fp = digest_bytes(DigestAlgorithm::Sha256, b"abc");
    assert_eq!(
        fp.as_str(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_blake3_matches_reference() {
    let fp = digest_bytes(DigestAlgorithm::Blake3, b"report-v1");
    assert_eq!(fp.as_str(), blake3::hash(b"report-v1").to_hex().as_str());
}

#[test]
fn test_distinct_content_distinct_fingerprint() {
    for alg in [DigestAlgorithm::Sha256, DigestAlgorithm::Blake3] {
        let a = digest_bytes(alg, b"report-v1");
        let b = digest_bytes(alg, b"report-v2");
        assert_ne!(a, b);
        assert_eq!(a, digest_bytes(alg, b"report-v1"), "digest must be stable");
    }
}

#[test]
fn test_file_name_does_not_matter() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("scan.pdf");
    let second = dir.path().join("renamed-copy.bin");
    std::fs::write(&first, b"report-v1").unwrap();
    std::fs::write(&second, b"report-v1").unwrap();

    let a = digest_file(DigestAlgorithm::Sha256, &first).unwrap();
    let b = digest_file(DigestAlgorithm::Sha256, &second).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, digest_bytes(DigestAlgorithm::Sha256, b"report-v1"));
}

#[test]
fn test_streaming_matches_in_memory_for_large_input() {
    // Larger than one read chunk so the loop runs several times.
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let streamed = digest_file(DigestAlgorithm::Blake3, file.path()).unwrap();
    assert_eq!(streamed, digest_bytes(DigestAlgorithm::Blake3, &data));

    let from_reader = digest_reader(DigestAlgorithm::Sha256, &data[..]).unwrap();
    assert_eq!(from_reader, digest_bytes(DigestAlgorithm::Sha256, &data));
}

#[test]
fn test_unreadable_file_is_hashing_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pdf");
    let err = digest_file(DigestAlgorithm::Sha256, &missing).unwrap_err();
    assert!(matches!(err, CoreError::Hashing(_)));

    let err = digest_file(DigestAlgorithm::Sha256, dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::Hashing(_)));
}

#[test]
fn test_algorithm_names() {
    assert_eq!(DigestAlgorithm::from_name("SHA-256"), Some(DigestAlgorithm::Sha256));
    assert_eq!(DigestAlgorithm::from_name("blake3"), Some(DigestAlgorithm::Blake3));
    assert_eq!(DigestAlgorithm::from_name("md5"), None);
    assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
}
