// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::ZERO_ADDRESS;
use crate::error::CoreError;
use crate::types::address::Address;
use crate::types::hash::Fingerprint;

#[test]
fn test_address_parse_and_display() {
    let addr: Address = "0xAbC0000000000000000000000000000000000001".parse().unwrap();
    assert_eq!(addr.to_string(), "0xabc0000000000000000000000000000000000001");
    assert!(!addr.is_zero());

    let zero: Address = ZERO_ADDRESS.parse().unwrap();
    assert_eq!(zero, Address::ZERO);
    assert!(zero.is_zero());
}

#[test]
fn test_address_plausibility() {
    assert!(Address::is_plausible("0xabc0000000000000000000000000000000000001"));
    assert!(Address::is_plausible("  0xabc0000000000000000000000000000000000001 "));
    assert!(!Address::is_plausible(""));
    assert!(!Address::is_plausible("0x"));
    assert!(!Address::is_plausible("abc0000000000000000000000000000000000001"));
    assert!(!Address::is_plausible("0xabc"));
    assert!(!Address::is_plausible("0xzzz0000000000000000000000000000000000001"));
    assert!(!Address::is_plausible("0xabc00000000000000000000000000000000000011"));
}

#[test]
fn test_address_serde_as_string() {
    let addr: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
    let json = serde_json::to_string(&addr).unwrap();
    assert_eq!(json, "\"0x00000000000000000000000000000000000000aa\"");
    let back: Address = serde_json::from_str(&json).unwrap();
    assert_eq!(back, addr);

    let bad: Result<Address, _> = serde_json::from_str("\"0x12\"");
    assert!(bad.is_err());
}

#[test]
fn test_fingerprint_parse() {
    let fp = Fingerprint::parse("0xDEADbeef").unwrap();
    assert_eq!(fp.as_str(), "deadbeef");

    assert!(matches!(Fingerprint::parse(""), Err(CoreError::InvalidFingerprint(_))));
    assert!(matches!(Fingerprint::parse("abc"), Err(CoreError::InvalidFingerprint(_))));
    assert!(matches!(Fingerprint::parse("not-hex!"), Err(CoreError::InvalidFingerprint(_))));
}
