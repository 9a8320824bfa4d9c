// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Content fingerprints.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Lowercase hex digest of a file's bytes.
///
/// Built by [`crate::fingerprint`] on the client, or parsed from what the
/// ledger hands back. The ledger never sees the bytes themselves.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn from_digest(bytes: &[u8]) -> Self {
        Fingerprint(hex::encode(bytes))
    }

    /// Accepts an optional `0x` prefix and mixed case; stores lowercase digits.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() % 2 != 0 {
            return Err(CoreError::InvalidFingerprint(s.to_string()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidFingerprint(s.to_string()));
        }
        Ok(Fingerprint(digits.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::parse(&s).map_err(serde::de::Error::custom)
    }
}
