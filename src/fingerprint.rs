// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fingerprint Generator
//!
//! Derives a content-addressed fingerprint from a document's bytes. Always
//! runs on the client before any network interaction.
//!
//! # Guarantees
//! - Same bytes → same fingerprint (file name and selection order never
//!   enter the digest)
//! - Read-only, transient access to the file
//! - Any read failure surfaces as [`CoreError::Hashing`]

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::DIGEST_CHUNK_SIZE;
use crate::error::{CoreError, CoreResult};
use crate::types::hash::Fingerprint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Some(DigestAlgorithm::Sha256),
            "blake3" => Some(DigestAlgorithm::Blake3),
            _ => None,
        }
    }
}

enum Hasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Hasher {
    fn new(alg: DigestAlgorithm) -> Self {
        match alg {
            DigestAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Hasher::Sha256(h) => h.update(chunk),
            Hasher::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finish(self) -> Fingerprint {
        match self {
            Hasher::Sha256(h) => Fingerprint::from_digest(&h.finalize()),
            Hasher::Blake3(h) => Fingerprint::from_digest(h.finalize().as_bytes()),
        }
    }
}

/// Fingerprint of an in-memory buffer.
pub fn digest_bytes(alg: DigestAlgorithm, bytes: &[u8]) -> Fingerprint {
    let mut hasher = Hasher::new(alg);
    hasher.update(bytes);
    hasher.finish()
}

/// Streams `reader` through the digest in fixed-size chunks.
pub fn digest_reader<R: Read>(alg: DigestAlgorithm, mut reader: R) -> CoreResult<Fingerprint> {
    let mut hasher = Hasher::new(alg);
    let mut buf = vec![0u8; DIGEST_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CoreError::Hashing(e.to_string())),
        }
    }
    Ok(hasher.finish())
}

/// Fingerprint of the file at `path`.
pub fn digest_file(alg: DigestAlgorithm, path: impl AsRef<Path>) -> CoreResult<Fingerprint> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| CoreError::Hashing(format!("{}: {}", path.display(), e)))?;
    if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
        return Err(CoreError::Hashing(format!("{}: is a directory", path.display())));
    }
    digest_reader(alg, file)
}
