// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Contract address placeholder meaning "no ledger deployed" (demo mode).
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Number of bytes in an account or contract address.
pub const ADDRESS_LEN: usize = 20;

/// Display label for records fetched from the ledger (their file name is unknown).
pub const GENERIC_RECORD_LABEL: &str = "Medical Record";

/// Read buffer size used when streaming a file through the digest.
pub const DIGEST_CHUNK_SIZE: usize = 64 * 1024;
