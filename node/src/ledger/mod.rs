// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Contract RPC layer.
//!
//! The ledger is the only source of truth for confirmed records. The node
//! reaches it through [`LedgerClient`]; wallet authorization happens inside
//! the write calls, so a declined signature surfaces as
//! [`LedgerError::UserRejected`] from `submit_record` / `grant_access`.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use basehealth_core::{Address, Fingerprint, LedgerRecord, TxHandle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpLedgerClient;
pub use memory::InMemoryLedger;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Request rejected in wallet")]
    UserRejected,
    #[error("{0}")]
    Rejected(String),
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result of waiting for a transaction to reach finality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Confirmation {
    pub fn success() -> Self {
        Self { confirmed: true, failure_reason: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { confirmed: false, failure_reason: Some(reason.into()) }
    }
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Records of `owner` in ledger-insertion order (oldest first).
    async fn fetch_records(&self, owner: &Address) -> Result<Vec<LedgerRecord>, LedgerError>;

    /// Asks the wallet of `account` to sign, then broadcasts.
    async fn submit_record(&self, account: &Address, hash: &Fingerprint) -> Result<TxHandle, LedgerError>;

    async fn grant_access(&self, account: &Address, grantee: &Address) -> Result<TxHandle, LedgerError>;

    /// Blocks until the ledger settles `tx`. No timeout is applied here.
    async fn await_confirmation(&self, tx: &TxHandle) -> Result<Confirmation, LedgerError>;
}
