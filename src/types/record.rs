// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record definition.

use serde::{Deserialize, Serialize};

use crate::config::GENERIC_RECORD_LABEL;
use crate::types::hash::Fingerprint;
use crate::types::operation::TxHandle;

/// What only this client session knows about a record it submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOrigin {
    pub file_name: String,
    pub tx: TxHandle,
}

/// Where a displayed record came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// Read back from the ledger. Authoritative. `origin` is set when the
    /// record was submitted earlier in this session.
    Confirmed { origin: Option<SessionOrigin> },
    /// Appended locally after this session's transaction confirmed, before
    /// the ledger list has been re-read.
    Optimistic { origin: SessionOrigin },
    /// Demo mode: never written to any ledger.
    LocalOnly { file_name: String },
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Confirmed { .. } => "confirmed",
            Provenance::Optimistic { .. } => "optimistic",
            Provenance::LocalOnly { .. } => "local_only",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub hash: Fingerprint,
    /// Seconds since the epoch. Ledger-assigned for confirmed records.
    pub timestamp: u64,
    pub provenance: Provenance,
}

impl Record {
    pub fn confirmed(hash: Fingerprint, timestamp: u64) -> Self {
        Self { hash, timestamp, provenance: Provenance::Confirmed { origin: None } }
    }

    pub fn optimistic(hash: Fingerprint, timestamp: u64, file_name: impl Into<String>, tx: TxHandle) -> Self {
        Self {
            hash,
            timestamp,
            provenance: Provenance::Optimistic {
                origin: SessionOrigin { file_name: file_name.into(), tx },
            },
        }
    }

    pub fn local_only(hash: Fingerprint, timestamp: u64, file_name: impl Into<String>) -> Self {
        Self {
            hash,
            timestamp,
            provenance: Provenance::LocalOnly { file_name: file_name.into() },
        }
    }

    pub fn origin(&self) -> Option<&SessionOrigin> {
        match &self.provenance {
            Provenance::Confirmed { origin } => origin.as_ref(),
            Provenance::Optimistic { origin } => Some(origin),
            Provenance::LocalOnly { .. } => None,
        }
    }

    pub fn label(&self) -> &str {
        match &self.provenance {
            Provenance::LocalOnly { file_name } => file_name,
            _ => self
                .origin()
                .map(|o| o.file_name.as_str())
                .unwrap_or(GENERIC_RECORD_LABEL),
        }
    }

    pub fn transaction_reference(&self) -> Option<&TxHandle> {
        self.origin().map(|o| &o.tx)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.provenance, Provenance::Confirmed { .. })
    }
}

/// Raw entry as returned by the ledger read path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub hash: String,
    pub timestamp: u64,
}
