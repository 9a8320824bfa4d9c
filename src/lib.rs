// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! basehealth-core: content fingerprints, record provenance and the
//! submission/sharing state machines behind the BaseHealth workflow.
//!
//! Everything in this crate is synchronous and free of network I/O. The async
//! orchestration (wallet, ledger, notifications) lives in `basehealth-node`.

pub mod config;
pub mod error;
pub mod types;
pub mod fingerprint;
pub mod pipeline;
pub mod reconciler;

pub use error::{CoreError, CoreResult};
pub use types::address::Address;
pub use types::hash::Fingerprint;
pub use types::operation::{OperationId, OperationKind, Payload, TxHandle};
pub use types::record::{LedgerRecord, Provenance, Record, SessionOrigin};

#[cfg(test)]
pub mod tests;
