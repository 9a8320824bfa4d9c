// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-process ledger.
//!
//! Append-only per-owner record lists with ledger-assigned timestamps, a
//! grant list, and knobs to script the wallet and the chain: decline the next
//! signature, revert the next transaction, fail reads, or hold signatures and
//! confirmations until the caller releases them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use basehealth_core::{Address, Fingerprint, LedgerRecord, TxHandle};
use tokio::sync::Semaphore;

use super::{Confirmation, LedgerClient, LedgerError};

/// Ledger clock starts here and ticks one second per confirmed write.
const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
enum PendingWrite {
    Record { owner: Address, hash: Fingerprint },
    Grant { owner: Address, grantee: Address },
    Reverted(String),
}

#[derive(Debug)]
struct LedgerState {
    records: HashMap<Address, Vec<LedgerRecord>>,
    grants: HashMap<Address, Vec<Address>>,
    pending: HashMap<TxHandle, PendingWrite>,
    next_tx: u64,
    now: u64,
    reject_next_signature: bool,
    revert_next: Option<String>,
    reads_failing: bool,
    write_calls: usize,
    read_calls: usize,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            grants: HashMap::new(),
            pending: HashMap::new(),
            next_tx: 1,
            now: GENESIS_TIMESTAMP,
            reject_next_signature: false,
            revert_next: None,
            reads_failing: false,
            write_calls: 0,
            read_calls: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    wallet_gate: Option<Arc<Semaphore>>,
    confirmation_gate: Option<Arc<Semaphore>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signatures wait for [`release_signatures`](Self::release_signatures).
    pub fn hold_signatures(mut self) -> Self {
        self.wallet_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Confirmations wait for [`release_confirmations`](Self::release_confirmations).
    pub fn hold_confirmations(mut self) -> Self {
        self.confirmation_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release_signatures(&self, n: usize) {
        if let Some(gate) = &self.wallet_gate {
            gate.add_permits(n);
        }
    }

    pub fn release_confirmations(&self, n: usize) {
        if let Some(gate) = &self.confirmation_gate {
            gate.add_permits(n);
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reject_next_signature(&self) {
        self.state().reject_next_signature = true;
    }

    pub fn revert_next(&self, reason: impl Into<String>) {
        self.state().revert_next = Some(reason.into());
    }

    pub fn fail_reads(&self, failing: bool) {
        self.state().reads_failing = failing;
    }

    /// Writes a confirmed record directly, as if from an earlier session.
    pub fn seed_record(&self, owner: Address, hash: &Fingerprint) {
        let mut state = self.state();
        state.now += 1;
        let timestamp = state.now;
        state
            .records
            .entry(owner)
            .or_default()
            .push(LedgerRecord { hash: hash.to_string(), timestamp });
    }

    pub fn records_of(&self, owner: &Address) -> Vec<LedgerRecord> {
        self.state().records.get(owner).cloned().unwrap_or_default()
    }

    pub fn grants_of(&self, owner: &Address) -> Vec<Address> {
        self.state().grants.get(owner).cloned().unwrap_or_default()
    }

    pub fn write_calls(&self) -> usize {
        self.state().write_calls
    }

    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    pub fn pending_count(&self) -> usize {
        self.state().pending.len()
    }

    async fn pass_gate(gate: &Option<Arc<Semaphore>>) -> Result<(), LedgerError> {
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
            permit.forget();
        }
        Ok(())
    }

    async fn sign(&self, write: PendingWrite) -> Result<TxHandle, LedgerError> {
        self.state().write_calls += 1;
        Self::pass_gate(&self.wallet_gate).await?;

        let mut state = self.state();
        if state.reject_next_signature {
            state.reject_next_signature = false;
            return Err(LedgerError::UserRejected);
        }

        let tx = TxHandle::new(format!("0x{:064x}", state.next_tx));
        state.next_tx += 1;
        let write = match state.revert_next.take() {
            Some(reason) => PendingWrite::Reverted(reason),
            None => write,
        };
        state.pending.insert(tx.clone(), write);
        Ok(tx)
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn fetch_records(&self, owner: &Address) -> Result<Vec<LedgerRecord>, LedgerError> {
        let mut state = self.state();
        state.read_calls += 1;
        if state.reads_failing {
            return Err(LedgerError::Unavailable("read path failing".to_string()));
        }
        Ok(state.records.get(owner).cloned().unwrap_or_default())
    }

    async fn submit_record(&self, account: &Address, hash: &Fingerprint) -> Result<TxHandle, LedgerError> {
        self.sign(PendingWrite::Record { owner: *account, hash: hash.clone() }).await
    }

    async fn grant_access(&self, account: &Address, grantee: &Address) -> Result<TxHandle, LedgerError> {
        self.sign(PendingWrite::Grant { owner: *account, grantee: *grantee }).await
    }

    async fn await_confirmation(&self, tx: &TxHandle) -> Result<Confirmation, LedgerError> {
        Self::pass_gate(&self.confirmation_gate).await?;

        let mut state = self.state();
        let write = state
            .pending
            .remove(tx)
            .ok_or_else(|| LedgerError::Unavailable(format!("unknown transaction {}", tx)))?;

        match write {
            PendingWrite::Record { owner, hash } => {
                state.now += 1;
                let timestamp = state.now;
                state
                    .records
                    .entry(owner)
                    .or_default()
                    .push(LedgerRecord { hash: hash.to_string(), timestamp });
                Ok(Confirmation::success())
            }
            PendingWrite::Grant { owner, grantee } => {
                state.grants.entry(owner).or_default().push(grantee);
                Ok(Confirmation::success())
            }
            PendingWrite::Reverted(reason) => Ok(Confirmation::failed(reason)),
        }
    }
}
