// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transaction Pipeline
//!
//! One instance per user intent. Phases:
//!
//! ```text
//! Idle ─► Hashing ─► AwaitingWalletConfirmation ─► AwaitingLedgerConfirmation ─► Succeeded
//!  │     (submit)              │                              │
//!  │        │                  └─► Failed(UserRejected)       └─► Failed(LedgerRejected)
//!  │        └─► Failed(Hashing)
//!  └─► AwaitingWalletConfirmation (grant-access)
//! ```
//!
//! `Succeeded` and `Failed` are terminal. A retry is a new instance.
//! Transitions outside the diagram are refused and leave the phase untouched.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::address::Address;
use crate::types::hash::Fingerprint;
use crate::types::operation::{OperationId, OperationKind, Payload, TxHandle};

/// Fieldless phase tag, used in errors and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Idle,
    Hashing,
    AwaitingWalletConfirmation,
    AwaitingLedgerConfirmation,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// File unreadable. The ledger was never contacted.
    Hashing { message: String },
    /// The wallet declined to sign.
    UserRejected,
    /// Reverted, dropped or refused by the ledger. Reason kept verbatim.
    LedgerRejected { reason: String },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Hashing { message } => write!(f, "Could not hash file: {}", message),
            Failure::UserRejected => f.write_str("Request rejected in wallet"),
            Failure::LedgerRejected { reason } => write!(f, "Transaction failed: {}", reason),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Hashing,
    AwaitingWalletConfirmation,
    AwaitingLedgerConfirmation,
    Succeeded,
    Failed { failure: Failure },
}

impl Phase {
    pub fn name(&self) -> PhaseName {
        match self {
            Phase::Idle => PhaseName::Idle,
            Phase::Hashing => PhaseName::Hashing,
            Phase::AwaitingWalletConfirmation => PhaseName::AwaitingWalletConfirmation,
            Phase::AwaitingLedgerConfirmation => PhaseName::AwaitingLedgerConfirmation,
            Phase::Succeeded => PhaseName::Succeeded,
            Phase::Failed { .. } => PhaseName::Failed,
        }
    }

    /// An operation is in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Phase::Hashing | Phase::AwaitingWalletConfirmation | Phase::AwaitingLedgerConfirmation
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionPipeline {
    id: OperationId,
    kind: OperationKind,
    payload: Option<Payload>,
    phase: Phase,
    ledger_reference: Option<TxHandle>,
}

impl TransactionPipeline {
    pub fn new(id: OperationId, kind: OperationKind) -> Self {
        Self {
            id,
            kind,
            payload: None,
            phase: Phase::Idle,
            ledger_reference: None,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn ledger_reference(&self) -> Option<&TxHandle> {
        self.ledger_reference.as_ref()
    }

    fn refuse(&self, event: &'static str) -> CoreError {
        CoreError::InvalidTransition { from: self.phase.name(), event }
    }

    /// Submit-record only: Idle → Hashing.
    pub fn begin_hashing(&mut self) -> CoreResult<()> {
        match (&self.phase, self.kind) {
            (Phase::Idle, OperationKind::SubmitRecord) => {
                self.phase = Phase::Hashing;
                Ok(())
            }
            _ => Err(self.refuse("begin hashing")),
        }
    }

    /// Hashing → AwaitingWalletConfirmation, carrying the fingerprint.
    pub fn hashed(&mut self, fingerprint: Fingerprint) -> CoreResult<()> {
        match self.phase {
            Phase::Hashing => {
                self.payload = Some(Payload::Fingerprint(fingerprint));
                self.phase = Phase::AwaitingWalletConfirmation;
                Ok(())
            }
            _ => Err(self.refuse("record fingerprint")),
        }
    }

    /// Grant-access only: Idle → AwaitingWalletConfirmation.
    pub fn dispatch(&mut self, grantee: Address) -> CoreResult<()> {
        match (&self.phase, self.kind) {
            (Phase::Idle, OperationKind::GrantAccess) => {
                self.payload = Some(Payload::Grantee(grantee));
                self.phase = Phase::AwaitingWalletConfirmation;
                Ok(())
            }
            _ => Err(self.refuse("dispatch grant")),
        }
    }

    /// The wallet signed and the ledger accepted the request.
    pub fn broadcast(&mut self, tx: TxHandle) -> CoreResult<()> {
        match self.phase {
            Phase::AwaitingWalletConfirmation => {
                self.ledger_reference = Some(tx);
                self.phase = Phase::AwaitingLedgerConfirmation;
                Ok(())
            }
            _ => Err(self.refuse("broadcast")),
        }
    }

    pub fn confirm(&mut self) -> CoreResult<()> {
        match self.phase {
            Phase::AwaitingLedgerConfirmation => {
                self.phase = Phase::Succeeded;
                Ok(())
            }
            _ => Err(self.refuse("confirm")),
        }
    }

    /// Demo mode: finish without wallet or ledger. No reference is ever set.
    pub fn complete_locally(&mut self, payload: Payload) -> CoreResult<()> {
        let allowed = match (&self.phase, &payload) {
            (Phase::Hashing, Payload::Fingerprint(_)) => true,
            (Phase::Idle, Payload::Grantee(_)) => self.kind == OperationKind::GrantAccess,
            _ => false,
        };
        if !allowed {
            return Err(self.refuse("complete locally"));
        }
        self.payload = Some(payload);
        self.phase = Phase::Succeeded;
        Ok(())
    }

    /// Each failure is only reachable from the phase that can produce it.
    pub fn fail(&mut self, failure: Failure) -> CoreResult<()> {
        let allowed = match (&self.phase, &failure) {
            (Phase::Hashing, Failure::Hashing { .. }) => true,
            (Phase::AwaitingWalletConfirmation, Failure::UserRejected) => true,
            (Phase::AwaitingWalletConfirmation, Failure::LedgerRejected { .. }) => true,
            (Phase::AwaitingLedgerConfirmation, Failure::LedgerRejected { .. }) => true,
            _ => false,
        };
        if !allowed {
            return Err(self.refuse("fail"));
        }
        self.phase = Phase::Failed { failure };
        Ok(())
    }
}

/// Holds the single pipeline of one kind for the current account.
#[derive(Clone, Debug)]
pub struct PipelineSlot {
    kind: OperationKind,
    current: Option<TransactionPipeline>,
}

impl PipelineSlot {
    pub fn new(kind: OperationKind) -> Self {
        Self { kind, current: None }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_busy(&self) -> bool {
        self.current.as_ref().map(|p| p.phase().is_active()).unwrap_or(false)
    }

    /// Installs a fresh pipeline unless one is already in flight. A refused
    /// intent is dropped, never queued.
    pub fn try_start(&mut self, id: OperationId) -> Option<&mut TransactionPipeline> {
        if self.is_busy() {
            return None;
        }
        self.current = Some(TransactionPipeline::new(id, self.kind));
        self.current.as_mut()
    }

    pub fn current(&self) -> Option<&TransactionPipeline> {
        self.current.as_ref()
    }

    /// The pipeline with `id`, if it is still the one held here.
    pub fn get_mut(&mut self, id: OperationId) -> Option<&mut TransactionPipeline> {
        self.current.as_mut().filter(|p| p.id() == id)
    }

    pub fn phase(&self) -> Phase {
        self.current.as_ref().map(|p| p.phase().clone()).unwrap_or(Phase::Idle)
    }

    pub fn discard(&mut self) -> Option<TransactionPipeline> {
        self.current.take()
    }
}
