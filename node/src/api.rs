// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use basehealth_core::pipeline::Phase;
use basehealth_core::{Address, Fingerprint, OperationId, TxHandle};
use serde::{Deserialize, Serialize};

use crate::controller::IgnoreReason;
use crate::notify::Notification;

#[derive(Deserialize)]
pub struct AccountRequest {
    /// `None` disconnects.
    pub address: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: Option<Address>,
    pub changed: bool,
    pub records: usize,
}

/// Either `path` (a file the node can read) or `content_hex` (uploaded bytes).
#[derive(Serialize, Deserialize)]
pub struct SelectFileRequest {
    pub name: String,
    pub path: Option<String>,
    pub content_hex: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SelectFileResponse {
    pub staged: String,
}

#[derive(Serialize, Deserialize)]
pub struct ShareRequest {
    pub grantee: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct IntentResponse {
    pub started: bool,
    pub operation: Option<OperationId>,
    pub ignored: Option<IgnoreReason>,
}

#[derive(Serialize, Deserialize)]
pub struct RefreshResponse {
    pub outcome: String,
    pub records: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DismissResponse {
    pub dismissed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RecordView {
    pub hash: Fingerprint,
    pub label: String,
    pub timestamp: u64,
    pub provenance: &'static str,
    pub tx: Option<TxHandle>,
    pub explorer_url: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineView {
    pub operation: Option<OperationId>,
    #[serde(flatten)]
    pub phase: Phase,
    pub ledger_reference: Option<TxHandle>,
}

/// Everything the presentation layer renders.
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub account: Option<Address>,
    pub connected: bool,
    pub demo_mode: bool,
    pub staged_file: Option<String>,
    pub fingerprint: Option<Fingerprint>,
    pub records: Vec<RecordView>,
    pub submit: PipelineView,
    pub share: PipelineView,
    /// Some operation is in flight.
    pub busy: bool,
    /// Last record fetch failure; cleared by the next successful fetch.
    pub read_error: Option<String>,
    pub notifications: Vec<Notification>,
}
