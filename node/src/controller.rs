// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Workflow Controller
//!
//! Turns user intents into pipeline runs:
//!
//! ```text
//! select_file ─► (staged)
//! submit ─► Hashing ─► wallet ─► ledger ─► optimistic append ─► refresh
//! share  ─────────────► wallet ─► ledger ─► notice
//! ```
//!
//! Each started operation runs on its own task. The session lock is taken
//! only between awaits, so the controller keeps answering while a pipeline
//! waits on the wallet or the ledger. One submission and one share may be in
//! flight at the same time; a second intent of a busy kind is dropped.
//!
//! Results are applied only if the session epoch and the operation id still
//! match. Anything else is a late answer for a discarded instance and is
//! ignored.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use basehealth_core::fingerprint::{digest_bytes, digest_file, DigestAlgorithm};
use basehealth_core::pipeline::{Failure, PipelineSlot, TransactionPipeline};
use basehealth_core::reconciler::{RecordBook, RefreshOutcome};
use basehealth_core::{
    Address, CoreError, CoreResult, Fingerprint, OperationId, OperationKind, Payload, Record,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::api::{PipelineView, RecordView, SessionView};
use crate::config::NodeConfig;
use crate::errors::NodeError;
use crate::ledger::{Confirmation, LedgerClient, LedgerError};
use crate::notify::{NoticeKind, NotificationCenter};

pub const SUBMIT_SUCCESS: &str = "Your record hash is stored on the ledger";
pub const SUBMIT_SUCCESS_DEMO: &str = "Your record hash was saved locally (demo mode, not on the ledger)";
pub const SHARE_SUCCESS: &str = "Record access shared successfully";
pub const SHARE_SUCCESS_DEMO: &str = "Record access shared (demo mode, not on the ledger)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A document chosen by the user, not yet hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub source: FileSource,
}

impl StagedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, source: FileSource::Path(path) }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), source: FileSource::Bytes(bytes.into()) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotConnected,
    NoFileStaged,
    NoRecords,
    InvalidGrantee,
    AlreadyInFlight,
}

#[derive(Debug)]
pub struct OperationTicket {
    pub id: OperationId,
    pub kind: OperationKind,
    task: Option<JoinHandle<()>>,
}

impl OperationTicket {
    /// Waits for the operation's task. Dropping the ticket instead leaves
    /// the task running.
    pub async fn settled(self) {
        if let Some(task) = self.task {
            if let Err(e) = task.await {
                tracing::error!("{} {} task ended abnormally: {}", self.kind, self.id, e);
            }
        }
    }
}

#[derive(Debug)]
pub enum IntentOutcome {
    Started(OperationTicket),
    Ignored(IgnoreReason),
}

impl IntentOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, IntentOutcome::Started(_))
    }

    pub fn ignored(&self) -> Option<IgnoreReason> {
        match self {
            IntentOutcome::Ignored(reason) => Some(*reason),
            IntentOutcome::Started(_) => None,
        }
    }

    pub async fn settled(self) {
        if let IntentOutcome::Started(ticket) = self {
            ticket.settled().await;
        }
    }
}

struct Session {
    account: Option<Address>,
    staged: Option<StagedFile>,
    /// Bumped on every file selection.
    staged_gen: u64,
    fingerprint: Option<Fingerprint>,
    book: RecordBook,
    submit: PipelineSlot,
    share: PipelineSlot,
    last_op: OperationId,
    read_error: Option<String>,
    notices: NotificationCenter,
}

impl Session {
    fn next_op(&mut self) -> OperationId {
        self.last_op = self.last_op.next();
        self.last_op
    }
}

/// The parts of the session a pipeline step may touch besides the pipeline.
struct Effects<'a> {
    book: &'a mut RecordBook,
    notices: &'a mut NotificationCenter,
    staged: &'a mut Option<StagedFile>,
    staged_gen: u64,
    fingerprint: &'a mut Option<Fingerprint>,
}

impl Effects<'_> {
    /// Staging belongs to the operation only while the user has not picked
    /// another file since it started.
    fn owns_staging(&self, generation: u64) -> bool {
        self.staged_gen == generation
    }

    fn show_fingerprint(&mut self, generation: u64, fingerprint: Fingerprint) {
        if self.owns_staging(generation) {
            *self.fingerprint = Some(fingerprint);
        }
    }

    fn release_staging(&mut self, generation: u64) {
        if self.owns_staging(generation) {
            *self.staged = None;
            *self.fingerprint = None;
        }
    }
}

struct Inner {
    ledger: Arc<dyn LedgerClient>,
    demo_mode: bool,
    digest: DigestAlgorithm,
    session: Mutex<Session>,
}

#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Inner>,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn fingerprint_of(alg: DigestAlgorithm, source: FileSource) -> CoreResult<Fingerprint> {
    tokio::task::spawn_blocking(move || match source {
        FileSource::Path(path) => digest_file(alg, path),
        FileSource::Bytes(bytes) => Ok(digest_bytes(alg, &bytes)),
    })
    .await
    .map_err(|e| CoreError::Hashing(e.to_string()))?
}

fn write_failure(e: LedgerError) -> Failure {
    match e {
        LedgerError::UserRejected => Failure::UserRejected,
        LedgerError::Rejected(reason) | LedgerError::Unavailable(reason) => {
            Failure::LedgerRejected { reason }
        }
    }
}

/// `None` when the transaction confirmed.
fn confirmation_failure(result: Result<Confirmation, LedgerError>) -> Option<Failure> {
    match result {
        Ok(c) if c.confirmed => None,
        Ok(c) => Some(Failure::LedgerRejected {
            reason: c.failure_reason.unwrap_or_else(|| "transaction reverted".to_string()),
        }),
        Err(e) => Some(Failure::LedgerRejected { reason: e.to_string() }),
    }
}

impl WorkflowController {
    pub fn new(ledger: Arc<dyn LedgerClient>, cfg: &NodeConfig) -> Self {
        let session = Session {
            account: None,
            staged: None,
            staged_gen: 0,
            fingerprint: None,
            book: RecordBook::new(None),
            submit: PipelineSlot::new(OperationKind::SubmitRecord),
            share: PipelineSlot::new(OperationKind::GrantAccess),
            last_op: OperationId::default(),
            read_error: None,
            notices: NotificationCenter::new(cfg.notice_window, cfg.explorer_url.clone()),
        };
        Self {
            inner: Arc::new(Inner {
                ledger,
                demo_mode: cfg.is_demo(),
                digest: cfg.digest,
                session: Mutex::new(session),
            }),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.inner.demo_mode
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.inner.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Follows the wallet. A change drops the record list, any in-flight
    /// pipelines and the current fingerprint before anything is fetched for
    /// the new account. Returns whether the account changed.
    pub fn switch_account(&self, account: Option<Address>) -> bool {
        let mut s = self.session();
        if s.account == account {
            return false;
        }
        tracing::info!("Account changed: {:?} -> {:?}", s.account, account);
        s.account = account;
        s.book.reset_for_account(account);
        s.submit.discard();
        s.share.discard();
        s.fingerprint = None;
        s.read_error = None;
        s.notices.clear();
        metrics::gauge!("basehealth_records_displayed", 0.0);
        true
    }

    /// Stages a document for the next submission, replacing any earlier one.
    pub fn select_file(&self, file: StagedFile) {
        let mut s = self.session();
        tracing::debug!("Staged file {:?}", file.name);
        s.staged = Some(file);
        s.staged_gen += 1;
        s.fingerprint = None;
    }

    pub fn submit(&self) -> Result<IntentOutcome, NodeError> {
        let kind = OperationKind::SubmitRecord;
        let (id, epoch, generation, account, file) = {
            let mut s = self.session();
            let Some(account) = s.account else {
                return Ok(IntentOutcome::Ignored(IgnoreReason::NotConnected));
            };
            let Some(file) = s.staged.clone() else {
                return Ok(IntentOutcome::Ignored(IgnoreReason::NoFileStaged));
            };
            if s.submit.is_busy() {
                tracing::debug!("Submit ignored: a submission is already in flight");
                return Ok(IntentOutcome::Ignored(IgnoreReason::AlreadyInFlight));
            }
            let id = s.next_op();
            let epoch = s.book.epoch();
            match s.submit.try_start(id) {
                Some(pipeline) => pipeline.begin_hashing()?,
                None => return Ok(IntentOutcome::Ignored(IgnoreReason::AlreadyInFlight)),
            }
            s.fingerprint = None;
            (id, epoch, s.staged_gen, account, file)
        };

        tracing::info!("{} {} started for {:?}", kind, id, file.name);
        metrics::increment_counter!("basehealth_operations_started_total", "kind" => kind.as_str());

        let ctrl = self.clone();
        let task = tokio::spawn(async move { ctrl.drive_submit(id, epoch, generation, account, file).await });
        Ok(IntentOutcome::Started(OperationTicket { id, kind, task: Some(task) }))
    }

    pub fn share(&self, grantee: &str) -> Result<IntentOutcome, NodeError> {
        let kind = OperationKind::GrantAccess;
        let (id, epoch, account, grantee) = {
            let mut s = self.session();
            let Some(account) = s.account else {
                return Ok(IntentOutcome::Ignored(IgnoreReason::NotConnected));
            };
            if s.book.is_empty() {
                return Ok(IntentOutcome::Ignored(IgnoreReason::NoRecords));
            }
            if !Address::is_plausible(grantee) {
                return Ok(IntentOutcome::Ignored(IgnoreReason::InvalidGrantee));
            }
            let grantee: Address = grantee.parse()?;
            if s.share.is_busy() {
                tracing::debug!("Share ignored: a grant is already in flight");
                return Ok(IntentOutcome::Ignored(IgnoreReason::AlreadyInFlight));
            }
            let id = s.next_op();
            let epoch = s.book.epoch();
            let demo = self.inner.demo_mode;
            match s.share.try_start(id) {
                Some(pipeline) if demo => pipeline.complete_locally(Payload::Grantee(grantee))?,
                Some(pipeline) => pipeline.dispatch(grantee)?,
                None => return Ok(IntentOutcome::Ignored(IgnoreReason::AlreadyInFlight)),
            }
            if demo {
                s.notices.push(NoticeKind::Success, kind, SHARE_SUCCESS_DEMO, None);
            }
            (id, epoch, account, grantee)
        };

        metrics::increment_counter!("basehealth_operations_started_total", "kind" => kind.as_str());
        if self.inner.demo_mode {
            tracing::info!("{} {} completed locally (demo mode)", kind, id);
            metrics::increment_counter!("basehealth_operations_succeeded_total", "kind" => kind.as_str());
            return Ok(IntentOutcome::Started(OperationTicket { id, kind, task: None }));
        }

        tracing::info!("{} {} started for grantee {}", kind, id, grantee);
        let ctrl = self.clone();
        let task = tokio::spawn(async move { ctrl.drive_share(id, epoch, account, grantee).await });
        Ok(IntentOutcome::Started(OperationTicket { id, kind, task: Some(task) }))
    }

    /// Re-reads the account's records from the ledger and replaces the
    /// display list. Never fails: a disabled or broken read path leaves the
    /// current list (optimistic entries included) in place.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.session().book.begin_refresh();

        let owner = match ticket.account() {
            Some(owner) if !self.inner.demo_mode => *owner,
            _ => return self.session().book.apply_unavailable(&ticket),
        };

        let fetched = self.inner.ledger.fetch_records(&owner).await;

        let mut s = self.session();
        let outcome = match fetched {
            Ok(list) => {
                let outcome = s.book.apply_refresh(&ticket, list);
                if let RefreshOutcome::Applied { confirmed, kept_local, skipped } = &outcome {
                    s.read_error = None;
                    if *skipped > 0 {
                        tracing::warn!("Skipped {} ledger records with malformed hashes", skipped);
                    }
                    tracing::debug!("Refreshed {}: {} confirmed, {} local kept", owner, confirmed, kept_local);
                }
                outcome
            }
            Err(e) => {
                let outcome = s.book.apply_unavailable(&ticket);
                if outcome != RefreshOutcome::Stale {
                    tracing::warn!("Record fetch for {} unavailable: {}", owner, e);
                    s.read_error = Some(e.to_string());
                }
                outcome
            }
        };
        if outcome == RefreshOutcome::Stale {
            tracing::debug!("Dropped stale record fetch for {}", owner);
        }
        metrics::gauge!("basehealth_records_displayed", s.book.len() as f64);
        outcome
    }

    pub fn dismiss(&self, notice: u64) -> bool {
        self.session().notices.dismiss(notice)
    }

    pub fn snapshot(&self) -> SessionView {
        let mut s = self.session();
        let records = s
            .book
            .records()
            .map(|r| RecordView {
                hash: r.hash.clone(),
                label: r.label().to_string(),
                timestamp: r.timestamp,
                provenance: r.provenance.as_str(),
                tx: r.transaction_reference().cloned(),
                explorer_url: r.transaction_reference().map(|tx| s.notices.explorer_link(tx)),
            })
            .collect();
        let pipeline_view = |slot: &PipelineSlot| PipelineView {
            operation: slot.current().map(|p| p.id()),
            phase: slot.phase(),
            ledger_reference: slot.current().and_then(|p| p.ledger_reference().cloned()),
        };
        let submit = pipeline_view(&s.submit);
        let share = pipeline_view(&s.share);

        SessionView {
            account: s.account,
            connected: s.account.is_some(),
            demo_mode: self.inner.demo_mode,
            staged_file: s.staged.as_ref().map(|f| f.name.clone()),
            fingerprint: s.fingerprint.clone(),
            records,
            busy: s.submit.is_busy() || s.share.is_busy(),
            submit,
            share,
            read_error: s.read_error.clone(),
            notifications: s.notices.active(),
        }
    }

    /// Runs `step` against the live pipeline `id` if it still belongs to the
    /// session that started it. Returns false when the result was dropped.
    fn advance<F>(&self, epoch: u64, kind: OperationKind, id: OperationId, step: F) -> bool
    where
        F: FnOnce(&mut TransactionPipeline, &mut Effects<'_>) -> CoreResult<()>,
    {
        let mut guard = self.session();
        let s = &mut *guard;
        if s.book.epoch() != epoch {
            tracing::debug!("Ignoring late result for {} {}: account changed", kind, id);
            return false;
        }
        let slot = match kind {
            OperationKind::SubmitRecord => &mut s.submit,
            OperationKind::GrantAccess => &mut s.share,
        };
        let Some(pipeline) = slot.get_mut(id) else {
            tracing::debug!("Ignoring late result for discarded {} {}", kind, id);
            return false;
        };
        let mut fx = Effects {
            book: &mut s.book,
            notices: &mut s.notices,
            staged: &mut s.staged,
            staged_gen: s.staged_gen,
            fingerprint: &mut s.fingerprint,
        };
        match step(pipeline, &mut fx) {
            Ok(()) => {
                tracing::info!("{} {} -> {:?}", kind, id, pipeline.phase().name());
                true
            }
            Err(e) => {
                tracing::warn!("{} {}: {}", kind, id, e);
                false
            }
        }
    }

    fn finish_failed(&self, epoch: u64, kind: OperationKind, id: OperationId, failure: Failure) {
        let message = failure.to_string();
        let applied = self.advance(epoch, kind, id, |p, fx| {
            p.fail(failure)?;
            let tx = p.ledger_reference().cloned();
            fx.notices.push(NoticeKind::Failure, kind, message, tx);
            Ok(())
        });
        if applied {
            metrics::increment_counter!("basehealth_operations_failed_total", "kind" => kind.as_str());
        }
    }

    async fn drive_submit(self, id: OperationId, epoch: u64, generation: u64, account: Address, file: StagedFile) {
        let kind = OperationKind::SubmitRecord;

        let fingerprint = match fingerprint_of(self.inner.digest, file.source.clone()).await {
            Ok(fp) => fp,
            Err(e) => {
                let message = match e {
                    CoreError::Hashing(m) => m,
                    other => other.to_string(),
                };
                self.finish_failed(epoch, kind, id, Failure::Hashing { message });
                return;
            }
        };

        if self.inner.demo_mode {
            let applied = self.advance(epoch, kind, id, |p, fx| {
                p.complete_locally(Payload::Fingerprint(fingerprint.clone()))?;
                fx.book.push_local(Record::local_only(fingerprint, unix_now(), file.name));
                fx.release_staging(generation);
                fx.notices.push(NoticeKind::Success, kind, SUBMIT_SUCCESS_DEMO, None);
                Ok(())
            });
            if applied {
                metrics::increment_counter!("basehealth_operations_succeeded_total", "kind" => kind.as_str());
            }
            return;
        }

        let hashed = self.advance(epoch, kind, id, |p, fx| {
            p.hashed(fingerprint.clone())?;
            fx.show_fingerprint(generation, fingerprint.clone());
            Ok(())
        });
        if !hashed {
            return;
        }

        let tx = match self.inner.ledger.submit_record(&account, &fingerprint).await {
            Ok(tx) => tx,
            Err(e) => {
                self.finish_failed(epoch, kind, id, write_failure(e));
                return;
            }
        };
        if !self.advance(epoch, kind, id, |p, _| p.broadcast(tx.clone())) {
            return;
        }

        let settled = self.inner.ledger.await_confirmation(&tx).await;
        if let Some(failure) = confirmation_failure(settled) {
            self.finish_failed(epoch, kind, id, failure);
            return;
        }

        // Optimistic append first, then the refetch it triggers.
        let confirmed = self.advance(epoch, kind, id, |p, fx| {
            p.confirm()?;
            fx.book
                .push_optimistic(Record::optimistic(fingerprint, unix_now(), file.name, tx.clone()));
            fx.release_staging(generation);
            fx.notices.push(NoticeKind::Success, kind, SUBMIT_SUCCESS, Some(tx));
            Ok(())
        });
        if confirmed {
            metrics::increment_counter!("basehealth_operations_succeeded_total", "kind" => kind.as_str());
            self.refresh().await;
        }
    }

    async fn drive_share(self, id: OperationId, epoch: u64, account: Address, grantee: Address) {
        let kind = OperationKind::GrantAccess;

        let tx = match self.inner.ledger.grant_access(&account, &grantee).await {
            Ok(tx) => tx,
            Err(e) => {
                self.finish_failed(epoch, kind, id, write_failure(e));
                return;
            }
        };
        if !self.advance(epoch, kind, id, |p, _| p.broadcast(tx.clone())) {
            return;
        }

        let settled = self.inner.ledger.await_confirmation(&tx).await;
        if let Some(failure) = confirmation_failure(settled) {
            self.finish_failed(epoch, kind, id, failure);
            return;
        }

        let confirmed = self.advance(epoch, kind, id, |p, fx| {
            p.confirm()?;
            fx.notices.push(NoticeKind::Success, kind, SHARE_SUCCESS, Some(tx));
            Ok(())
        });
        if confirmed {
            metrics::increment_counter!("basehealth_operations_succeeded_total", "kind" => kind.as_str());
        }
    }
}
