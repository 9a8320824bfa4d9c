// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record Reconciler
//!
//! The [`RecordBook`] is the display list for the connected account, newest
//! first. It has exactly two writers:
//! - a ledger refresh, which replaces the list wholesale
//! - a single optimistic (or demo-mode local) prepend after a submission succeeds
//!
//! Every mutation bumps `version`. A refresh captures the version when it is
//! issued; local entries added after that point survive the replacement unless
//! the fetched list holds more copies of their hash than the book knew of.
//! Entries added before it are superseded by the ledger's answer. This makes "append, then refetch" safe
//! no matter when the fetch lands.
//!
//! A record submitted in this session keeps its file name and transaction
//! reference once the ledger confirms it, so the refetch never shows it twice
//! and never loses what the session knew about it.
//!
//! Switching accounts bumps `epoch`; tickets from an older epoch are stale.

use std::collections::{HashMap, VecDeque};

use crate::types::address::Address;
use crate::types::hash::Fingerprint;
use crate::types::record::{LedgerRecord, Provenance, Record, SessionOrigin};

#[derive(Clone, Debug)]
struct Entry {
    record: Record,
    /// Book version at which a local entry was added. Zero for confirmed ones.
    appended_at: u64,
}

/// Issued by [`RecordBook::begin_refresh`], redeemed when the fetch returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    account: Option<Address>,
    epoch: u64,
    version: u64,
    seq: u64,
}

impl RefreshTicket {
    /// Owner to query. `None` means the read path is disabled.
    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied {
        confirmed: usize,
        kept_local: usize,
        /// Ledger entries dropped because their hash was not valid hex.
        skipped: usize,
    },
    /// Read path disabled or failed; local state left as is.
    Unavailable,
    /// Issued for another account, or overtaken by a newer refresh.
    Stale,
}

#[derive(Clone, Debug, Default)]
pub struct RecordBook {
    account: Option<Address>,
    epoch: u64,
    version: u64,
    issued_seq: u64,
    applied_seq: u64,
    entries: Vec<Entry>,
}

impl RecordBook {
    pub fn new(account: Option<Address>) -> Self {
        Self { account, ..Default::default() }
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn count_of(&self, hash: &Fingerprint) -> usize {
        self.records().filter(|r| &r.hash == hash).count()
    }

    /// Drops everything belonging to the previous account. Runs before any
    /// fetch for the new account is issued.
    pub fn reset_for_account(&mut self, account: Option<Address>) {
        self.account = account;
        self.epoch += 1;
        self.version += 1;
        self.entries.clear();
    }

    fn prepend(&mut self, record: Record) -> u64 {
        self.version += 1;
        self.entries.insert(0, Entry { record, appended_at: self.version });
        self.version
    }

    /// Adds a just-confirmed in-session submission ahead of the refetch.
    pub fn push_optimistic(&mut self, record: Record) -> u64 {
        self.prepend(record)
    }

    /// Demo mode: the only copy of the record lives here.
    pub fn push_local(&mut self, record: Record) -> u64 {
        self.prepend(record)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_seq += 1;
        RefreshTicket {
            account: self.account,
            epoch: self.epoch,
            version: self.version,
            seq: self.issued_seq,
        }
    }

    fn is_stale(&self, ticket: &RefreshTicket) -> bool {
        ticket.epoch != self.epoch || ticket.seq <= self.applied_seq
    }

    /// Replaces the authoritative list with what the ledger returned, in
    /// ledger-insertion order. The display order is newest first.
    pub fn apply_refresh(&mut self, ticket: &RefreshTicket, fetched: Vec<LedgerRecord>) -> RefreshOutcome {
        if self.is_stale(ticket) {
            return RefreshOutcome::Stale;
        }

        let total = fetched.len();
        let mut confirmed: Vec<Record> = fetched
            .into_iter()
            .filter_map(|r| {
                Fingerprint::parse(&r.hash)
                    .ok()
                    .map(|hash| Record::confirmed(hash, r.timestamp))
            })
            .collect();
        let skipped = total - confirmed.len();
        confirmed.reverse();

        // Ledger copies the book had not seen when the ticket was issued. Each
        // one accounts for a single local entry added since, oldest first.
        let mut on_ledger: HashMap<Fingerprint, usize> = HashMap::new();
        for record in &confirmed {
            *on_ledger.entry(record.hash.clone()).or_default() += 1;
        }
        for entry in self.entries.iter().filter(|e| e.appended_at <= ticket.version) {
            if let Some(n) = on_ledger.get_mut(&entry.record.hash) {
                *n = n.saturating_sub(1);
            }
        }

        let entries: Vec<Entry> = self.entries.drain(..).collect();
        let mut keep = vec![false; entries.len()];
        for (i, entry) in entries.iter().enumerate().rev() {
            if entry.record.is_confirmed() || entry.appended_at <= ticket.version {
                continue;
            }
            match on_ledger.get_mut(&entry.record.hash) {
                Some(n) if *n > 0 => *n -= 1,
                _ => keep[i] = true,
            }
        }

        // Session knowledge (file name, tx) of every replaced entry follows
        // its hash onto the ledger's copy, newest to newest.
        let mut origins: HashMap<Fingerprint, VecDeque<SessionOrigin>> = HashMap::new();
        let mut kept: Vec<Entry> = Vec::new();
        for (entry, keep) in entries.into_iter().zip(keep) {
            if keep {
                kept.push(entry);
            } else if let Some(origin) = entry.record.origin() {
                origins.entry(entry.record.hash.clone()).or_default().push_back(origin.clone());
            }
        }
        let kept_local = kept.len();
        let confirmed_count = confirmed.len();

        for record in confirmed.iter_mut() {
            if let Some(origin) = origins.get_mut(&record.hash).and_then(|q| q.pop_front()) {
                record.provenance = Provenance::Confirmed { origin: Some(origin) };
            }
        }

        self.entries = kept;
        self.entries
            .extend(confirmed.into_iter().map(|record| Entry { record, appended_at: 0 }));
        self.applied_seq = ticket.seq;
        self.version += 1;

        RefreshOutcome::Applied { confirmed: confirmed_count, kept_local, skipped }
    }

    /// The fetch could not run. Not an error: the current list, optimistic
    /// entries included, stays on display.
    pub fn apply_unavailable(&mut self, ticket: &RefreshTicket) -> RefreshOutcome {
        if self.is_stale(ticket) {
            return RefreshOutcome::Stale;
        }
        RefreshOutcome::Unavailable
    }
}
