// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transient notices layered over the pipelines.
//!
//! A notice lives for `window` after it is raised, or until dismissed. It
//! never feeds back into pipeline state.

use std::time::Duration;

use basehealth_core::{OperationKind, TxHandle};
use serde::Serialize;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Clone, Debug, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NoticeKind,
    pub operation: OperationKind,
    pub message: String,
    pub tx: Option<TxHandle>,
    pub explorer_url: Option<String>,
    #[serde(skip)]
    expires_at: Instant,
}

#[derive(Debug)]
pub struct NotificationCenter {
    window: Duration,
    explorer_base: String,
    next_id: u64,
    notices: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(window: Duration, explorer_base: impl Into<String>) -> Self {
        Self {
            window,
            explorer_base: explorer_base.into().trim_end_matches('/').to_string(),
            next_id: 1,
            notices: Vec::new(),
        }
    }

    pub fn explorer_link(&self, tx: &TxHandle) -> String {
        format!("{}/tx/{}", self.explorer_base, tx)
    }

    pub fn push(
        &mut self,
        kind: NoticeKind,
        operation: OperationKind,
        message: impl Into<String>,
        tx: Option<TxHandle>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let explorer_url = tx.as_ref().map(|t| self.explorer_link(t));
        self.notices.push(Notification {
            id,
            kind,
            operation,
            message: message.into(),
            tx,
            explorer_url,
            expires_at: Instant::now() + self.window,
        });
        id
    }

    /// Notices still inside their display window, oldest first.
    pub fn active(&mut self) -> Vec<Notification> {
        let now = Instant::now();
        self.notices.retain(|n| n.expires_at > now);
        self.notices.clone()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires_after_window() {
        let mut center = NotificationCenter::new(Duration::from_secs(5), "https://explorer.test/");
        let id = center.push(
            NoticeKind::Success,
            OperationKind::SubmitRecord,
            "stored",
            Some(TxHandle::new("0xabc")),
        );

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, id);
        assert_eq!(active[0].explorer_url.as_deref(), Some("https://explorer.test/tx/0xabc"));

        tokio::time::advance(Duration::from_millis(4_900)).await;
        assert_eq!(center.active().len(), 1);

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(center.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_is_early_and_idempotent() {
        let mut center = NotificationCenter::new(Duration::from_secs(5), "https://explorer.test");
        let first = center.push(NoticeKind::Failure, OperationKind::GrantAccess, "nope", None);
        let second = center.push(NoticeKind::Success, OperationKind::GrantAccess, "ok", None);

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
        assert!(active[0].explorer_url.is_none());
    }
}
