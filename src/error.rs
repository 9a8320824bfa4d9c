// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

use crate::pipeline::PhaseName;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The selected file could not be read; reselecting it is the only remedy.
    #[error("Hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Invalid transition: cannot {event} while {from:?}")]
    InvalidTransition {
        from: PhaseName,
        event: &'static str,
    },
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Hashing(e.to_string())
    }
}

pub type CoreResult<T> = core::result::Result<T, CoreError>;
