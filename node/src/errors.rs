// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use basehealth_core::CoreError;
use serde_json::json;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            NodeError::Core(CoreError::InvalidAddress(msg)) => (StatusCode::BAD_REQUEST, msg),
            NodeError::Core(CoreError::InvalidFingerprint(msg)) => (StatusCode::BAD_REQUEST, msg),
            NodeError::Core(e) => (StatusCode::CONFLICT, e.to_string()),
            NodeError::Ledger(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            NodeError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            NodeError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            NodeError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
