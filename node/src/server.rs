// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use basehealth_core::reconciler::RefreshOutcome;
use basehealth_core::Address;
use tower_http::trace::TraceLayer;

use crate::api::*;
use crate::controller::{IntentOutcome, StagedFile, WorkflowController};
use crate::errors::NodeError;

pub fn build_router(controller: WorkflowController) -> Router {
    if controller.is_demo() {
        tracing::warn!("Demo mode: no contract configured, writes stay local");
    }

    Router::new()
        .route("/v1/account", post(switch_account))
        .route("/v1/file", post(select_file))
        .route("/v1/submit", post(submit))
        .route("/v1/share", post(share))
        .route("/v1/records/refresh", post(refresh))
        .route("/v1/session", get(session))
        .route("/v1/notifications/:id", delete(dismiss))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}

fn intent_response(outcome: IntentOutcome) -> IntentResponse {
    match outcome {
        IntentOutcome::Started(ticket) => IntentResponse {
            started: true,
            operation: Some(ticket.id),
            ignored: None,
        },
        IntentOutcome::Ignored(reason) => IntentResponse {
            started: false,
            operation: None,
            ignored: Some(reason),
        },
    }
}

async fn switch_account(
    State(ctrl): State<WorkflowController>,
    Json(payload): Json<AccountRequest>,
) -> Result<Json<AccountResponse>, NodeError> {
    let account = match payload.address.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<Address>()?),
    };
    let changed = ctrl.switch_account(account);
    if changed {
        ctrl.refresh().await;
    }
    let records = ctrl.snapshot().records.len();
    Ok(Json(AccountResponse { account, changed, records }))
}

async fn select_file(
    State(ctrl): State<WorkflowController>,
    Json(payload): Json<SelectFileRequest>,
) -> Result<Json<SelectFileResponse>, NodeError> {
    let file = match (payload.path, payload.content_hex) {
        (Some(path), None) => {
            let mut file = StagedFile::from_path(path);
            if !payload.name.is_empty() {
                file.name = payload.name;
            }
            file
        }
        (None, Some(content)) => {
            let bytes = hex::decode(content.trim())
                .map_err(|e| NodeError::InvalidInput(format!("content_hex: {}", e)))?;
            StagedFile::from_bytes(payload.name, bytes)
        }
        _ => {
            return Err(NodeError::InvalidInput(
                "exactly one of path or content_hex is required".to_string(),
            ))
        }
    };
    let staged = file.name.clone();
    ctrl.select_file(file);
    Ok(Json(SelectFileResponse { staged }))
}

async fn submit(State(ctrl): State<WorkflowController>) -> Result<Json<IntentResponse>, NodeError> {
    Ok(Json(intent_response(ctrl.submit()?)))
}

async fn share(
    State(ctrl): State<WorkflowController>,
    Json(payload): Json<ShareRequest>,
) -> Result<Json<IntentResponse>, NodeError> {
    Ok(Json(intent_response(ctrl.share(&payload.grantee)?)))
}

async fn refresh(State(ctrl): State<WorkflowController>) -> Json<RefreshResponse> {
    let outcome = match ctrl.refresh().await {
        RefreshOutcome::Applied { .. } => "applied",
        RefreshOutcome::Unavailable => "unavailable",
        RefreshOutcome::Stale => "stale",
    };
    let records = ctrl.snapshot().records.len();
    Json(RefreshResponse { outcome: outcome.to_string(), records })
}

async fn session(State(ctrl): State<WorkflowController>) -> Json<SessionView> {
    Json(ctrl.snapshot())
}

async fn dismiss(State(ctrl): State<WorkflowController>, Path(id): Path<u64>) -> Json<DismissResponse> {
    Json(DismissResponse { dismissed: ctrl.dismiss(id) })
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
