// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use basehealth_node::config::NodeConfig;
use basehealth_node::controller::WorkflowController;
use basehealth_node::errors::NodeError;
use basehealth_node::ledger::{HttpLedgerClient, InMemoryLedger, LedgerClient};
use basehealth_node::server::build_router;
use basehealth_node::telemetry;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), NodeError> {
    telemetry::init_telemetry()?;

    let cfg = NodeConfig::from_env()?;
    tracing::info!("Initializing BaseHealth node with config: {:?}", cfg);

    let ledger: Arc<dyn LedgerClient> = if cfg.is_demo() {
        tracing::warn!("BASEHEALTH_CONTRACT not set. Running in demo mode.");
        Arc::new(InMemoryLedger::new())
    } else {
        Arc::new(HttpLedgerClient::new(cfg.gateway_url.clone(), cfg.contract))
    };

    let controller = WorkflowController::new(ledger, &cfg);
    let app = build_router(controller);

    tracing::info!("Listening on {}", cfg.bind_addr);
    let listener = TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
