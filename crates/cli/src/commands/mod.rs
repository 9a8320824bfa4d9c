pub mod hash;
pub mod records;
pub mod share;
pub mod submit;

use std::sync::Arc;

use anyhow::Context;
use basehealth_core::Address;
use basehealth_node::config::NodeConfig;
use basehealth_node::controller::WorkflowController;
use basehealth_node::ledger::{HttpLedgerClient, InMemoryLedger, LedgerClient};

/// Where the session runs and as whom.
#[derive(Debug, Clone)]
pub struct SessionArgs {
    pub account: String,
    pub gateway_url: Option<String>,
    pub contract: Option<String>,
}

impl SessionArgs {
    fn config(&self) -> anyhow::Result<NodeConfig> {
        let mut cfg = NodeConfig::from_env()?;
        if let Some(url) = &self.gateway_url {
            cfg.gateway_url = url.clone();
        }
        if let Some(contract) = &self.contract {
            cfg.contract = contract
                .parse()
                .with_context(|| format!("Invalid contract address {:?}", contract))?;
        }
        Ok(cfg)
    }

    /// A controller connected to `account` with its records loaded.
    pub async fn connect(&self) -> anyhow::Result<WorkflowController> {
        let cfg = self.config()?;
        let account: Address = self
            .account
            .parse()
            .with_context(|| format!("Invalid account address {:?}", self.account))?;

        let ledger: Arc<dyn LedgerClient> = if cfg.is_demo() {
            Arc::new(InMemoryLedger::new())
        } else {
            Arc::new(HttpLedgerClient::new(cfg.gateway_url.clone(), cfg.contract))
        };
        let ctrl = WorkflowController::new(ledger, &cfg);
        ctrl.switch_account(Some(account));
        ctrl.refresh().await;
        Ok(ctrl)
    }
}
