// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::time::Duration;

use basehealth_core::fingerprint::DigestAlgorithm;
use basehealth_core::Address;

use crate::errors::NodeError;

/// Base Sepolia block explorer.
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.basescan.org";

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    /// Contract gateway the ledger client talks to.
    pub gateway_url: String,
    /// Deployed record contract. The zero address means demo mode.
    pub contract: Address,
    pub digest: DigestAlgorithm,
    /// How long a success/failure notice stays visible.
    pub notice_window: Duration,
    pub explorer_url: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            gateway_url: "http://127.0.0.1:8545".to_string(),
            contract: Address::ZERO,
            digest: DigestAlgorithm::Sha256,
            notice_window: Duration::from_secs(5),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

impl NodeConfig {
    /// Writes bypass the ledger entirely when no contract is configured.
    pub fn is_demo(&self) -> bool {
        self.contract.is_zero()
    }

    /// Defaults overridden by `BASEHEALTH_*` environment variables.
    pub fn from_env() -> Result<Self, NodeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, NodeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(bind) = lookup("BASEHEALTH_BIND") {
            cfg.bind_addr = bind
                .parse()
                .map_err(|e| NodeError::Config(format!("BASEHEALTH_BIND={}: {}", bind, e)))?;
        }
        if let Some(url) = lookup("BASEHEALTH_GATEWAY_URL") {
            cfg.gateway_url = url;
        }
        if let Some(contract) = lookup("BASEHEALTH_CONTRACT") {
            cfg.contract = contract
                .parse()
                .map_err(|e| NodeError::Config(format!("BASEHEALTH_CONTRACT: {}", e)))?;
        }
        if let Some(name) = lookup("BASEHEALTH_DIGEST") {
            cfg.digest = DigestAlgorithm::from_name(&name)
                .ok_or_else(|| NodeError::Config(format!("BASEHEALTH_DIGEST: unknown algorithm {:?}", name)))?;
        }
        if let Some(secs) = lookup("BASEHEALTH_NOTICE_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| NodeError::Config(format!("BASEHEALTH_NOTICE_SECS={}: {}", secs, e)))?;
            cfg.notice_window = Duration::from_secs(secs);
        }
        if let Some(url) = lookup("BASEHEALTH_EXPLORER") {
            cfg.explorer_url = url;
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_demo_mode() {
        let cfg = NodeConfig::default();
        assert!(cfg.is_demo());
        assert_eq!(cfg.notice_window, Duration::from_secs(5));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BASEHEALTH_CONTRACT", "0xd8b934580fcE35a11B58C6D73aDeE468a2833fa8"),
            ("BASEHEALTH_DIGEST", "blake3"),
            ("BASEHEALTH_NOTICE_SECS", "2"),
            ("BASEHEALTH_BIND", "0.0.0.0:8080"),
        ]
        .into_iter()
        .collect();
        let cfg = NodeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert!(!cfg.is_demo());
        assert_eq!(cfg.digest, DigestAlgorithm::Blake3);
        assert_eq!(cfg.notice_window, Duration::from_secs(2));
        assert_eq!(cfg.bind_addr.port(), 8080);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = NodeConfig::from_lookup(|k| (k == "BASEHEALTH_CONTRACT").then(|| "0x1234".to_string()))
            .unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));

        let err = NodeConfig::from_lookup(|k| (k == "BASEHEALTH_DIGEST").then(|| "md5".to_string()))
            .unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }
}
