// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! JSON client for a contract gateway.
//!
//! ```text
//! GET  {base}/v1/contracts/{contract}/records/{owner}  -> [{hash, timestamp}]
//! POST {base}/v1/contracts/{contract}/records          {account, hash}    -> {tx}
//! POST {base}/v1/contracts/{contract}/grants           {account, grantee} -> {tx}
//! GET  {base}/v1/contracts/{contract}/tx/{tx}          -> {confirmed, failure_reason?}
//! ```
//!
//! A 403 on a write means the wallet declined to sign.

use async_trait::async_trait;
use basehealth_core::{Address, Fingerprint, LedgerRecord, TxHandle};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{Confirmation, LedgerClient, LedgerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRecordRequest {
    pub account: Address,
    pub hash: Fingerprint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantAccessRequest {
    pub account: Address,
    pub grantee: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub tx: TxHandle,
}

#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    base_url: String,
    contract: Address,
    client: Client,
}

impl HttpLedgerClient {
    pub fn new(url: String, contract: Address) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            contract,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/contracts/{}/{}", self.base_url, self.contract, path)
    }

    async fn write(&self, path: &str, body: &impl Serialize) -> Result<TxHandle, LedgerError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if resp.status() == StatusCode::FORBIDDEN {
            return Err(LedgerError::UserRejected);
        }
        if !resp.status().is_success() {
            return Err(LedgerError::Rejected(failure_text(resp).await));
        }

        let body: TxResponse = resp
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        Ok(body.tx)
    }
}

/// Gateway error body if it has one, status line otherwise.
async fn failure_text(resp: Response) -> String {
    let status = resp.status();
    match resp.text().await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => format!("gateway returned {}", status),
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn fetch_records(&self, owner: &Address) -> Result<Vec<LedgerRecord>, LedgerError> {
        let url = self.url(&format!("records/{}", owner));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LedgerError::Unavailable(format!("Records request failed: {}", resp.status())));
        }

        resp.json().await.map_err(|e| LedgerError::Unavailable(e.to_string()))
    }

    async fn submit_record(&self, account: &Address, hash: &Fingerprint) -> Result<TxHandle, LedgerError> {
        let body = SubmitRecordRequest { account: *account, hash: hash.clone() };
        self.write("records", &body).await
    }

    async fn grant_access(&self, account: &Address, grantee: &Address) -> Result<TxHandle, LedgerError> {
        let body = GrantAccessRequest { account: *account, grantee: *grantee };
        self.write("grants", &body).await
    }

    async fn await_confirmation(&self, tx: &TxHandle) -> Result<Confirmation, LedgerError> {
        let url = self.url(&format!("tx/{}", tx));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LedgerError::Unavailable(format!("Receipt request failed: {}", resp.status())));
        }

        resp.json().await.map_err(|e| LedgerError::Unavailable(e.to_string()))
    }
}
