//! HTTP JSON-RPC adapter for the [`ChainClient`] port.
//!
//! Node-managed accounts sign transactions (`eth_sendTransaction`), so this
//! client never holds keys. Mining is confirmed by polling
//! `eth_getTransactionReceipt` at a fixed interval.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{format_address, Address, TxHash, Wei};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::rpc_types::*;
use crate::domain::abi::EventLogExt;
use crate::domain::entities::{
    DeployRequest, Deployment, EventQuery, EventRecord, InvokeRequest, Receipt,
};
use crate::errors::ChainError;
use crate::ports::outbound::ChainClient;

/// Connection settings for a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Node endpoint, e.g. `http://localhost:8545`.
    pub url: String,
    /// Upper bound for one HTTP exchange.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Delay between receipt polls while waiting for mining.
    pub poll_interval: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// JSON-RPC chain client.
pub struct JsonRpcChainClient {
    client: Client,
    config: RpcConfig,
    request_id: AtomicU64,
}

impl JsonRpcChainClient {
    pub fn new(config: RpcConfig) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            config,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a method whose result may legitimately be `null`.
    async fn call_optional<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, ChainError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ChainError::Transport(format!("cannot connect to {}", self.config.url))
                } else if e.is_timeout() {
                    ChainError::Transport(format!("{method} timed out"))
                } else {
                    ChainError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Transport(format!("{method}: HTTP {status}")));
        }

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| ChainError::Decode(format!("{method}: {e}")))?;

        if let Some(error) = rpc_response.error {
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, ChainError> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| ChainError::Decode(format!("{method}: missing result")))
    }

    async fn send_transaction(&self, tx: TransactionCall) -> Result<TxHash, ChainError> {
        self.call("eth_sendTransaction", [tx]).await
    }

    /// Poll until the transaction is mined. Callers bound the wait.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<RpcReceipt, ChainError> {
        let mut polls = 0u32;
        loop {
            let receipt: Option<RpcReceipt> = self
                .call_optional("eth_getTransactionReceipt", [hash])
                .await?;
            match receipt {
                Some(receipt) if receipt.block_number.is_some() => {
                    debug!(tx_hash = ?hash, polls, "Transaction mined");
                    if receipt.failed() {
                        return Err(ChainError::Reverted(format!(
                            "transaction {:#x} failed in block {}",
                            hash,
                            receipt.block_number.unwrap_or_default()
                        )));
                    }
                    return Ok(receipt);
                }
                _ => {
                    polls += 1;
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    #[instrument(skip(self))]
    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        self.call::<[(); 0], Vec<Address>>("eth_accounts", []).await
    }

    #[instrument(skip(self), fields(address = %format_address(&address)))]
    async fn balance(&self, address: Address) -> Result<Wei, ChainError> {
        let params = serde_json::json!([address, "latest"]);
        self.call("eth_getBalance", params).await
    }

    #[instrument(skip(self, passphrase), fields(address = %format_address(&address)))]
    async fn unlock(
        &self,
        address: Address,
        passphrase: &str,
        duration: Duration,
    ) -> Result<bool, ChainError> {
        let params = serde_json::json!([address, passphrase, duration.as_secs()]);
        match self.call::<_, bool>("personal_unlockAccount", params).await {
            Ok(unlocked) => Ok(unlocked),
            Err(ChainError::Rpc { code, message }) => {
                warn!(code, %message, "Node refused to unlock account");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, request), fields(from = %format_address(&request.from)))]
    async fn deploy(&self, request: DeployRequest) -> Result<Deployment, ChainError> {
        let mut code = request.artifact.bytecode.clone();
        code.extend(request.artifact.abi.encode_constructor(&request.args)?);

        let hash = self
            .send_transaction(TransactionCall {
                from: request.from,
                to: None,
                gas: to_quantity(request.gas),
                value: None,
                data: format!("0x{}", hex::encode(code)),
            })
            .await?;
        debug!(tx_hash = ?hash, "Contract creation submitted");

        let receipt = self.wait_for_receipt(hash).await?;
        let contract_address = receipt
            .contract_address
            .ok_or_else(|| ChainError::Decode("receipt has no contractAddress".into()))?;

        Ok(Deployment {
            contract_address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default(),
        })
    }

    #[instrument(
        skip(self, request),
        fields(contract = %format_address(&request.contract), method = %request.method)
    )]
    async fn invoke(&self, request: InvokeRequest) -> Result<Receipt, ChainError> {
        let data = request.abi.encode_call(&request.method, &request.args)?;

        let hash = self
            .send_transaction(TransactionCall {
                from: request.from,
                to: Some(request.contract),
                gas: to_quantity(request.gas),
                value: Some(format!("{:#x}", request.value.into_inner())),
                data: format!("0x{}", hex::encode(data)),
            })
            .await?;
        debug!(tx_hash = ?hash, "Contract call submitted");

        let receipt = self.wait_for_receipt(hash).await?;
        Ok(Receipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or_default(),
            gas_used: receipt.gas_used.unwrap_or_default(),
        })
    }

    #[instrument(
        skip(self, query),
        fields(contract = %format_address(&query.contract), event = %query.event)
    )]
    async fn past_events(&self, query: EventQuery) -> Result<Vec<EventRecord>, ChainError> {
        let event = query.abi.event(&query.event)?;
        let filter = LogFilter {
            address: query.contract,
            topics: vec![event.topic()],
            from_block: query.from_block.to_rpc(),
            to_block: query.to_block.to_rpc(),
        };
        let logs: Vec<RpcLog> = self.call("eth_getLogs", [filter]).await?;

        let mut records = Vec::with_capacity(logs.len());
        for log in logs.into_iter().filter(|l| !l.removed) {
            let Some(tx_hash) = log.transaction_hash else {
                // Pending logs carry no transaction hash yet.
                continue;
            };
            if query.transaction_hash.is_some_and(|wanted| wanted != tx_hash) {
                continue;
            }
            let data = hex::decode(log.data.trim_start_matches("0x"))
                .map_err(|e| ChainError::Decode(format!("log data is not hex: {e}")))?;
            let fields = event.decode_fields(&log.topics, &data)?;
            records.push(EventRecord::from_fields(
                event.name.clone(),
                log.address,
                log.block_number.unwrap_or_default(),
                tx_hash,
                log.log_index.unwrap_or_default(),
                fields,
            ));
        }
        records.sort_by_key(|r| (r.block_number, r.log_index));
        Ok(records)
    }
}
