//! Ethereum JSON-RPC wire types.

use primitive_types::H256;
use serde::{Deserialize, Serialize};
use shared_types::{Address, TxHash};

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: serde_json::Value,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// Transaction object for `eth_sendTransaction`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCall {
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub gas: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub data: String,
}

/// Filter object for `eth_getLogs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    pub topics: Vec<H256>,
    pub from_block: String,
    pub to_block: String,
}

/// Result of `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: TxHash,
    #[serde(default, with = "opt_quantity")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default, with = "opt_quantity")]
    pub gas_used: Option<u64>,
    /// `0x1` success, `0x0` failure. Absent on pre-Byzantium chains.
    #[serde(default, with = "opt_quantity")]
    pub status: Option<u64>,
}

impl RpcReceipt {
    pub fn failed(&self) -> bool {
        self.status == Some(0)
    }
}

/// Entry of an `eth_getLogs` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<H256>,
    #[serde(default)]
    pub data: String,
    #[serde(default, with = "opt_quantity")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
    #[serde(default, with = "opt_quantity")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

/// Hex quantities such as `"0x1a"`.
pub fn parse_quantity(value: &str) -> Result<u64, String> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity without 0x prefix: {value}"))?;
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {value}: {e}"))
}

/// Encode a quantity the way nodes expect it: no leading zeros.
pub fn to_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Optional hex quantity fields.
pub mod opt_quantity {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| super::parse_quantity(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
