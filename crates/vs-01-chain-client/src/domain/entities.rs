//! Requests and results exchanged with the chain.

use serde::Serialize;
use serde_json::{Map, Value};
use shared_types::{Address, BlockNumber, TxHash, Wei};
use std::fmt;
use std::sync::Arc;

use super::abi::{ContractAbi, Token};
use super::artifact::ContractArtifact;

/// Create a contract from an artifact.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub artifact: Arc<ContractArtifact>,
    /// Constructor arguments, checked against the artifact ABI.
    pub args: Vec<Token>,
    pub from: Address,
    pub gas: u64,
}

/// A mined contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub contract_address: Address,
    pub transaction_hash: TxHash,
    pub block_number: BlockNumber,
}

/// Send a state-changing call to a deployed contract.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub contract: Address,
    pub abi: Arc<ContractAbi>,
    pub method: String,
    pub args: Vec<Token>,
    pub from: Address,
    pub value: Wei,
    pub gas: u64,
}

/// A mined transaction that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: BlockNumber,
    pub gas_used: u64,
}

/// Block bound of a log query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSelector {
    Earliest,
    Latest,
    Number(BlockNumber),
}

impl BlockSelector {
    /// JSON-RPC block tag.
    pub fn to_rpc(self) -> String {
        match self {
            BlockSelector::Earliest => "earliest".to_string(),
            BlockSelector::Latest => "latest".to_string(),
            BlockSelector::Number(n) => format!("0x{n:x}"),
        }
    }

    pub fn contains_lower(self, block: BlockNumber) -> bool {
        match self {
            BlockSelector::Earliest | BlockSelector::Latest => true,
            BlockSelector::Number(n) => block >= n,
        }
    }

    pub fn contains_upper(self, block: BlockNumber) -> bool {
        match self {
            BlockSelector::Earliest => block == 0,
            BlockSelector::Latest => true,
            BlockSelector::Number(n) => block <= n,
        }
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockSelector::Number(n) => write!(f, "{n}"),
            other => f.write_str(&other.to_rpc()),
        }
    }
}

/// Query past logs of one event of one contract.
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub contract: Address,
    pub abi: Arc<ContractAbi>,
    pub event: String,
    pub from_block: BlockSelector,
    pub to_block: BlockSelector,
    /// Keep only logs emitted by this transaction.
    pub transaction_hash: Option<TxHash>,
}

/// A decoded contract log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event: String,
    #[serde(rename = "address")]
    pub contract: Address,
    pub block_number: BlockNumber,
    pub transaction_hash: TxHash,
    pub log_index: u64,
    pub return_values: Map<String, Value>,
}

impl EventRecord {
    pub fn from_fields(
        event: impl Into<String>,
        contract: Address,
        block_number: BlockNumber,
        transaction_hash: TxHash,
        log_index: u64,
        fields: Vec<(String, Token)>,
    ) -> Self {
        let return_values = fields
            .into_iter()
            .map(|(name, token)| (name, token.to_json()))
            .collect();
        Self {
            event: event.into(),
            contract,
            block_number,
            transaction_hash,
            log_index,
            return_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    #[test]
    fn test_block_selector_rpc_tags() {
        assert_eq!(BlockSelector::Number(26).to_rpc(), "0x1a");
        assert_eq!(BlockSelector::Earliest.to_rpc(), "earliest");
        assert!(BlockSelector::Number(5).contains_lower(5));
        assert!(!BlockSelector::Number(5).contains_upper(6));
    }

    #[test]
    fn test_event_record_json_shape() {
        let record = EventRecord::from_fields(
            "Bought",
            Address::repeat_byte(0xc0),
            7,
            TxHash::repeat_byte(0x01),
            0,
            vec![
                ("buyer".into(), Token::Address(Address::repeat_byte(0xa1))),
                ("price".into(), Token::Uint(U256::exp10(18))),
            ],
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "Bought");
        assert_eq!(json["blockNumber"], 7);
        assert_eq!(json["returnValues"]["price"], "1000000000000000000");
        assert!(json["address"].as_str().unwrap().starts_with("0xc0c0"));
    }
}
