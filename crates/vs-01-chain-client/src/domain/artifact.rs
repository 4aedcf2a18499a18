//! Compiled contract artifacts.
//!
//! Two JSON layouts are accepted:
//!
//! - a plain artifact: `{"contractName": "...", "abi": [...], "bytecode": "0x..."}`
//! - `solc --combined-json abi,bin` output:
//!   `{"contracts": {"car_contract.sol:Vehicle2": {"abi": ..., "bin": "..."}}}`

use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::abi::ContractAbi;
use crate::errors::AbiError;

/// Interface description of the vehicle sale contract.
///
/// Matches `contracts/Vehicle2.sol`: constructor `(vin, cost, buyer)`, a payable
/// `buyVehicle()` and a `Bought(buyer, price)` event.
pub const VEHICLE_SALE_ABI: &str = r#"[
  {"type":"constructor","stateMutability":"nonpayable","inputs":[
    {"name":"vin","type":"string"},
    {"name":"cost","type":"uint256"},
    {"name":"buyer","type":"address"}]},
  {"type":"function","name":"buyVehicle","stateMutability":"payable","inputs":[],"outputs":[]},
  {"type":"event","name":"Bought","anonymous":false,"inputs":[
    {"name":"buyer","type":"address","indexed":false},
    {"name":"price","type":"uint256","indexed":false}]}
]"#;

/// ABI plus creation bytecode for one contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: Option<String>,
    pub abi: Arc<ContractAbi>,
    pub bytecode: Vec<u8>,
}

impl ContractArtifact {
    pub fn new(name: Option<String>, abi: ContractAbi, bytecode: Vec<u8>) -> Self {
        Self {
            name,
            abi: Arc::new(abi),
            bytecode,
        }
    }

    /// The built-in vehicle sale interface with no bytecode, for chains that
    /// do not execute creation code (the in-memory development chain).
    pub fn vehicle_sale_interface() -> Result<Self, AbiError> {
        Ok(Self::new(
            Some("Vehicle2".to_string()),
            ContractAbi::parse(VEHICLE_SALE_ABI)?,
            Vec::new(),
        ))
    }

    /// Load an artifact file. `contract` picks an entry out of combined-json
    /// output and may be omitted when the file holds exactly one contract.
    pub fn load(path: impl AsRef<Path>, contract: Option<&str>) -> Result<Self, AbiError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AbiError::InvalidArtifact(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&text, contract)
    }

    pub fn parse(text: &str, contract: Option<&str>) -> Result<Self, AbiError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| AbiError::InvalidArtifact(format!("artifact is not JSON: {e}")))?;

        if let Some(contracts) = value.get("contracts").and_then(Value::as_object) {
            let (key, entry) = match contract {
                Some(wanted) => contracts
                    .iter()
                    .find(|(key, _)| key.as_str() == wanted || key.rsplit(':').next() == Some(wanted))
                    .ok_or_else(|| {
                        AbiError::InvalidArtifact(format!("contract {wanted} not in artifact"))
                    })?,
                None if contracts.len() == 1 => contracts
                    .iter()
                    .next()
                    .ok_or_else(|| AbiError::InvalidArtifact("no contracts".into()))?,
                None => {
                    return Err(AbiError::InvalidArtifact(format!(
                        "artifact holds {} contracts, name one of them",
                        contracts.len()
                    )))
                }
            };
            let name = key.rsplit(':').next().map(str::to_string);
            return Self::from_entry(name, entry);
        }

        let name = value
            .get("contractName")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self::from_entry(name, &value)
    }

    fn from_entry(name: Option<String>, entry: &Value) -> Result<Self, AbiError> {
        let abi = entry
            .get("abi")
            .ok_or_else(|| AbiError::InvalidArtifact("missing abi".into()))?;
        let bytecode = entry
            .get("bytecode")
            .or_else(|| entry.get("bin"))
            .and_then(Value::as_str)
            .ok_or_else(|| AbiError::InvalidArtifact("missing bytecode".into()))?;
        let bytecode = hex::decode(bytecode.trim().trim_start_matches("0x"))
            .map_err(|e| AbiError::InvalidArtifact(format!("bytecode is not hex: {e}")))?;
        if bytecode.is_empty() {
            return Err(AbiError::InvalidArtifact("bytecode is empty".into()));
        }
        Ok(Self::new(name, ContractAbi::from_json(abi)?, bytecode))
    }
}
