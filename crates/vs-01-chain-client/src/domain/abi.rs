//! # Contract ABI
//!
//! Interfaces are parsed with `alloy-json-abi` and values are encoded and
//! decoded with `alloy-dyn-abi`. This module only bridges the workspace's
//! `primitive-types` values to alloy's and renders decoded log fields as
//! JSON.
//!
//! [`Token`] covers the scalar Solidity types a sale contract needs:
//! `address`, `bool`, `uintN`, `intN`, `bytesN`, `bytes` and `string`.
//! Arrays and tuples are rejected as unsupported.

use alloy_dyn_abi::{DynSolType, DynSolValue, EventExt, JsonAbiExt};
use alloy_json_abi::{JsonAbi, StateMutability};
use alloy_primitives::{B256, I256};
use primitive_types::{H256, U256};
use shared_types::{format_address, Address};

use crate::errors::AbiError;

pub use alloy_json_abi::{Constructor, Event, EventParam, Function, Param};

fn to_alloy_uint(value: U256) -> alloy_primitives::U256 {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    alloy_primitives::U256::from_be_bytes(word)
}

fn from_alloy_uint(value: alloy_primitives::U256) -> U256 {
    U256::from_big_endian(&value.to_be_bytes::<32>())
}

// =============================================================================
// TOKENS
// =============================================================================

/// A single ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Uint(U256),
    /// Two's complement representation.
    Int(U256),
    FixedBytes(Vec<u8>),
    String(String),
    Bytes(Vec<u8>),
}

impl Token {
    /// Convert to an alloy value of type `ty`, or `None` when the token does
    /// not fit it.
    pub fn to_sol(&self, ty: &DynSolType) -> Option<DynSolValue> {
        match (self, ty) {
            (Token::Address(a), DynSolType::Address) => {
                Some(DynSolValue::Address(alloy_primitives::Address::from(a.0)))
            }
            (Token::Bool(b), DynSolType::Bool) => Some(DynSolValue::Bool(*b)),
            (Token::Uint(v), DynSolType::Uint(bits)) => {
                (v.bits() <= *bits).then(|| DynSolValue::Uint(to_alloy_uint(*v), *bits))
            }
            (Token::Int(v), DynSolType::Int(bits)) => {
                let value = I256::from_raw(to_alloy_uint(*v));
                // In range when everything above the sign bit is sign extension.
                let high = value.asr(*bits - 1);
                (high == I256::ZERO || high == I256::MINUS_ONE)
                    .then_some(DynSolValue::Int(value, *bits))
            }
            (Token::FixedBytes(b), DynSolType::FixedBytes(size)) if b.len() == *size => {
                let mut word = B256::ZERO;
                word.0[..*size].copy_from_slice(b);
                Some(DynSolValue::FixedBytes(word, *size))
            }
            (Token::String(s), DynSolType::String) => Some(DynSolValue::String(s.clone())),
            (Token::Bytes(b), DynSolType::Bytes) => Some(DynSolValue::Bytes(b.clone())),
            _ => None,
        }
    }

    pub fn from_sol(value: DynSolValue) -> Result<Self, AbiError> {
        Ok(match value {
            DynSolValue::Address(a) => Token::Address(Address::from_slice(a.as_slice())),
            DynSolValue::Bool(b) => Token::Bool(b),
            DynSolValue::Uint(v, _) => Token::Uint(from_alloy_uint(v)),
            DynSolValue::Int(v, _) => Token::Int(from_alloy_uint(v.into_raw())),
            DynSolValue::FixedBytes(word, size) => Token::FixedBytes(word.0[..size].to_vec()),
            DynSolValue::String(s) => Token::String(s),
            DynSolValue::Bytes(b) => Token::Bytes(b),
            other => {
                return Err(AbiError::UnsupportedType(
                    other.sol_type_name().unwrap_or_default().into_owned(),
                ))
            }
        })
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Token::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// JSON rendering in the style of web3 `returnValues`: integers as
    /// decimal strings, addresses and byte strings as `0x` hex.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Token::Address(a) => Value::String(format_address(a)),
            Token::Bool(b) => Value::Bool(*b),
            Token::Uint(v) => Value::String(v.to_string()),
            Token::Int(v) => Value::String(I256::from_raw(to_alloy_uint(*v)).to_string()),
            Token::FixedBytes(b) | Token::Bytes(b) => {
                Value::String(format!("0x{}", hex::encode(b)))
            }
            Token::String(s) => Value::String(s.clone()),
        }
    }
}

fn resolve(ty: &str) -> Result<DynSolType, AbiError> {
    match DynSolType::parse(ty) {
        Ok(kind @ (DynSolType::Array(_) | DynSolType::FixedArray(..) | DynSolType::Tuple(_))) => {
            Err(AbiError::UnsupportedType(kind.sol_type_name().into_owned()))
        }
        Ok(kind) => Ok(kind),
        Err(_) => Err(AbiError::UnsupportedType(ty.to_string())),
    }
}

/// Match `args` against `inputs` and convert them to alloy values.
fn sol_arguments(
    context: &str,
    inputs: &[Param],
    args: &[Token],
) -> Result<Vec<DynSolValue>, AbiError> {
    if inputs.len() != args.len() {
        return Err(AbiError::ArgumentMismatch {
            context: context.to_string(),
            reason: format!("expected {} arguments, got {}", inputs.len(), args.len()),
        });
    }
    inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            let kind = resolve(&param.ty)?;
            arg.to_sol(&kind).ok_or_else(|| AbiError::ArgumentMismatch {
                context: context.to_string(),
                reason: format!("argument {index} is not a valid {}", kind.sol_type_name()),
            })
        })
        .collect()
}

// =============================================================================
// EVENTS
// =============================================================================

/// Log helpers on top of [`EventExt`].
pub trait EventLogExt {
    /// `topics[0]` of every non-anonymous log of this event.
    fn topic(&self) -> H256;

    /// Decode a raw log into `(field name, value)` pairs in declaration
    /// order. Unnamed fields are keyed by their position.
    fn decode_fields(&self, topics: &[H256], data: &[u8])
        -> Result<Vec<(String, Token)>, AbiError>;
}

impl EventLogExt for Event {
    fn topic(&self) -> H256 {
        H256(self.selector().0)
    }

    fn decode_fields(
        &self,
        topics: &[H256],
        data: &[u8],
    ) -> Result<Vec<(String, Token)>, AbiError> {
        for param in &self.inputs {
            resolve(&param.ty)?;
        }
        if !self.anonymous && topics.first() != Some(&self.topic()) {
            return Err(AbiError::InvalidData(format!(
                "log topic does not match event {}",
                self.name
            )));
        }
        let decoded = self
            .decode_log_parts(topics.iter().map(|t| B256::from(t.0)), data)
            .map_err(|e| AbiError::InvalidData(format!("{} log: {e}", self.name)))?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let mut fields = Vec::with_capacity(self.inputs.len());
        for (index, param) in self.inputs.iter().enumerate() {
            let value = if param.indexed { indexed.next() } else { body.next() };
            let value = value.ok_or_else(|| {
                AbiError::InvalidData(format!("{} log is missing field {index}", self.name))
            })?;
            let name = if param.name.is_empty() {
                index.to_string()
            } else {
                param.name.clone()
            };
            fields.push((name, Token::from_sol(value)?));
        }
        Ok(fields)
    }
}

// =============================================================================
// ABI DOCUMENT
// =============================================================================

/// A parsed contract interface.
#[derive(Debug, Clone, Default)]
pub struct ContractAbi {
    inner: JsonAbi,
}

impl ContractAbi {
    /// Parse ABI JSON text (a JSON array of entries).
    pub fn parse(text: &str) -> Result<Self, AbiError> {
        let inner = serde_json::from_str(text)
            .map_err(|e| AbiError::InvalidArtifact(format!("bad ABI: {e}")))?;
        Ok(Self { inner })
    }

    /// Build from a JSON value. Older compilers emit the ABI as a
    /// JSON-encoded string, which is accepted too.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AbiError> {
        match value {
            serde_json::Value::String(text) => Self::parse(text),
            serde_json::Value::Array(_) => {
                let inner = serde_json::from_value(value.clone())
                    .map_err(|e| AbiError::InvalidArtifact(format!("bad ABI: {e}")))?;
                Ok(Self { inner })
            }
            _ => Err(AbiError::InvalidArtifact("ABI must be a JSON array".into())),
        }
    }

    pub fn json_abi(&self) -> &JsonAbi {
        &self.inner
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.inner.constructor()
    }

    /// First function called `name`.
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.inner
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownItem {
                kind: "function",
                name: name.to_string(),
            })
    }

    pub fn event(&self, name: &str) -> Result<&Event, AbiError> {
        self.inner
            .event(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownItem {
                kind: "event",
                name: name.to_string(),
            })
    }

    pub fn is_payable(&self, name: &str) -> Result<bool, AbiError> {
        Ok(self.function(name)?.state_mutability == StateMutability::Payable)
    }

    /// Encoded constructor arguments, appended to the creation bytecode.
    pub fn encode_constructor(&self, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        let Some(constructor) = self.constructor() else {
            sol_arguments("constructor", &[], args)?;
            return Ok(Vec::new());
        };
        let values = sol_arguments("constructor", &constructor.inputs, args)?;
        constructor
            .abi_encode_input(&values)
            .map_err(|e| AbiError::ArgumentMismatch {
                context: "constructor".to_string(),
                reason: e.to_string(),
            })
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, name: &str, args: &[Token]) -> Result<Vec<u8>, AbiError> {
        let function = self.function(name)?;
        let values = sol_arguments(name, &function.inputs, args)?;
        function
            .abi_encode_input(&values)
            .map_err(|e| AbiError::ArgumentMismatch {
                context: name.to_string(),
                reason: e.to_string(),
            })
    }
}
