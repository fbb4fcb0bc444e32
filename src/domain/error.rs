//! Error taxonomy with JSON-RPC 2.0 error codes.

use crate::domain::types::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const SERVER_ERROR: i32 = -32000;
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const TRANSACTION_REJECTED: i32 = -32003;

    // Ethereum specific errors (-32000 range, per EIP-1474)
    pub const EXECUTION_ERROR: i32 = -32015;
}

/// JSON-RPC error object as returned by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    pub fn execution_reverted(details: impl Into<String>, data: Option<Vec<u8>>) -> Self {
        let mut error = Self::new(
            codes::EXECUTION_ERROR,
            format!("Execution reverted: {}", details.into()),
        );
        if let Some(revert_data) = data {
            error.data = Some(serde_json::Value::String(format!(
                "0x{}",
                hex::encode(revert_data)
            )));
        }
        error
    }

    /// Used to decide whether a dev-namespace method should be retried
    /// under the other node family's prefix.
    pub fn is_method_not_found(&self) -> bool {
        self.code == codes::METHOD_NOT_FOUND
    }

    /// Revert payload carried in the error `data` member, if any.
    ///
    /// Nodes differ here: Anvil puts the hex payload directly in `data`,
    /// Hardhat nests it under `data.data`.
    pub fn revert_data(&self) -> Option<Vec<u8>> {
        let data = self.data.as_ref()?;
        let hex_str = data
            .as_str()
            .or_else(|| data.get("data").and_then(|d| d.as_str()))?;
        hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str)).ok()
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// A failed migration verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckFailure {
    pub name: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.name, self.expected, self.actual
        )
    }
}

/// Crate-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP-layer failure talking to the node
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed JSON-RPC response envelope
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Error object returned by the node
    #[error("rpc error: {0}")]
    Rpc(RpcError),

    /// Transaction or call reverted on chain
    #[error("execution reverted: {}", .reason.as_deref().unwrap_or("<no reason>"))]
    Reverted {
        reason: Option<String>,
        data: Option<Bytes>,
    },

    /// ABI encode/decode failure
    #[error("abi error: {0}")]
    Abi(String),

    /// Receipt did not appear within the configured timeout
    #[error("no receipt for {tx_hash} after {waited_ms}ms")]
    ReceiptTimeout { tx_hash: String, waited_ms: u64 },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A migration verification failed
    #[error("check failed: {0}")]
    Check(CheckFailure),
}

impl From<RpcError> for Error {
    fn from(e: RpcError) -> Self {
        if e.code == codes::EXECUTION_ERROR || e.message.to_lowercase().contains("revert") {
            let data = e.revert_data();
            let reason = data
                .as_deref()
                .and_then(crate::abi::decode_revert_reason);
            Error::Reverted {
                reason,
                data: data.map(Bytes),
            }
        } else {
            Error::Rpc(e)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidResponse(e.to_string())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(String),

    #[error("{field} must not be the zero address")]
    ZeroAddress { field: &'static str },

    #[error("{field} has no code at {address}")]
    NoContractCode { field: &'static str, address: String },

    #[error("strategy creation bytecode is empty")]
    EmptyBytecode,

    #[error("invalid bytecode hex: {0}")]
    InvalidBytecode(String),

    #[error("receipt poll interval cannot be zero")]
    ZeroPollInterval,

    #[error("receipt timeout shorter than poll interval")]
    TimeoutTooShort,
}

/// Result type for crate operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
