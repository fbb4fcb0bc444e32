//! Migration configuration with validation.
//!
//! Loaded from a JSON file; the node URL and bytecode path can be overridden
//! through `STRAT_MIGRATE_NODE_URL` and `STRAT_MIGRATE_BYTECODE`.

use crate::domain::error::ConfigError;
use crate::domain::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var overriding `node.url`.
pub const ENV_NODE_URL: &str = "STRAT_MIGRATE_NODE_URL";
/// Env var overriding `strategy.bytecode_path`.
pub const ENV_BYTECODE: &str = "STRAT_MIGRATE_BYTECODE";

/// Main migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Dev node connection
    #[serde(default)]
    pub node: NodeConfig,
    /// On-chain addresses of the contracts under migration
    pub contracts: ContractsConfig,
    /// Accounts impersonated during the run
    pub accounts: AccountsConfig,
    /// Replacement strategy deployment artifact
    pub strategy: StrategyConfig,
    /// Verification thresholds
    #[serde(default)]
    pub checks: ChecksConfig,
    /// Transaction overrides
    #[serde(default)]
    pub gas: GasConfig,
}

impl MigrationConfig {
    /// Load from a JSON file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if let Ok(url) = std::env::var(ENV_NODE_URL) {
            config.node.url = url;
        }
        if let Ok(bytecode) = std::env::var(ENV_BYTECODE) {
            config.strategy.bytecode_path = Some(PathBuf::from(bytecode));
            config.strategy.bytecode_hex = None;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, address) in [
            ("contracts.vault", self.contracts.vault),
            ("contracts.guest_list", self.contracts.guest_list),
            ("contracts.timelock", self.contracts.timelock),
            ("contracts.old_strategy", self.contracts.old_strategy),
            ("contracts.yield_token", self.contracts.yield_token),
            ("contracts.underlying_token", self.contracts.underlying_token),
            ("accounts.deployer", self.accounts.deployer),
            ("accounts.depositor", self.accounts.depositor),
        ] {
            if address.is_zero() {
                return Err(ConfigError::ZeroAddress { field });
            }
        }

        if self.strategy.bytecode_path.is_none()
            && self
                .strategy
                .bytecode_hex
                .as_deref()
                .unwrap_or("")
                .is_empty()
        {
            return Err(ConfigError::EmptyBytecode);
        }

        if self.node.receipt_poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.node.receipt_timeout < self.node.receipt_poll_interval {
            return Err(ConfigError::TimeoutTooShort);
        }

        Ok(())
    }
}

/// Dev node connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint
    pub url: String,
    /// Receipt polling interval
    #[serde(with = "humantime_serde")]
    pub receipt_poll_interval: Duration,
    /// Give up waiting for a receipt after this long
    #[serde(with = "humantime_serde")]
    pub receipt_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            receipt_poll_interval: Duration::from_millis(100),
            receipt_timeout: Duration::from_secs(30),
        }
    }
}

/// Contract addresses
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub vault: Address,
    pub guest_list: Address,
    pub timelock: Address,
    /// Strategy currently attached to the vault
    pub old_strategy: Address,
    /// Yield-bearing token the new strategy invests in
    pub yield_token: Address,
    /// Underlying token the depositor withdraws
    pub underlying_token: Address,
}

/// Impersonated accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Protocol deployer: deploys the strategy, edits the guest list,
    /// drives the timelock
    pub deployer: Address,
    /// Token holder used for the withdraw probe
    pub depositor: Address,
}

/// Replacement strategy artifact
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrategyConfig {
    /// File containing the creation bytecode as hex
    pub bytecode_path: Option<PathBuf>,
    /// Inline creation bytecode, hex-encoded (takes effect when no path set)
    pub bytecode_hex: Option<String>,
}

impl StrategyConfig {
    /// Resolve the creation bytecode from file or inline hex.
    pub fn creation_code(&self) -> Result<Vec<u8>, ConfigError> {
        let hex_str = match &self.bytecode_path {
            Some(path) => std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?,
            None => self
                .bytecode_hex
                .clone()
                .ok_or(ConfigError::EmptyBytecode)?,
        };
        let trimmed = hex_str.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBytecode);
        }
        hex::decode(trimmed).map_err(|e| ConfigError::InvalidBytecode(e.to_string()))
    }
}

/// Verification thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Residual/delta tolerance for migrated value
    pub tolerance: U256,
    /// Amount used to probe guest-list authorization
    pub authorization_probe: U256,
    /// Raw token units withdrawn in the final probe
    pub withdraw_amount: U256,
    /// Seconds added past the timelock delay when computing eta
    pub eta_slack_secs: u64,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            tolerance: U256::ether(1),
            authorization_probe: U256::ether(250_000),
            withdraw_amount: U256::from(2u64),
            eta_slack_secs: 60,
        }
    }
}

/// Transaction overrides
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Gas price for every sent transaction; zero keeps impersonated
    /// senders solvent on forks
    pub gas_price: Option<U256>,
    /// Explicit gas limit, if the node's estimation is not wanted
    pub gas_limit: Option<U256>,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_price: Some(U256::ZERO),
            gas_limit: None,
        }
    }
}
