//! strat-migrate - vault strategy-migration driver for Anvil/Hardhat dev
//! chains.
//!
//! Performs and verifies a yield-vault strategy migration against a forked
//! dev node: deploy the replacement strategy, whitelist it on the guest list,
//! swap it in through the governance timelock (warping the chain clock past
//! the eta), and probe the withdraw path. Each phase's assertions land in a
//! serializable [`MigrationReport`].
//!
//! # Architecture
//!
//! ```text
//! MigrationRunner ──► contracts::{Strategy, GuestList, Timelock, Vault, Erc20}
//!                          │
//!                          ▼
//!                     rpc::EthRpc ── eth_call / eth_sendTransaction / receipts
//!                     rpc::DevRpc ── impersonation, timestamp warp
//!                          │
//!                          ▼
//!                  ports::Transport ── HttpTransport (JSON-RPC over HTTP)
//! ```
//!
//! The contracts themselves (vault, strategies, guest list, timelock, token)
//! are opaque on-chain callees; this crate only encodes calls to them and
//! checks what the chain reports back.
//!
//! # Usage
//!
//! ```ignore
//! use strat_migrate::{MigrationConfig, MigrationRunner};
//!
//! let config = MigrationConfig::load(Path::new("migration.json"))?;
//! let report = MigrationRunner::connect(config).run().await?;
//! assert!(report.all_checks_passed());
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod abi;
pub mod contracts;
pub mod domain;
pub mod migration;
pub mod ports;
pub mod rpc;

// Re-exports for public API
pub use domain::config::MigrationConfig;
pub use domain::error::{CheckFailure, ConfigError, Error, RpcError};
pub use domain::types::{Address, Bytes, CallRequest, Hash, TransactionReceipt, U256};
pub use migration::{Check, MigrationReport, MigrationRunner, Phase};
pub use ports::{SystemTimeSource, TimeSource, Transport};
pub use rpc::{DevRpc, EthRpc, HttpTransport, NodeFamily};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
