//! Dev-chain control methods (anvil_* / hardhat_* / evm_*).
//!
//! Anvil and Hardhat expose the same simulation controls under different
//! prefixes. The first successful impersonation call pins the prefix so the
//! METHOD_NOT_FOUND probe runs at most once per transport.

use crate::domain::error::Error;
use crate::domain::types::{Address, U256};
use crate::ports::Transport;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Node families with distinct dev-method prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFamily {
    Anvil,
    Hardhat,
}

impl NodeFamily {
    fn prefix(self) -> &'static str {
        match self {
            NodeFamily::Anvil => "anvil",
            NodeFamily::Hardhat => "hardhat",
        }
    }
}

/// Dev-chain control client
pub struct DevRpc {
    transport: Arc<dyn Transport>,
    family: Mutex<Option<NodeFamily>>,
}

impl DevRpc {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            family: Mutex::new(None),
        }
    }

    /// Detected node family, once a prefixed method has succeeded.
    pub fn family(&self) -> Option<NodeFamily> {
        *self.family.lock()
    }

    /// Call `<prefix>_<suffix>`, probing Anvil first and falling back to
    /// Hardhat on METHOD_NOT_FOUND.
    async fn prefixed(&self, suffix: &str, params: Value) -> Result<Value, Error> {
        if let Some(family) = self.family() {
            let method = format!("{}_{}", family.prefix(), suffix);
            return self.transport.request(&method, params).await;
        }

        let anvil_method = format!("anvil_{suffix}");
        match self.transport.request(&anvil_method, params.clone()).await {
            Ok(result) => {
                *self.family.lock() = Some(NodeFamily::Anvil);
                Ok(result)
            }
            Err(Error::Rpc(e)) if e.is_method_not_found() => {
                debug!(suffix, "anvil namespace unavailable, trying hardhat");
                let hardhat_method = format!("hardhat_{suffix}");
                let result = self.transport.request(&hardhat_method, params).await?;
                *self.family.lock() = Some(NodeFamily::Hardhat);
                Ok(result)
            }
            Err(e) => Err(e),
        }
    }

    /// Allow sending transactions from `address` without its key.
    #[instrument(skip(self))]
    pub async fn impersonate(&self, address: Address) -> Result<(), Error> {
        self.prefixed("impersonateAccount", json!([address])).await?;
        Ok(())
    }

    /// Stop impersonating `address`.
    #[instrument(skip(self))]
    pub async fn stop_impersonating(&self, address: Address) -> Result<(), Error> {
        self.prefixed("stopImpersonatingAccount", json!([address]))
            .await?;
        Ok(())
    }

    /// Overwrite the ETH balance of `address`. Used to fund impersonated
    /// senders when the gas price override is nonzero.
    #[instrument(skip(self))]
    pub async fn set_balance(&self, address: Address, balance: U256) -> Result<(), Error> {
        self.prefixed("setBalance", json!([address, balance])).await?;
        Ok(())
    }

    /// evm_setNextBlockTimestamp - the next mined block carries exactly this
    /// timestamp.
    #[instrument(skip(self))]
    pub async fn set_next_block_timestamp(&self, timestamp: u64) -> Result<(), Error> {
        self.transport
            .request("evm_setNextBlockTimestamp", json!([timestamp]))
            .await?;
        Ok(())
    }
}
