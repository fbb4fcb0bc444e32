//! Vault binding: the user-facing withdraw surface.

use crate::abi::{self, Token};
use crate::contracts::TxOptions;
use crate::domain::error::Error;
use crate::domain::types::{Address, CallRequest, Hash, U256};
use crate::rpc::EthRpc;
use std::sync::Arc;

/// Yield vault binding.
pub struct Vault {
    eth: Arc<EthRpc>,
    address: Address,
    opts: TxOptions,
}

impl Vault {
    pub fn new(eth: Arc<EthRpc>, address: Address, opts: TxOptions) -> Self {
        Self { eth, address, opts }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `withdraw(uint256)` - redeem `amount` underlying-token units to `from`.
    pub async fn withdraw(&self, from: Address, amount: U256) -> Result<Hash, Error> {
        let data = abi::encode_call("withdraw(uint256)", &[Token::Uint(amount)]);
        let mut call = CallRequest::write(from, self.address, data);
        self.opts.apply(&mut call);
        let receipt = self.eth.send_and_confirm(&call).await?;
        Ok(receipt.transaction_hash)
    }
}
