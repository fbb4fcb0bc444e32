//! Guest-list binding: the allow-list gating vault interaction.

use crate::abi::{self, Token};
use crate::contracts::TxOptions;
use crate::domain::error::Error;
use crate::domain::types::{Address, CallRequest, Hash, U256};
use crate::rpc::EthRpc;
use std::sync::Arc;

/// Guest-list allow-list binding.
pub struct GuestList {
    eth: Arc<EthRpc>,
    address: Address,
    opts: TxOptions,
}

impl GuestList {
    pub fn new(eth: Arc<EthRpc>, address: Address, opts: TxOptions) -> Self {
        Self { eth, address, opts }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `invite_guest(address)` - whitelist `guest`, sent from `from`.
    pub async fn invite_guest(&self, from: Address, guest: Address) -> Result<Hash, Error> {
        let data = abi::encode_call("invite_guest(address)", &[Token::Address(guest)]);
        let mut call = CallRequest::write(from, self.address, data);
        self.opts.apply(&mut call);
        let receipt = self.eth.send_and_confirm(&call).await?;
        Ok(receipt.transaction_hash)
    }

    /// `authorized(address,uint256) -> bool` - may `guest` move `amount`?
    pub async fn authorized(&self, guest: Address, amount: U256) -> Result<bool, Error> {
        let data = abi::encode_call(
            "authorized(address,uint256)",
            &[Token::Address(guest), Token::Uint(amount)],
        );
        let out = self.eth.call(&CallRequest::read(self.address, data)).await?;
        abi::decode_bool(out.as_slice())
    }
}
