//! ERC-20 read surface.

use crate::abi::{self, Token};
use crate::domain::error::Error;
use crate::domain::types::{Address, CallRequest, U256};
use crate::rpc::EthRpc;
use std::sync::Arc;

/// ERC-20 token binding (read-only surface).
pub struct Erc20 {
    eth: Arc<EthRpc>,
    address: Address,
}

impl Erc20 {
    pub fn new(eth: Arc<EthRpc>, address: Address) -> Self {
        Self { eth, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `balanceOf(address) -> uint256`
    pub async fn balance_of(&self, owner: Address) -> Result<U256, Error> {
        let data = abi::encode_call("balanceOf(address)", &[Token::Address(owner)]);
        let out = self.eth.call(&CallRequest::read(self.address, data)).await?;
        abi::decode_uint(out.as_slice())
    }
}
