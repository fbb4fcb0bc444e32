//! Compound-style governance timelock binding.
//!
//! The timelock identifies a queued transaction by the tuple
//! `(target, value, signature, data, eta)`; queue and execute must therefore
//! be called with identical arguments.

use crate::abi::{self, Token};
use crate::contracts::TxOptions;
use crate::domain::error::Error;
use crate::domain::types::{Address, CallRequest, Hash, U256};
use crate::rpc::EthRpc;
use std::sync::Arc;

/// Governance timelock binding.
pub struct Timelock {
    eth: Arc<EthRpc>,
    address: Address,
    opts: TxOptions,
}

/// The identifying tuple of a timelocked transaction.
#[derive(Debug, Clone)]
pub struct QueuedCall {
    pub target: Address,
    pub value: U256,
    /// Solidity signature string, e.g. `setStrat(address,bool)`.
    pub signature: String,
    /// ABI-encoded arguments, without selector.
    pub data: Vec<u8>,
    pub eta: u64,
}

impl QueuedCall {
    fn tokens(&self) -> [Token; 5] {
        [
            Token::Address(self.target),
            Token::Uint(self.value),
            Token::String(self.signature.clone()),
            Token::Bytes(self.data.clone()),
            Token::Uint(U256::from(self.eta)),
        ]
    }
}

impl Timelock {
    pub fn new(eth: Arc<EthRpc>, address: Address, opts: TxOptions) -> Self {
        Self { eth, address, opts }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `delay() -> uint256` - minimum seconds between queue and execute.
    pub async fn delay(&self) -> Result<U256, Error> {
        let data = abi::encode_call("delay()", &[]);
        let out = self.eth.call(&CallRequest::read(self.address, data)).await?;
        abi::decode_uint(out.as_slice())
    }

    /// `queueTransaction(address,uint256,string,bytes,uint256)`
    pub async fn queue_transaction(&self, from: Address, call: &QueuedCall) -> Result<Hash, Error> {
        self.send(
            from,
            "queueTransaction(address,uint256,string,bytes,uint256)",
            call,
        )
        .await
    }

    /// `executeTransaction(address,uint256,string,bytes,uint256)`
    ///
    /// Reverts until the chain timestamp passes `eta`.
    pub async fn execute_transaction(
        &self,
        from: Address,
        call: &QueuedCall,
    ) -> Result<Hash, Error> {
        self.send(
            from,
            "executeTransaction(address,uint256,string,bytes,uint256)",
            call,
        )
        .await
    }

    async fn send(&self, from: Address, signature: &str, call: &QueuedCall) -> Result<Hash, Error> {
        let data = abi::encode_call(signature, &call.tokens());
        let mut request = CallRequest::write(from, self.address, data);
        self.opts.apply(&mut request);
        let receipt = self.eth.send_and_confirm(&request).await?;
        Ok(receipt.transaction_hash)
    }
}
