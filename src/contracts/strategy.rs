//! Strategy binding: deployment and accounted-value reads.

use crate::abi::{self, Token};
use crate::contracts::TxOptions;
use crate::domain::error::Error;
use crate::domain::types::{Address, CallRequest, U256};
use crate::rpc::EthRpc;
use std::sync::Arc;
use tracing::{debug, info};

/// Yield strategy binding.
pub struct Strategy {
    eth: Arc<EthRpc>,
    address: Address,
}

impl Strategy {
    pub fn new(eth: Arc<EthRpc>, address: Address) -> Self {
        Self { eth, address }
    }

    /// Deploy a new strategy bound to `(vault, yield_token)`.
    ///
    /// The constructor arguments are ABI-encoded and appended to the creation
    /// bytecode; the deployed address comes from the receipt, falling back to
    /// CREATE derivation from the sender nonce when the node omits it.
    pub async fn deploy(
        eth: Arc<EthRpc>,
        deployer: Address,
        creation_code: &[u8],
        vault: Address,
        yield_token: Address,
        opts: TxOptions,
    ) -> Result<Self, Error> {
        let mut init_code = creation_code.to_vec();
        init_code.extend_from_slice(&abi::encode(&[
            Token::Address(vault),
            Token::Address(yield_token),
        ]));

        let nonce = eth.get_transaction_count(deployer).await?;
        let mut call = CallRequest::create(deployer, init_code);
        opts.apply(&mut call);

        let receipt = eth.send_and_confirm(&call).await?;
        let address = match receipt.contract_address {
            Some(address) => address,
            None => {
                let derived = abi::compute_contract_address(deployer, nonce.as_u64());
                debug!(address = ?derived, "receipt omitted contractAddress, derived via CREATE");
                derived
            }
        };

        info!(address = ?address, tx = ?receipt.transaction_hash, "strategy deployed");
        Ok(Self { eth, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `calcTotalValue() -> uint256` - the strategy's accounted value in
    /// underlying-token units.
    pub async fn calc_total_value(&self) -> Result<U256, Error> {
        let data = abi::encode_call("calcTotalValue()", &[]);
        let out = self.eth.call(&CallRequest::read(self.address, data)).await?;
        abi::decode_uint(out.as_slice())
    }
}
