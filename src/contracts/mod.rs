//! Thin typed bindings over the five contracts the migration touches.
//!
//! Each binding holds the RPC client, a contract address, and the transaction
//! overrides; methods ABI-encode the call, dispatch, and decode the return.

use crate::domain::types::{CallRequest, U256};

pub mod erc20;
pub mod guest_list;
pub mod strategy;
pub mod timelock;
pub mod vault;

pub use erc20::Erc20;
pub use guest_list::GuestList;
pub use strategy::Strategy;
pub use timelock::Timelock;
pub use vault::Vault;

/// Transaction overrides applied to every state-changing call.
///
/// A zero gas price is the forked-mainnet default: impersonated senders
/// usually hold no ETH.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxOptions {
    pub gas_price: Option<U256>,
    pub gas: Option<U256>,
}

impl TxOptions {
    pub fn apply(&self, call: &mut CallRequest) {
        call.gas_price = self.gas_price;
        call.gas = self.gas;
    }
}
