//! Scripted JSON-RPC double for the migration flow.
//!
//! Simulates only what the four phases observably exercise: impersonation
//! bookkeeping, nonce/receipt plumbing, the guest-list flag, the timelock
//! queue/execute window, strategy value accounting, and the withdraw balance
//! delta. It is a test double for the transport seam, not a chain.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use strat_migrate::abi;
use strat_migrate::domain::error::{codes, Error, RpcError};
use strat_migrate::{
    Address, CallRequest, Hash, MigrationConfig, TimeSource, TransactionReceipt, Transport, U256,
};
use strat_migrate::domain::config::{
    AccountsConfig, ChecksConfig, ContractsConfig, GasConfig, NodeConfig, StrategyConfig,
};

/// Wall clock all tests pin to.
pub const FIXED_NOW: u64 = 1_700_000_000;
/// The mock timelock's delay in seconds (2 days, Compound default).
pub const TIMELOCK_DELAY: u64 = 172_800;

pub fn addr(byte: u8) -> Address {
    Address::from_slice(&[byte; 20])
}

pub fn test_config() -> MigrationConfig {
    MigrationConfig {
        node: NodeConfig::default(),
        contracts: ContractsConfig {
            vault: addr(0x10),
            guest_list: addr(0x20),
            timelock: addr(0x30),
            old_strategy: addr(0x40),
            yield_token: addr(0x50),
            underlying_token: addr(0x60),
        },
        accounts: AccountsConfig {
            deployer: addr(0x70),
            depositor: addr(0x80),
        },
        strategy: StrategyConfig {
            bytecode_path: None,
            // placeholder creation bytecode; the mock only checks the
            // constructor args appended to it
            bytecode_hex: Some("0x60806040".to_string()),
        },
        checks: ChecksConfig::default(),
        gas: GasConfig::default(),
    }
}

/// Fixed clock for deterministic eta computation.
pub struct FixedClock(pub u64);

impl TimeSource for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Behavior switches for failure-path tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    /// Drop evm_setNextBlockTimestamp on the floor so execution happens
    /// before the eta.
    pub ignore_timestamp_warp: bool,
    /// Guest list accepts the invite transaction but never authorizes.
    pub guest_list_never_authorizes: bool,
    /// Vault pays out one unit less than requested.
    pub withdraw_shortchanges: bool,
}

struct QueuedTx {
    eta: u64,
    executed: bool,
}

struct ChainState {
    now: u64,
    next_block_timestamp: Option<u64>,
    impersonated: HashSet<Address>,
    eth_balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<Hash, TransactionReceipt>,
    tx_counter: u64,
    guests: HashSet<Address>,
    /// Keyed by the encoded (target, value, signature, data, eta) tuple.
    queued: HashMap<Vec<u8>, QueuedTx>,
    old_strategy_value: U256,
    new_strategy_value: U256,
    depositor_balance: U256,
    deployed_strategy: Option<Address>,
    deployed_constructor_args: Option<Vec<u8>>,
}

/// In-memory scripted chain behind the [`Transport`] seam.
///
/// Exposes only the hardhat_* dev prefix so the anvil-first fallback is
/// exercised on every run.
pub struct MockChain {
    config: MigrationConfig,
    faults: Faults,
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new(config: MigrationConfig, faults: Faults) -> Self {
        Self {
            config,
            faults,
            state: Mutex::new(ChainState {
                now: FIXED_NOW,
                next_block_timestamp: None,
                impersonated: HashSet::new(),
                eth_balances: HashMap::new(),
                nonces: HashMap::new(),
                receipts: HashMap::new(),
                tx_counter: 0,
                guests: HashSet::new(),
                queued: HashMap::new(),
                old_strategy_value: U256::ether(500_000),
                // dust below the 1-ether tolerance stays behind on migration
                new_strategy_value: U256::ZERO,
                depositor_balance: U256::from(1_000u64),
                deployed_strategy: None,
                deployed_constructor_args: None,
            }),
        }
    }

    pub fn deployed_strategy(&self) -> Option<Address> {
        self.state.lock().deployed_strategy
    }

    pub fn deployed_constructor_args(&self) -> Option<Vec<u8>> {
        self.state.lock().deployed_constructor_args.clone()
    }

    pub fn invited(&self, guest: Address) -> bool {
        self.state.lock().guests.contains(&guest)
    }

    pub fn eth_balance(&self, account: Address) -> Option<U256> {
        self.state.lock().eth_balances.get(&account).copied()
    }

    pub fn fund(&self, account: Address, balance: U256) {
        self.state.lock().eth_balances.insert(account, balance);
    }

    pub fn still_impersonating(&self, account: Address) -> bool {
        self.state.lock().impersonated.contains(&account)
    }

    fn revert(reason: &str) -> Error {
        Error::from(RpcError::execution_reverted(
            reason,
            Some(abi::encode_error_string(reason)),
        ))
    }

    fn mine(state: &mut ChainState, contract_address: Option<Address>) -> (Hash, u64) {
        let block_timestamp = state.next_block_timestamp.take().unwrap_or(state.now + 1);
        state.now = block_timestamp;
        state.tx_counter += 1;
        let tx_hash = Hash::from_low_u64_be(state.tx_counter);
        state.receipts.insert(
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: Some(U256::from(state.tx_counter)),
                contract_address,
                status: Some(U256::ONE),
                gas_used: Some(U256::from(21_000u64)),
            },
        );
        (tx_hash, block_timestamp)
    }

    fn handle_call(&self, call: &CallRequest) -> Result<Value, Error> {
        let state = self.state.lock();
        let to = call.to.expect("eth_call without target");
        let data = call.data.as_ref().map(|d| d.as_slice()).unwrap_or(&[]);
        let sel: [u8; 4] = data.get(..4).unwrap_or(&[0; 4]).try_into().unwrap();
        let args = &data[4.min(data.len())..];

        let word = |value: U256| Ok(json!(format!("0x{}", hex::encode(value.to_be_bytes()))));
        let bool_word = |flag: bool| {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(flag);
            Ok(json!(format!("0x{}", hex::encode(buf))))
        };

        if to == self.config.contracts.old_strategy && sel == abi::selector("calcTotalValue()") {
            return word(state.old_strategy_value);
        }
        if Some(to) == state.deployed_strategy && sel == abi::selector("calcTotalValue()") {
            return word(state.new_strategy_value);
        }
        if to == self.config.contracts.timelock && sel == abi::selector("delay()") {
            return word(U256::from(TIMELOCK_DELAY));
        }
        if to == self.config.contracts.guest_list
            && sel == abi::selector("authorized(address,uint256)")
        {
            let guest = abi::decode_address(args)?;
            let flag = !self.faults.guest_list_never_authorizes && state.guests.contains(&guest);
            return bool_word(flag);
        }
        if to == self.config.contracts.underlying_token && sel == abi::selector("balanceOf(address)")
        {
            let owner = abi::decode_address(args)?;
            if owner == self.config.accounts.depositor {
                return word(state.depositor_balance);
            }
            return word(U256::ZERO);
        }

        Err(Self::revert("unexpected call"))
    }

    fn handle_send(&self, call: &CallRequest) -> Result<Value, Error> {
        let mut state = self.state.lock();
        let from = call.from.expect("eth_sendTransaction without sender");
        if !state.impersonated.contains(&from) {
            return Err(Error::Rpc(RpcError::new(
                codes::SERVER_ERROR,
                format!("unknown account {from:?}"),
            )));
        }

        let data = call.data.as_ref().map(|d| d.as_slice()).unwrap_or(&[]).to_vec();

        // Contract creation
        let Some(to) = call.to else {
            let nonce = *state.nonces.get(&from).unwrap_or(&0);
            state.nonces.insert(from, nonce + 1);
            let address = abi::compute_contract_address(from, nonce);
            if data.len() < 64 {
                return Err(Self::revert("missing constructor args"));
            }
            state.deployed_constructor_args = Some(data[data.len() - 64..].to_vec());
            state.deployed_strategy = Some(address);
            let (tx_hash, _) = Self::mine(&mut state, Some(address));
            return Ok(json!(tx_hash));
        };

        let sel: [u8; 4] = data.get(..4).unwrap_or(&[0; 4]).try_into().unwrap();
        let args = data[4.min(data.len())..].to_vec();

        if to == self.config.contracts.guest_list && sel == abi::selector("invite_guest(address)") {
            let guest = abi::decode_address(&args)?;
            state.guests.insert(guest);
            let (tx_hash, _) = Self::mine(&mut state, None);
            return Ok(json!(tx_hash));
        }

        if to == self.config.contracts.timelock {
            if sel == abi::selector("queueTransaction(address,uint256,string,bytes,uint256)") {
                let eta = abi::decode_uint(&args[128..])?.as_u64();
                if eta < state.now + TIMELOCK_DELAY {
                    return Err(Self::revert(
                        "Timelock::queueTransaction: Estimated execution block must satisfy delay.",
                    ));
                }
                state.queued.insert(
                    args,
                    QueuedTx {
                        eta,
                        executed: false,
                    },
                );
                let (tx_hash, _) = Self::mine(&mut state, None);
                return Ok(json!(tx_hash));
            }
            if sel == abi::selector("executeTransaction(address,uint256,string,bytes,uint256)") {
                let block_timestamp = state.next_block_timestamp.unwrap_or(state.now + 1);
                let Some(queued) = state.queued.get_mut(&args) else {
                    return Err(Self::revert(
                        "Timelock::executeTransaction: Transaction hasn't been queued.",
                    ));
                };
                if queued.executed {
                    return Err(Self::revert(
                        "Timelock::executeTransaction: Transaction hasn't been queued.",
                    ));
                }
                if block_timestamp < queued.eta {
                    return Err(Self::revert(
                        "Timelock::executeTransaction: Transaction hasn't surpassed time lock.",
                    ));
                }
                queued.executed = true;
                // the underlying setStrat migrates value, leaving dust behind
                let dust = U256::from(999u64);
                let moved = state.old_strategy_value.saturating_sub(dust);
                state.old_strategy_value = dust;
                state.new_strategy_value = moved;
                let (tx_hash, _) = Self::mine(&mut state, None);
                return Ok(json!(tx_hash));
            }
        }

        if to == self.config.contracts.vault && sel == abi::selector("withdraw(uint256)") {
            let amount = abi::decode_uint(&args)?;
            let paid = if self.faults.withdraw_shortchanges {
                amount.saturating_sub(U256::ONE)
            } else {
                amount
            };
            state.depositor_balance = state.depositor_balance + paid;
            state.new_strategy_value = state.new_strategy_value.saturating_sub(paid);
            let (tx_hash, _) = Self::mine(&mut state, None);
            return Ok(json!(tx_hash));
        }

        Err(Self::revert("unexpected transaction"))
    }
}

#[async_trait]
impl Transport for MockChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        match method {
            "hardhat_impersonateAccount" => {
                let address: Address = serde_json::from_value(params[0].clone())?;
                self.state.lock().impersonated.insert(address);
                Ok(json!(true))
            }
            "hardhat_stopImpersonatingAccount" => {
                let address: Address = serde_json::from_value(params[0].clone())?;
                self.state.lock().impersonated.remove(&address);
                Ok(json!(true))
            }
            "hardhat_setBalance" => {
                let address: Address = serde_json::from_value(params[0].clone())?;
                let balance: U256 = serde_json::from_value(params[1].clone())?;
                self.state.lock().eth_balances.insert(address, balance);
                Ok(json!(null))
            }
            "evm_setNextBlockTimestamp" => {
                let timestamp = params[0].as_u64().expect("timestamp param");
                if !self.faults.ignore_timestamp_warp {
                    self.state.lock().next_block_timestamp = Some(timestamp);
                }
                Ok(json!(null))
            }
            "eth_getBalance" => {
                let address: Address = serde_json::from_value(params[0].clone())?;
                let state = self.state.lock();
                Ok(json!(state
                    .eth_balances
                    .get(&address)
                    .copied()
                    .unwrap_or(U256::ZERO)))
            }
            "eth_getCode" => {
                let address: Address = serde_json::from_value(params[0].clone())?;
                let c = &self.config.contracts;
                let known = [
                    c.vault,
                    c.guest_list,
                    c.timelock,
                    c.old_strategy,
                    c.yield_token,
                    c.underlying_token,
                ]
                .contains(&address)
                    || self.state.lock().deployed_strategy == Some(address);
                Ok(json!(if known { "0x6080604052" } else { "0x" }))
            }
            "eth_getTransactionCount" => {
                let address: Address = serde_json::from_value(params[0].clone())?;
                let state = self.state.lock();
                Ok(json!(U256::from(*state.nonces.get(&address).unwrap_or(&0))))
            }
            "eth_call" => {
                let call: CallRequest = serde_json::from_value(params[0].clone())?;
                self.handle_call(&call)
            }
            "eth_sendTransaction" => {
                let call: CallRequest = serde_json::from_value(params[0].clone())?;
                self.handle_send(&call)
            }
            "eth_getTransactionReceipt" => {
                let tx_hash: Hash = serde_json::from_value(params[0].clone())?;
                let state = self.state.lock();
                match state.receipts.get(&tx_hash) {
                    Some(receipt) => Ok(serde_json::to_value(receipt)?),
                    None => Ok(json!(null)),
                }
            }
            // Everything else, including the whole anvil_* namespace, is
            // unknown to this hardhat-flavored node.
            other => Err(Error::Rpc(RpcError::method_not_found(other))),
        }
    }
}
