//! The four-phase strategy-migration scenario.
//!
//! 1. Deploy the replacement strategy as the protocol deployer.
//! 2. Whitelist it on the guest list and verify authorization.
//! 3. Swap the vault's strategy through the governance timelock, warping the
//!    chain clock past the eta, and verify the accounted value moved.
//! 4. Withdraw a token probe as a depositor and verify the exact balance
//!    delta.
//!
//! Every verification becomes a [`Check`] in the [`MigrationReport`]; the
//! runner fails fast on the first failed check with [`Error::Check`].

pub mod report;

pub use report::{Check, MigrationReport, Phase, PhaseReport};

use crate::contracts::{Erc20, GuestList, Strategy, Timelock, TxOptions, Vault};
use crate::contracts::timelock::QueuedCall;
use crate::domain::config::MigrationConfig;
use crate::domain::error::{ConfigError, Error};
use crate::domain::types::{Address, U256};
use crate::ports::{TimeSource, Transport};
use crate::rpc::{DevRpc, EthRpc, HttpTransport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the migration against a dev node.
pub struct MigrationRunner {
    config: MigrationConfig,
    eth: Arc<EthRpc>,
    dev: DevRpc,
    clock: Box<dyn TimeSource>,
}

impl MigrationRunner {
    /// Connect over HTTP using the configured node URL.
    pub fn connect(config: MigrationConfig) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.node.url.clone()));
        Self::with_transport(config, transport, Box::new(crate::ports::SystemTimeSource))
    }

    /// Build on an explicit transport and clock. Tests use this seam.
    pub fn with_transport(
        config: MigrationConfig,
        transport: Arc<dyn Transport>,
        clock: Box<dyn TimeSource>,
    ) -> Self {
        let eth = Arc::new(
            EthRpc::new(Arc::clone(&transport)).with_receipt_polling(
                config.node.receipt_poll_interval,
                config.node.receipt_timeout,
            ),
        );
        let dev = DevRpc::new(transport);
        Self {
            config,
            eth,
            dev,
            clock,
        }
    }

    fn tx_options(&self) -> TxOptions {
        TxOptions {
            gas_price: self.config.gas.gas_price,
            gas: self.config.gas.gas_limit,
        }
    }

    /// Impersonate `address` on the dev node. Forked-mainnet senders hold no
    /// ETH, so they get funded unless the gas price is pinned to zero or the
    /// account already carries at least one ether.
    async fn prepare_sender(&self, address: Address) -> Result<(), Error> {
        self.dev.impersonate(address).await?;
        if self.config.gas.gas_price != Some(U256::ZERO)
            && self.eth.get_balance(address).await? < U256::ether(1)
        {
            self.dev.set_balance(address, U256::ether(100)).await?;
        }
        Ok(())
    }

    /// Every configured contract address must hold code. Catches stale or
    /// wrong-network configs before any state is touched.
    async fn verify_contracts(&self) -> Result<(), Error> {
        let c = &self.config.contracts;
        for (field, address) in [
            ("contracts.vault", c.vault),
            ("contracts.guest_list", c.guest_list),
            ("contracts.timelock", c.timelock),
            ("contracts.old_strategy", c.old_strategy),
            ("contracts.yield_token", c.yield_token),
            ("contracts.underlying_token", c.underlying_token),
        ] {
            if self.eth.get_code(address).await?.is_empty() {
                return Err(ConfigError::NoContractCode {
                    field,
                    address: format!("{address:?}"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Execute all four phases in order.
    pub async fn run(&self) -> Result<MigrationReport, Error> {
        let mut report = MigrationReport::default();

        self.verify_contracts().await?;
        let new_strategy = self.deploy_phase(&mut report).await?;
        self.whitelist_phase(&mut report, &new_strategy).await?;
        self.timelock_phase(&mut report, &new_strategy).await?;
        self.withdraw_phase(&mut report).await?;

        self.dev
            .stop_impersonating(self.config.accounts.deployer)
            .await?;
        self.dev
            .stop_impersonating(self.config.accounts.depositor)
            .await?;

        info!(
            checks = report.checks().count(),
            "migration complete, all checks passed"
        );
        Ok(report)
    }

    /// Phase 1: deploy the replacement strategy bound to the vault and the
    /// yield token.
    async fn deploy_phase(&self, report: &mut MigrationReport) -> Result<Strategy, Error> {
        info!(phase = Phase::Deploy.as_str(), "deploying replacement strategy");
        let started = Instant::now();

        let creation_code = self.config.strategy.creation_code()?;
        let deployer = self.config.accounts.deployer;

        self.prepare_sender(deployer).await?;
        let strategy = Strategy::deploy(
            Arc::clone(&self.eth),
            deployer,
            &creation_code,
            self.config.contracts.vault,
            self.config.contracts.yield_token,
            self.tx_options(),
        )
        .await?;

        report.new_strategy = Some(strategy.address());
        report.phases.push(PhaseReport {
            phase: Phase::Deploy,
            elapsed: started.elapsed(),
            tx_hashes: vec![],
            checks: vec![],
        });
        Ok(strategy)
    }

    /// Phase 2: whitelist the strategy and verify authorization.
    async fn whitelist_phase(
        &self,
        report: &mut MigrationReport,
        strategy: &Strategy,
    ) -> Result<(), Error> {
        info!(phase = Phase::Whitelist.as_str(), "whitelisting strategy");
        let started = Instant::now();

        let guest_list = GuestList::new(
            Arc::clone(&self.eth),
            self.config.contracts.guest_list,
            self.tx_options(),
        );
        let tx = guest_list
            .invite_guest(self.config.accounts.deployer, strategy.address())
            .await?;

        let probe = self.config.checks.authorization_probe;
        let authorized = guest_list.authorized(strategy.address(), probe).await?;
        let check = if authorized {
            Check::passed("guest_list_authorized", true, authorized)
        } else {
            Check::failed("guest_list_authorized", true, authorized)
        };

        report.phases.push(PhaseReport {
            phase: Phase::Whitelist,
            elapsed: started.elapsed(),
            tx_hashes: vec![tx],
            checks: vec![check],
        });
        self.fail_on_unchecked(report)
    }

    /// Phase 3: swap the vault's strategy through the timelock and verify
    /// value migrated within tolerance.
    async fn timelock_phase(
        &self,
        report: &mut MigrationReport,
        new_strategy: &Strategy,
    ) -> Result<(), Error> {
        info!(phase = Phase::TimelockSwap.as_str(), "queueing strategy swap");
        let started = Instant::now();
        let deployer = self.config.accounts.deployer;

        let old_strategy = Strategy::new(Arc::clone(&self.eth), self.config.contracts.old_strategy);
        let total_before = old_strategy.calc_total_value().await?;
        report.total_value_before = Some(total_before);

        let timelock = Timelock::new(
            Arc::clone(&self.eth),
            self.config.contracts.timelock,
            self.tx_options(),
        );

        // eta = delay + now + slack, exactly as governance operators compute it
        let delay = timelock.delay().await?;
        let eta = delay
            .as_u64()
            .saturating_add(self.clock.now())
            .saturating_add(self.config.checks.eta_slack_secs);
        report.eta = Some(eta);

        let call = QueuedCall {
            target: self.config.contracts.vault,
            value: U256::ZERO,
            signature: "setStrat(address,bool)".to_string(),
            data: crate::abi::encode(&[
                crate::abi::Token::Address(new_strategy.address()),
                crate::abi::Token::Bool(true),
            ]),
            eta,
        };

        let queue_tx = timelock.queue_transaction(deployer, &call).await?;
        info!(eta, "queued, warping chain clock past eta");
        self.dev.set_next_block_timestamp(eta + 1).await?;
        let execute_tx = timelock.execute_transaction(deployer, &call).await?;

        let tolerance = self.config.checks.tolerance;
        let old_value_after = old_strategy.calc_total_value().await?;
        let new_value_after = new_strategy.calc_total_value().await?;
        let delta = total_before.saturating_sub(new_value_after);

        let checks = vec![
            bound_check("old_strategy_drained", old_value_after, tolerance),
            bound_check("migrated_value_delta", delta, tolerance),
        ];

        report.phases.push(PhaseReport {
            phase: Phase::TimelockSwap,
            elapsed: started.elapsed(),
            tx_hashes: vec![queue_tx, execute_tx],
            checks,
        });
        self.fail_on_unchecked(report)
    }

    /// Phase 4: withdraw a probe amount as the depositor and verify the
    /// exact balance delta.
    async fn withdraw_phase(&self, report: &mut MigrationReport) -> Result<(), Error> {
        info!(phase = Phase::WithdrawProbe.as_str(), "probing withdraw path");
        let started = Instant::now();
        let depositor = self.config.accounts.depositor;
        let amount = self.config.checks.withdraw_amount;

        self.prepare_sender(depositor).await?;

        let token = Erc20::new(Arc::clone(&self.eth), self.config.contracts.underlying_token);
        let vault = Vault::new(
            Arc::clone(&self.eth),
            self.config.contracts.vault,
            self.tx_options(),
        );

        let balance_before = token.balance_of(depositor).await?;
        let tx = vault.withdraw(depositor, amount).await?;
        let balance_after = token.balance_of(depositor).await?;

        let delta = balance_after.saturating_sub(balance_before);
        let check = if delta == amount {
            Check::passed("withdraw_balance_delta", amount, delta)
        } else {
            Check::failed("withdraw_balance_delta", amount, delta)
        };

        report.phases.push(PhaseReport {
            phase: Phase::WithdrawProbe,
            elapsed: started.elapsed(),
            tx_hashes: vec![tx],
            checks: vec![check],
        });
        self.fail_on_unchecked(report)
    }

    /// Fail fast on the first failed check of the most recent phase.
    fn fail_on_unchecked(&self, report: &MigrationReport) -> Result<(), Error> {
        if let Some(failed) = report
            .phases
            .last()
            .and_then(|p| p.checks.iter().find(|c| !c.passed))
        {
            warn!(check = %failed.name, "verification failed");
            return Err(Error::Check(failed.clone().into_failure()));
        }
        Ok(())
    }
}

/// Strict upper-bound check: `value < bound`.
fn bound_check(name: &str, value: U256, bound: U256) -> Check {
    if value < bound {
        Check::passed(name, format!("< {bound}"), value)
    } else {
        Check::failed(name, format!("< {bound}"), value)
    }
}
