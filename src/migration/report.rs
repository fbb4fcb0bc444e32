//! Structured record of a migration run.

use crate::domain::error::CheckFailure;
use crate::domain::types::{Address, Hash, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One verified assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

impl Check {
    pub fn passed(name: &str, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            passed: true,
        }
    }

    pub fn failed(name: &str, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            passed: false,
        }
    }

    pub fn into_failure(self) -> CheckFailure {
        CheckFailure {
            name: self.name,
            expected: self.expected,
            actual: self.actual,
        }
    }
}

/// The four migration phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Deploy,
    Whitelist,
    TimelockSwap,
    WithdrawProbe,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Deploy => "deploy",
            Phase::Whitelist => "whitelist",
            Phase::TimelockSwap => "timelock_swap",
            Phase::WithdrawProbe => "withdraw_probe",
        }
    }
}

/// Outcome of one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tx_hashes: Vec<Hash>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub checks: Vec<Check>,
}

/// Full migration run record, serializable for operators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Address of the freshly deployed strategy
    pub new_strategy: Option<Address>,
    /// Value held by the outgoing strategy before the swap
    pub total_value_before: Option<U256>,
    /// Execution timestamp the timelock call was queued for
    pub eta: Option<u64>,
    pub phases: Vec<PhaseReport>,
}

impl MigrationReport {
    pub fn all_checks_passed(&self) -> bool {
        self.phases
            .iter()
            .flat_map(|p| p.checks.iter())
            .all(|c| c.passed)
    }

    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.phases.iter().flat_map(|p| p.checks.iter())
    }
}
