//! Registrar configuration with validation.

use serde::{Deserialize, Serialize};

use crate::domain::basket::DEFAULT_PRICE_BUFFER_PERCENT;
use crate::domain::commitment::{
    CommitmentWindow, DEFAULT_MAX_COMMITMENT_AGE, DEFAULT_MIN_COMMITMENT_AGE,
};
use crate::domain::value_objects::{Address, U256};

/// Main registrar configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Rent estimation
    pub pricing: PricingConfig,
    /// Commitment age window
    pub commitments: CommitmentConfig,
    /// Balance comparison precision
    pub balance: BalanceConfig,
    /// Contract addresses
    pub contracts: ContractsConfig,
}

impl RegistrarConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pricing.buffer_percent > 100 {
            return Err(ConfigError::InvalidPricing(format!(
                "buffer_percent {} exceeds 100",
                self.pricing.buffer_percent
            )));
        }

        if self.commitments.min_age_secs < 0 {
            return Err(ConfigError::InvalidCommitmentWindow(
                "min_age_secs cannot be negative".into(),
            ));
        }

        if self.commitments.max_age_secs <= self.commitments.min_age_secs {
            return Err(ConfigError::InvalidCommitmentWindow(
                "max_age_secs must exceed min_age_secs".into(),
            ));
        }

        if self.balance.purchase_divisor().is_none() {
            return Err(ConfigError::InvalidPrecision(format!(
                "purchase_precision_decimals {} exceeds 77",
                self.balance.purchase_precision_decimals
            )));
        }
        if self.balance.registration_divisor().is_none() {
            return Err(ConfigError::InvalidPrecision(format!(
                "registration_precision_decimals {} exceeds 77",
                self.balance.registration_precision_decimals
            )));
        }

        self.contracts.controller_address()?;
        Ok(())
    }

    /// Commitment age window
    #[must_use]
    pub fn commitment_window(&self) -> CommitmentWindow {
        CommitmentWindow {
            min_age: self.commitments.min_age_secs,
            max_age: self.commitments.max_age_secs,
        }
    }
}

/// Rent estimation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Safety margin added to each rent price, in percent (default: 15)
    pub buffer_percent: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            buffer_percent: DEFAULT_PRICE_BUFFER_PERCENT,
        }
    }
}

/// Commitment age configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentConfig {
    /// Minimum age before reveal (default: 60s)
    pub min_age_secs: i64,
    /// Maximum age before the commitment goes stale (default: 24h)
    pub max_age_secs: i64,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            min_age_secs: DEFAULT_MIN_COMMITMENT_AGE,
            max_age_secs: DEFAULT_MAX_COMMITMENT_AGE,
        }
    }
}

/// Balance comparison configuration
///
/// Both sides of a comparison are divided by `10^decimals` before comparing,
/// so dust below that precision is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Precision for purchases (default: 12)
    pub purchase_precision_decimals: usize,
    /// Precision for registrations (default: 15)
    pub registration_precision_decimals: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            purchase_precision_decimals: 12,
            registration_precision_decimals: 15,
        }
    }
}

impl BalanceConfig {
    /// Divisor for purchase comparisons, `None` above 77 decimals
    #[must_use]
    pub fn purchase_divisor(&self) -> Option<U256> {
        precision_divisor(self.purchase_precision_decimals)
    }

    /// Divisor for registration comparisons, `None` above 77 decimals
    #[must_use]
    pub fn registration_divisor(&self) -> Option<U256> {
        precision_divisor(self.registration_precision_decimals)
    }
}

/// `10^decimals`, or `None` if it does not fit in 256 bits.
fn precision_divisor(decimals: usize) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Contract addresses, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Registrar controller that receives commits and registrations
    pub controller: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        // Ethereum mainnet
        Self {
            controller: "0x253553366Da8546fC250F225fe3d25d0C782303b".into(),
        }
    }
}

impl ContractsConfig {
    /// Parsed controller address
    pub fn controller_address(&self) -> Result<Address, ConfigError> {
        self.controller
            .parse::<Address>()
            .map_err(|e| ConfigError::InvalidAddress {
                field: "controller",
                reason: e.to_string(),
            })
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid pricing configuration
    #[error("invalid pricing: {0}")]
    InvalidPricing(String),
    /// Invalid commitment age window
    #[error("invalid commitment window: {0}")]
    InvalidCommitmentWindow(String),
    /// Invalid balance precision
    #[error("invalid precision: {0}")]
    InvalidPrecision(String),
    /// Unparseable contract address
    #[error("invalid address for {field}: {reason}")]
    InvalidAddress {
        /// Config field
        field: &'static str,
        /// Parse failure
        reason: String,
    },
}
