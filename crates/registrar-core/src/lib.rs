//! # Registrar Core - Name Lifecycle, Premium Pricing and Commit-Reveal
//!
//! Domain logic for browsing, pricing and registering `.eth` names.
//!
//! ## Purpose
//!
//! - Classify a name's lifecycle from its expiry
//! - Price the decaying premium auction that follows the grace period
//! - Drive the two-phase commit-reveal registration with batched reads
//! - Gate checkout on wallet balance
//!
//! ## Lifecycle
//!
//! | State | Time since expiry | Registrable |
//! |-------|-------------------|-------------|
//! | `Registered` | `< 0` | no |
//! | `GracePeriod` | `[0, 90d)` | no |
//! | `Premium` | `[90d, 111d)` | yes, rent + premium |
//! | `Unregistered` | `>= 111d` or never registered | yes |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `RegistrarClient` | Batched reads, bulk commit/register, balances |
//! | `TimeSource` | Wall-clock time |
//!
//! ## Usage Example
//!
//! ```ignore
//! use registrar_core::prelude::*;
//!
//! let committer = RegistrationCommitter::new(client, &config);
//! let total = committer.estimate_price(&basket).await?;
//! let tx = committer.commit(&basket, owner, Secret::random()).await;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Value objects
    pub use crate::domain::value_objects::{
        Address, Hash, Secret, TxHandle, UnixSeconds, DAY, HOUR, MINUTE, U256,
    };

    // Lifecycle and pricing
    pub use crate::domain::lifecycle::{
        classify, classify_special, DomainLifecycleRecord, RegistrationState,
    };
    pub use crate::domain::premium::{premium_at, Precision, PremiumPriceOracle};

    // Commitments, baskets, flow
    pub use crate::domain::basket::{
        BasketEntry, CheckoutBasket, CheckoutItem, CheckoutKind, RegistrationBasket,
        RegistrationInput,
    };
    pub use crate::domain::commitment::{
        commitment_hash, commitment_readiness, labelhash, CommitmentReadiness, CommitmentRequest,
        CommitmentWindow,
    };
    pub use crate::domain::flow::{FlowFailure, RegistrationFlow, RegistrationFlowState};

    // Ports
    pub use crate::ports::inbound::{BalanceGate, RegistrarApi};
    pub use crate::ports::outbound::{
        CallOutput, RegistrarCall, RegistrarClient, RegistrarWrite, TimeSource, WalletBalances,
    };

    // Errors
    pub use crate::config::{ConfigError, RegistrarConfig};
    pub use crate::errors::{ChainError, FlowError, RegistrarError, ValueError};

    // Adapters
    pub use crate::adapters::{FixedClock, InMemoryRegistrar, SystemClock};

    // Services
    pub use crate::service::{
        BalanceSufficiencyChecker, CommitterStats, RegistrationCommitter, RegistrationFlowDriver,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
