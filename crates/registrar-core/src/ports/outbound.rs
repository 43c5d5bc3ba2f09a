//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the registrar core depends on:
//! - the on-chain registrar controller, reached through one batched
//!   multicall per read and one transaction per write
//! - wallet balances
//! - wall-clock time
//!
//! Adapters implement these traits; the core never talks to a provider
//! directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::basket::RegistrationInput;
use crate::domain::commitment::CommitmentRequest;
use crate::domain::value_objects::{Address, Hash, TxHandle, UnixSeconds, U256};
use crate::errors::ChainError;

// =============================================================================
// REGISTRAR CLIENT
// =============================================================================

/// One read in a multicall batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrarCall {
    /// `nameExpires(uint256 id)` on the base registrar.
    NameExpires {
        /// Token id of the name.
        labelhash: Hash,
    },
    /// `rentPrice(string name, uint256 duration)` on the controller.
    RentPrice {
        /// Name to price.
        name: String,
        /// Duration in seconds.
        duration_secs: u64,
    },
    /// `commitments(bytes32)` on the controller.
    Commitments {
        /// Commitment hash.
        hash: Hash,
    },
    /// `makeCommitment(...)` on the controller.
    MakeCommitment(CommitmentRequest),
}

impl RegistrarCall {
    /// Contract method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::NameExpires { .. } => "nameExpires",
            Self::RentPrice { .. } => "rentPrice",
            Self::Commitments { .. } => "commitments",
            Self::MakeCommitment(_) => "makeCommitment",
        }
    }
}

/// Decoded result of one [`RegistrarCall`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutput {
    /// A `uint256` timestamp; `0` means unset.
    Timestamp(U256),
    /// Rent price split into base rent and premium, in wei.
    Price {
        /// Base rent.
        base: U256,
        /// Premium on top of rent.
        premium: U256,
    },
    /// A commitment hash.
    Commitment(Hash),
}

/// State-changing call on the controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrarWrite {
    /// `bulkCommit(bytes32[])`.
    BulkCommit {
        /// Commitment hashes, in basket order.
        commitments: Vec<Hash>,
    },
    /// `bulkRegister(...)` paying `value` wei.
    BulkRegister {
        /// Reveal arguments, in basket order.
        registrations: Vec<RegistrationInput>,
        /// Attached payment.
        value: U256,
    },
}

impl RegistrarWrite {
    /// Contract method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::BulkCommit { .. } => "bulkCommit",
            Self::BulkRegister { .. } => "bulkRegister",
        }
    }
}

/// Balances of one account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalances {
    /// Native currency, in wei.
    pub native: U256,
    /// Wrapped token used for offers, in wei.
    pub wrapped: U256,
}

/// Interface to the on-chain registrar.
///
/// ## Implementation Notes
///
/// - `multicall` must answer with exactly one output per call, in call order,
///   in a single round trip
/// - `send` returns once the transaction is submitted, not mined
#[async_trait]
pub trait RegistrarClient: Send + Sync {
    /// Executes a batch of reads.
    async fn multicall(&self, calls: Vec<RegistrarCall>) -> Result<Vec<CallOutput>, ChainError>;

    /// Submits a write.
    async fn send(&self, write: RegistrarWrite) -> Result<TxHandle, ChainError>;

    /// Reads native and wrapped balances of `account`.
    async fn balances(&self, account: Address) -> Result<WalletBalances, ChainError>;
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current time in epoch seconds.
    fn now(&self) -> UnixSeconds;
}
