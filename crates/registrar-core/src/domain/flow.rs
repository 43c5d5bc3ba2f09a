//! # Registration Flow
//!
//! State machine for one commit-reveal attempt.
//!
//! ```text
//! Review -> Committing -> Waiting -> Registering -> Success
//!    \          \            \            \
//!     +----------+------------+------------+------> Error
//! ```
//!
//! `Success` and `Error` are terminal. The state is a plain value: callers
//! hold it and pass it back in to advance.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::basket::RegistrationBasket;
use crate::domain::value_objects::{Address, Secret, TxHandle, UnixSeconds};
use crate::errors::FlowError;

/// Why a flow ended in `Error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowFailure {
    /// The commit transaction could not be submitted.
    CommitFailed,
    /// Commitment status could not be read.
    CommitmentLookupFailed,
    /// A commitment aged past the maximum before reveal.
    CommitmentExpired,
    /// The register transaction could not be submitted.
    RegisterFailed,
}

/// Stage of a registration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegistrationFlowState {
    /// Basket assembled, nothing submitted.
    #[default]
    Review,
    /// Commit transaction being submitted.
    Committing,
    /// Commit submitted; waiting out the minimum age.
    Waiting {
        /// Commit transaction.
        commit_tx: TxHandle,
        /// Local time the commit was submitted.
        committed_at: UnixSeconds,
    },
    /// Register transaction being submitted.
    Registering,
    /// Names registered.
    Success {
        /// Register transaction.
        register_tx: TxHandle,
    },
    /// Attempt abandoned.
    Error {
        /// Failure code.
        failure: FlowFailure,
    },
}

impl RegistrationFlowState {
    /// Variant name, for errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Committing => "Committing",
            Self::Waiting { .. } => "Waiting",
            Self::Registering => "Registering",
            Self::Success { .. } => "Success",
            Self::Error { .. } => "Error",
        }
    }

    /// Check if transition to next state is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Review, Self::Committing) => true,
            (Self::Committing, Self::Waiting { .. }) => true,
            (Self::Waiting { .. }, Self::Registering) => true,
            (Self::Registering, Self::Success { .. }) => true,
            (current, Self::Error { .. }) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Check if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    /// Moves to `next`, consuming the current state.
    pub fn transition(self, next: Self) -> Result<Self, FlowError> {
        if self.can_transition_to(&next) {
            Ok(next)
        } else {
            Err(FlowError::InvalidTransition {
                from: self.name(),
                to: next.name(),
            })
        }
    }
}

/// One registration attempt: basket, reveal arguments, and current state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFlow {
    /// Correlation id used in logs.
    pub id: Uuid,
    /// Names being registered.
    pub basket: RegistrationBasket,
    /// Future owner of every name.
    pub owner: Address,
    /// Secret shared by every commitment in the basket.
    pub secret: Secret,
    /// Resolver set at registration.
    pub resolver: Address,
    /// Current stage.
    pub state: RegistrationFlowState,
}

impl RegistrationFlow {
    /// Starts a flow in `Review` with a fresh secret.
    #[must_use]
    pub fn new(basket: RegistrationBasket, owner: Address, resolver: Address) -> Self {
        Self::with_secret(basket, owner, resolver, Secret::random())
    }

    /// Starts a flow in `Review` with a caller-chosen secret.
    #[must_use]
    pub fn with_secret(
        basket: RegistrationBasket,
        owner: Address,
        resolver: Address,
        secret: Secret,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            basket,
            owner,
            secret,
            resolver,
            state: RegistrationFlowState::Review,
        }
    }

    /// Transition to a new state.
    pub fn transition_to(&mut self, next: RegistrationFlowState) -> Result<(), FlowError> {
        self.state = self.state.transition(next)?;
        Ok(())
    }

    /// Moves to `Error` with the given failure.
    pub fn fail(&mut self, failure: FlowFailure) -> Result<(), FlowError> {
        self.transition_to(RegistrationFlowState::Error { failure })
    }
}

// =============================================================================
// TESTS
// =============================================================================
