//! # Error Types
//!
//! All error types for the registrar core.

use thiserror::Error;

// =============================================================================
// VALUE ERRORS
// =============================================================================

/// Errors from parsing value objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length did not match the target type.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length
        expected: usize,
        /// Decoded byte length
        actual: usize,
    },
}

// =============================================================================
// CHAIN ERRORS
// =============================================================================

/// Errors surfaced by the on-chain client port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The contract call reverted.
    #[error("execution reverted: {0}")]
    Revert(String),

    /// Transaction value does not cover the required payment.
    #[error("insufficient value: required {required}, sent {sent}")]
    InsufficientValue {
        /// Required payment in wei
        required: String,
        /// Attached payment in wei
        sent: String,
    },

    /// Provider is unreachable.
    #[error("provider unavailable")]
    Unavailable,

    /// Provider did not answer in time.
    #[error("provider timeout after {timeout_ms}ms")]
    Timeout {
        /// Elapsed timeout
        timeout_ms: u64,
    },

    /// Other provider error.
    #[error("provider error: {0}")]
    Other(String),
}

impl ChainError {
    /// Returns true if the failure came from contract execution rather than transport.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert(_) | Self::InsufficientValue { .. })
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable | Self::Timeout { .. })
    }
}

// =============================================================================
// REGISTRAR ERRORS
// =============================================================================

/// Errors from batched registrar reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrarError {
    /// Client port failure.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// A batched call returned a different number of results than requested.
    #[error("batch length mismatch: expected {expected}, got {actual}")]
    BatchLengthMismatch {
        /// Calls sent
        expected: usize,
        /// Outputs received
        actual: usize,
    },

    /// A batched call returned an output of the wrong shape.
    #[error("unexpected output at index {index} for {call}")]
    UnexpectedOutput {
        /// Position in the batch
        index: usize,
        /// Contract method
        call: &'static str,
    },

    /// A buffered price or the running total does not fit in 256 bits.
    #[error("price overflow at index {index}")]
    PriceOverflow {
        /// Position in the batch
        index: usize,
    },

    /// A timestamp read from chain does not fit the local time type.
    #[error("timestamp out of range at index {index}")]
    TimestampOutOfRange {
        /// Position in the batch
        index: usize,
    },
}

// =============================================================================
// FLOW ERRORS
// =============================================================================

/// Errors from the registration state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Attempted an edge the state machine does not allow.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: &'static str,
        /// Attempted state
        to: &'static str,
    },

    /// Operation needs the flow in a different state.
    #[error("flow is in {actual}, expected {expected}")]
    WrongState {
        /// Required state
        expected: &'static str,
        /// Current state
        actual: &'static str,
    },
}

// =============================================================================
// TESTS
// =============================================================================
