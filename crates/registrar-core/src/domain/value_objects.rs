//! # Value Objects
//!
//! Immutable domain primitives for name registration.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValueError;

// Re-export U256 from primitive-types for on-chain integer arithmetic
pub use primitive_types::U256;

// =============================================================================
// TIME
// =============================================================================

/// Seconds since the Unix epoch.
///
/// Signed so the lifecycle classifier is total over the whole integer line.
pub type UnixSeconds = i64;

/// One minute in seconds.
pub const MINUTE: i64 = 60;

/// One hour in seconds.
pub const HOUR: i64 = 60 * MINUTE;

/// One day in seconds.
pub const DAY: i64 = 24 * HOUR;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte Ethereum account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte Keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[28..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// SECRET (32 bytes of caller entropy)
// =============================================================================

/// Commitment secret.
///
/// The same `(name, owner, secret)` triple has to be presented at reveal time,
/// so callers keep the secret for the lifetime of a registration session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Secret(pub [u8; 32]);

impl Secret {
    /// Creates a secret from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Draws a fresh secret from the thread-local CSPRNG.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// Never print the full secret.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(0x{:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

impl FromStr for Secret {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

// =============================================================================
// TRANSACTION HANDLE
// =============================================================================

/// Handle to a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TxHandle {
    /// Transaction hash as returned by the provider.
    pub hash: Hash,
}

impl TxHandle {
    /// Wraps a transaction hash.
    #[must_use]
    pub const fn new(hash: Hash) -> Self {
        Self { hash }
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.hash, f)
    }
}

// =============================================================================
// HEX DECODING
// =============================================================================

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ValueError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let raw = hex::decode(trimmed).map_err(|e| ValueError::InvalidHex(e.to_string()))?;
    if raw.len() != N {
        return Err(ValueError::InvalidLength {
            expected: N,
            actual: raw.len(),
        });
    }
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&raw);
    Ok(bytes)
}

// =============================================================================
// TESTS
// =============================================================================
