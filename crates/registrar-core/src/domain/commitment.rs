//! # Commitments
//!
//! Hashing and timing rules for the commit-reveal protocol.
//!
//! A commitment binds a label, an owner and a secret:
//!
//! ```text
//! commitment = keccak256(keccak256(label) ++ owner ++ secret)
//! ```
//!
//! It becomes usable `min_age` seconds after it is mined and stops being
//! usable `max_age` seconds after it is mined.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::domain::value_objects::{Address, Hash, Secret, UnixSeconds, DAY, MINUTE};

/// Top-level suffix stripped before hashing a label.
pub const TLD_SUFFIX: &str = ".eth";

/// Minimum age before a commitment can be revealed.
pub const DEFAULT_MIN_COMMITMENT_AGE: i64 = MINUTE;

/// Age after which a commitment can no longer be revealed.
pub const DEFAULT_MAX_COMMITMENT_AGE: i64 = DAY;

// =============================================================================
// HASHING
// =============================================================================

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let hash = Keccak256::digest(data);
    Hash::new(hash.into())
}

/// Label of a name: the name with a trailing `.eth` removed.
#[must_use]
pub fn label_of(name: &str) -> &str {
    name.strip_suffix(TLD_SUFFIX).unwrap_or(name)
}

/// Keccak-256 of the label, the registrar's token id.
#[must_use]
pub fn labelhash(name: &str) -> Hash {
    keccak256(label_of(name).as_bytes())
}

/// Commitment hash for a `(name, owner, secret)` triple.
#[must_use]
pub fn commitment_hash(name: &str, owner: &Address, secret: &Secret) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(labelhash(name).as_bytes());
    hasher.update(owner.as_bytes());
    hasher.update(secret.as_bytes());
    Hash::new(hasher.finalize().into())
}

// =============================================================================
// COMMITMENT REQUEST
// =============================================================================

/// Arguments of one commitment.
///
/// The identical triple has to be presented again at reveal time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRequest {
    /// Name being committed to.
    pub name: String,
    /// Future owner.
    pub owner: Address,
    /// Caller entropy.
    pub secret: Secret,
}

impl CommitmentRequest {
    /// Creates a request.
    pub fn new(name: impl Into<String>, owner: Address, secret: Secret) -> Self {
        Self {
            name: name.into(),
            owner,
            secret,
        }
    }

    /// Local commitment hash, identical to what the controller computes.
    #[must_use]
    pub fn hash(&self) -> Hash {
        commitment_hash(&self.name, &self.owner, &self.secret)
    }
}

// =============================================================================
// READINESS
// =============================================================================

/// Whether a mined commitment can be revealed at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentReadiness {
    /// No commitment on chain.
    NotFound,
    /// Mined but younger than the minimum age.
    TooEarly {
        /// First second at which the reveal is accepted.
        ready_at: UnixSeconds,
    },
    /// Reveal would be accepted now.
    Ready,
    /// Older than the maximum age; commit again.
    Expired,
}

impl CommitmentReadiness {
    /// Returns true only for [`CommitmentReadiness::Ready`].
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Minimum and maximum commitment age enforced by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentWindow {
    /// Seconds a commitment must age before reveal.
    pub min_age: i64,
    /// Seconds after which a commitment is stale.
    pub max_age: i64,
}

impl Default for CommitmentWindow {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_COMMITMENT_AGE,
            max_age: DEFAULT_MAX_COMMITMENT_AGE,
        }
    }
}

impl CommitmentWindow {
    /// Classifies a commitment mined at `mined_at` (0 meaning absent).
    #[must_use]
    pub fn readiness(&self, mined_at: UnixSeconds, now: UnixSeconds) -> CommitmentReadiness {
        if mined_at == 0 {
            return CommitmentReadiness::NotFound;
        }

        let ready_at = mined_at.saturating_add(self.min_age);
        if now < ready_at {
            CommitmentReadiness::TooEarly { ready_at }
        } else if now >= mined_at.saturating_add(self.max_age) {
            CommitmentReadiness::Expired
        } else {
            CommitmentReadiness::Ready
        }
    }

    /// Readiness of a whole batch: `Ready` only if every commitment is.
    ///
    /// A missing commitment wins over an expired one, which wins over one
    /// that is too early. Waiting batches report the latest `ready_at`.
    #[must_use]
    pub fn readiness_all(&self, mined: &[UnixSeconds], now: UnixSeconds) -> CommitmentReadiness {
        if mined.is_empty() {
            return CommitmentReadiness::NotFound;
        }

        let mut latest_ready_at = None;
        let mut expired = false;
        for &mined_at in mined {
            match self.readiness(mined_at, now) {
                CommitmentReadiness::NotFound => return CommitmentReadiness::NotFound,
                CommitmentReadiness::Expired => expired = true,
                CommitmentReadiness::TooEarly { ready_at } => {
                    latest_ready_at = latest_ready_at.max(Some(ready_at));
                }
                CommitmentReadiness::Ready => {}
            }
        }

        match (expired, latest_ready_at) {
            (true, _) => CommitmentReadiness::Expired,
            (false, Some(ready_at)) => CommitmentReadiness::TooEarly { ready_at },
            (false, None) => CommitmentReadiness::Ready,
        }
    }
}

/// [`CommitmentWindow::readiness`] with the default ages.
#[must_use]
pub fn commitment_readiness(mined_at: UnixSeconds, now: UnixSeconds) -> CommitmentReadiness {
    CommitmentWindow::default().readiness(mined_at, now)
}

// =============================================================================
// TESTS
// =============================================================================
