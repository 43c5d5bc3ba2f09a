//! # Lifecycle Classification
//!
//! Maps a name's expiry and the current time to its registration state.
//!
//! ```text
//!            expiry          +90d              +111d
//! ─────────────┼───────────────┼─────────────────┼──────────────▶ now
//!  Registered  │  GracePeriod  │     Premium     │  Unregistered
//! ```
//!
//! Every boundary belongs to the later state, so the four intervals partition
//! the timeline with no gap and no overlap.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{UnixSeconds, DAY};

/// Length of the grace period that follows expiry.
pub const GRACE_PERIOD_SECS: i64 = 90 * DAY;

/// Length of the premium auction that follows the grace period.
pub const PREMIUM_PERIOD_SECS: i64 = 21 * DAY;

/// Registration state of a name at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationState {
    /// Owned and not yet expired.
    Registered,
    /// Expired; only the previous owner may renew.
    GracePeriod,
    /// Released with a decaying premium on top of rent.
    Premium,
    /// Never registered, or fully released.
    Unregistered,
}

impl RegistrationState {
    /// Names in this state can be registered through the controller.
    #[must_use]
    pub fn is_registrable(&self) -> bool {
        matches!(self, Self::Premium | Self::Unregistered)
    }

    /// Grace and premium are the states whose outcome depends on a countdown.
    #[must_use]
    pub fn is_time_sensitive(&self) -> bool {
        matches!(self, Self::GracePeriod | Self::Premium)
    }

    /// Registered names are the ones a marketplace can sell or take offers on.
    #[must_use]
    pub fn is_transferable(&self) -> bool {
        matches!(self, Self::Registered)
    }
}

/// Classifies a name.
///
/// Timestamps are not validated; `expiry` is expected to be epoch seconds.
#[must_use]
pub fn classify(expiry: Option<UnixSeconds>, now: UnixSeconds) -> RegistrationState {
    let Some(expiry) = expiry else {
        return RegistrationState::Unregistered;
    };

    // i128 keeps the difference exact for any pair of i64 inputs.
    let since_expiry = i128::from(now) - i128::from(expiry);

    if since_expiry < 0 {
        RegistrationState::Registered
    } else if since_expiry < i128::from(GRACE_PERIOD_SECS) {
        RegistrationState::GracePeriod
    } else if since_expiry < i128::from(GRACE_PERIOD_SECS + PREMIUM_PERIOD_SECS) {
        RegistrationState::Premium
    } else {
        RegistrationState::Unregistered
    }
}

/// Like [`classify`], but only reports the time-sensitive states.
///
/// `Registered` and `Unregistered` collapse to `None`.
#[must_use]
pub fn classify_special(expiry: Option<UnixSeconds>, now: UnixSeconds) -> Option<RegistrationState> {
    Some(classify(expiry, now)).filter(RegistrationState::is_time_sensitive)
}

/// First second of the premium window.
#[must_use]
pub fn grace_period_end(expiry: UnixSeconds) -> UnixSeconds {
    expiry.saturating_add(GRACE_PERIOD_SECS)
}

/// First second after the premium window.
#[must_use]
pub fn premium_end(expiry: UnixSeconds) -> UnixSeconds {
    grace_period_end(expiry).saturating_add(PREMIUM_PERIOD_SECS)
}

/// A name together with its last known expiry.
///
/// Owned by the caller; the core never caches it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainLifecycleRecord {
    /// Name, with or without the `.eth` suffix.
    pub name: String,
    /// Expiry in epoch seconds, `None` if never registered.
    pub expiry: Option<UnixSeconds>,
}

impl DomainLifecycleRecord {
    /// Creates a record.
    pub fn new(name: impl Into<String>, expiry: Option<UnixSeconds>) -> Self {
        Self {
            name: name.into(),
            expiry,
        }
    }

    /// Registration state at `now`.
    #[must_use]
    pub fn state(&self, now: UnixSeconds) -> RegistrationState {
        classify(self.expiry, now)
    }

    /// Time-sensitive state at `now`, if any.
    #[must_use]
    pub fn special_state(&self, now: UnixSeconds) -> Option<RegistrationState> {
        classify_special(self.expiry, now)
    }

    /// Premium oracle for this record, only while it is in the premium window.
    #[must_use]
    pub fn premium_oracle(&self, now: UnixSeconds) -> Option<crate::domain::premium::PremiumPriceOracle> {
        match (self.state(now), self.expiry) {
            (RegistrationState::Premium, Some(expiry)) => {
                Some(crate::domain::premium::PremiumPriceOracle::new(expiry))
            }
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
