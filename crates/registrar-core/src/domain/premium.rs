//! # Premium Price Oracle
//!
//! Dutch-auction premium charged on top of rent for recently released names.
//!
//! The premium starts at [`STARTING_PREMIUM`] when the grace period ends and
//! halves every day for [`TOTAL_DAYS`] days:
//!
//! ```text
//! price(t) = STARTING_PREMIUM * 0.5 ^ (elapsed_units / units_per_day)
//! ```
//!
//! Below the day-21 value the curve is clamped to zero, so the premium
//! reaches exactly zero at the end of the window instead of approaching it.

use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::{classify, grace_period_end, premium_end, RegistrationState};
use crate::domain::value_objects::{UnixSeconds, DAY, HOUR, MINUTE};

/// Premium at the moment the name is released, in price units.
pub const STARTING_PREMIUM: f64 = 100_000_000.0;

/// Length of the auction in days.
pub const TOTAL_DAYS: i64 = 21;

/// Per-day multiplier.
pub const DECAY_FACTOR: f64 = 0.5;

/// Granularity of elapsed time used when evaluating the curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Precision {
    /// Whole days; visible jumps once a day.
    Day,
    /// Whole hours.
    Hour,
    /// Whole minutes; smooth enough for display.
    #[default]
    Minute,
}

impl Precision {
    /// Length of one unit in seconds.
    #[must_use]
    pub const fn unit_secs(self) -> i64 {
        match self {
            Self::Day => DAY,
            Self::Hour => HOUR,
            Self::Minute => MINUTE,
        }
    }

    /// Number of units in a day.
    #[must_use]
    pub const fn units_per_day(self) -> i64 {
        DAY / self.unit_secs()
    }
}

/// Premium calculator for one expiry.
///
/// Cheap to build; construct on demand and drop after use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PremiumPriceOracle {
    expiry: UnixSeconds,
    released_date: UnixSeconds,
    zero_premium_date: UnixSeconds,
    last_value: f64,
}

impl PremiumPriceOracle {
    /// Creates the oracle for a name that expired at `expiry`.
    #[must_use]
    pub fn new(expiry: UnixSeconds) -> Self {
        Self {
            expiry,
            released_date: grace_period_end(expiry),
            zero_premium_date: premium_end(expiry),
            last_value: STARTING_PREMIUM * DECAY_FACTOR.powi(TOTAL_DAYS as i32),
        }
    }

    /// Expiry the oracle was built from.
    #[must_use]
    pub const fn expiry(&self) -> UnixSeconds {
        self.expiry
    }

    /// Start of the premium window.
    #[must_use]
    pub const fn released_date(&self) -> UnixSeconds {
        self.released_date
    }

    /// End of the premium window; the premium is zero from here on.
    #[must_use]
    pub const fn zero_premium_date(&self) -> UnixSeconds {
        self.zero_premium_date
    }

    /// Starting premium in price units.
    #[must_use]
    pub const fn starting_premium(&self) -> f64 {
        STARTING_PREMIUM
    }

    /// Auction length in days.
    #[must_use]
    pub const fn total_days(&self) -> i64 {
        TOTAL_DAYS
    }

    /// Day-21 value; anything below it is reported as zero.
    #[must_use]
    pub const fn last_value(&self) -> f64 {
        self.last_value
    }

    /// Returns true if `t` falls inside the premium window.
    #[must_use]
    pub fn in_window(&self, t: UnixSeconds) -> bool {
        t >= self.released_date && t < self.zero_premium_date
    }

    /// Premium at `t` evaluated at the given precision.
    #[must_use]
    pub fn price_with_precision(&self, t: UnixSeconds, precision: Precision) -> f64 {
        if !self.in_window(t) {
            return 0.0;
        }

        let elapsed_units = (t - self.released_date).div_euclid(precision.unit_secs());
        let fractional_days = elapsed_units as f64 / precision.units_per_day() as f64;
        let price = STARTING_PREMIUM * DECAY_FACTOR.powf(fractional_days);

        if price < self.last_value {
            0.0
        } else {
            price
        }
    }

    /// Premium at `t` with whole-day steps.
    #[must_use]
    pub fn price_day_precision(&self, t: UnixSeconds) -> f64 {
        self.price_with_precision(t, Precision::Day)
    }

    /// Premium at `t` with whole-hour steps.
    #[must_use]
    pub fn price_hour_precision(&self, t: UnixSeconds) -> f64 {
        self.price_with_precision(t, Precision::Hour)
    }

    /// Premium at `t` with whole-minute steps.
    #[must_use]
    pub fn price_minute_precision(&self, t: UnixSeconds) -> f64 {
        self.price_with_precision(t, Precision::Minute)
    }

    /// Premium at `t`. Minute precision.
    #[must_use]
    pub fn price(&self, t: UnixSeconds) -> f64 {
        self.price_minute_precision(t)
    }

    /// Whole days since release.
    #[must_use]
    pub fn days_past(&self, t: UnixSeconds) -> i64 {
        self.units_past(t, Precision::Day)
    }

    /// Whole hours since release.
    #[must_use]
    pub fn hours_past(&self, t: UnixSeconds) -> i64 {
        self.units_past(t, Precision::Hour)
    }

    /// Whole minutes since release.
    #[must_use]
    pub fn minutes_past(&self, t: UnixSeconds) -> i64 {
        self.units_past(t, Precision::Minute)
    }

    /// Days left in the auction: `total_days - days_past`.
    #[must_use]
    pub fn days_remaining(&self, t: UnixSeconds) -> i64 {
        TOTAL_DAYS - self.days_past(t)
    }

    /// Hours left in the auction.
    #[must_use]
    pub fn hours_remaining(&self, t: UnixSeconds) -> i64 {
        TOTAL_DAYS * Precision::Hour.units_per_day() - self.hours_past(t)
    }

    /// Minutes left in the auction.
    #[must_use]
    pub fn minutes_remaining(&self, t: UnixSeconds) -> i64 {
        TOTAL_DAYS * Precision::Minute.units_per_day() - self.minutes_past(t)
    }

    /// Timestamp at which the continuous curve falls to `amount`.
    ///
    /// Returns `None` above the starting premium or for non-finite input.
    /// Amounts at or below the day-21 value map to the end of the window,
    /// where the clamped price first reaches them.
    #[must_use]
    pub fn target_date_by_amount(&self, amount: f64) -> Option<UnixSeconds> {
        if !amount.is_finite() || amount > STARTING_PREMIUM {
            return None;
        }
        if amount <= self.last_value {
            return Some(self.zero_premium_date);
        }

        let days = (amount / STARTING_PREMIUM).ln() / DECAY_FACTOR.ln();
        let offset = (days * DAY as f64).ceil() as i64;
        Some(self.released_date + offset)
    }

    fn units_past(&self, t: UnixSeconds, precision: Precision) -> i64 {
        t.saturating_sub(self.released_date)
            .div_euclid(precision.unit_secs())
    }
}

/// Current premium for a name, zero unless it is in the premium window.
#[must_use]
pub fn premium_at(expiry: Option<UnixSeconds>, now: UnixSeconds) -> f64 {
    match (classify(expiry, now), expiry) {
        (RegistrationState::Premium, Some(expiry)) => PremiumPriceOracle::new(expiry).price(now),
        _ => 0.0,
    }
}

// =============================================================================
// TESTS
// =============================================================================
