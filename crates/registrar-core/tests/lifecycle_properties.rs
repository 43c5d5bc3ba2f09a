//! # Property Tests for Lifecycle Classification and Premium Pricing
//!
//! ## Test Categories
//!
//! 1. **Partition** - every `(expiry, now)` maps to exactly the interval it falls in
//! 2. **Premium Curve** - bounded, monotone, zero outside the window
//! 3. **Display Helpers** - remaining/past identities
//! 4. **Estimate Buffer** - per-item floor before summing

use std::sync::Arc;

use proptest::prelude::*;
use registrar_core::domain::lifecycle::{GRACE_PERIOD_SECS, PREMIUM_PERIOD_SECS};
use registrar_core::domain::premium::{STARTING_PREMIUM, TOTAL_DAYS};
use registrar_core::prelude::*;

// =============================================================================
// TEST HELPERS
// =============================================================================

const EPOCH_2020: i64 = 1_577_836_800;
const WINDOW: i64 = 200 * DAY;

fn expected_state(expiry: i64, now: i64) -> RegistrationState {
    let since = now - expiry;
    if since < 0 {
        RegistrationState::Registered
    } else if since < GRACE_PERIOD_SECS {
        RegistrationState::GracePeriod
    } else if since < GRACE_PERIOD_SECS + PREMIUM_PERIOD_SECS {
        RegistrationState::Premium
    } else {
        RegistrationState::Unregistered
    }
}

// =============================================================================
// PARTITION
// =============================================================================

proptest! {
    #[test]
    fn prop_classify_matches_interval(
        expiry in EPOCH_2020..EPOCH_2020 + WINDOW,
        offset in -WINDOW..WINDOW,
    ) {
        let now = expiry + offset;
        prop_assert_eq!(classify(Some(expiry), now), expected_state(expiry, now));
    }

    #[test]
    fn prop_absent_expiry_is_unregistered(now in any::<i64>()) {
        prop_assert_eq!(classify(None, now), RegistrationState::Unregistered);
    }

    #[test]
    fn prop_classify_is_total(expiry in any::<i64>(), now in any::<i64>()) {
        // Must not panic on any pair.
        let state = classify(Some(expiry), now);
        let special = classify_special(Some(expiry), now);
        prop_assert_eq!(special.is_some(), state.is_time_sensitive());
    }
}

// =============================================================================
// PREMIUM CURVE
// =============================================================================

proptest! {
    #[test]
    fn prop_price_bounded(expiry in EPOCH_2020..EPOCH_2020 + WINDOW, offset in -WINDOW..WINDOW) {
        let oracle = PremiumPriceOracle::new(expiry);
        let price = oracle.price(expiry + offset);
        prop_assert!(price.is_finite());
        prop_assert!(price >= 0.0);
        prop_assert!(price <= STARTING_PREMIUM);
    }

    #[test]
    fn prop_price_monotone_non_increasing(
        a in 0i64..TOTAL_DAYS * DAY + DAY,
        b in 0i64..TOTAL_DAYS * DAY + DAY,
    ) {
        let oracle = PremiumPriceOracle::new(EPOCH_2020);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let release = oracle.released_date();
        prop_assert!(oracle.price(release + early) >= oracle.price(release + late));
    }

    #[test]
    fn prop_zero_outside_window(offset in 0i64..WINDOW) {
        let oracle = PremiumPriceOracle::new(EPOCH_2020);
        prop_assert_eq!(oracle.price(oracle.released_date() - 1 - offset), 0.0);
        prop_assert_eq!(oracle.price(oracle.zero_premium_date() + offset), 0.0);
    }

    #[test]
    fn prop_premium_at_matches_classification(offset in 0i64..WINDOW) {
        let now = EPOCH_2020 + offset;
        let premium = premium_at(Some(EPOCH_2020), now);
        if classify(Some(EPOCH_2020), now) == RegistrationState::Premium {
            prop_assert!(premium > 0.0);
        } else {
            prop_assert_eq!(premium, 0.0);
        }
    }
}

// =============================================================================
// DISPLAY HELPERS
// =============================================================================

proptest! {
    #[test]
    fn prop_days_identity(elapsed in 0i64..TOTAL_DAYS * DAY) {
        let oracle = PremiumPriceOracle::new(EPOCH_2020);
        let t = oracle.released_date() + elapsed;
        prop_assert_eq!(oracle.days_remaining(t) + oracle.days_past(t), TOTAL_DAYS);
        prop_assert_eq!(oracle.hours_remaining(t) + oracle.hours_past(t), TOTAL_DAYS * 24);
        prop_assert_eq!(
            oracle.minutes_remaining(t) + oracle.minutes_past(t),
            TOTAL_DAYS * 24 * 60
        );
        prop_assert_eq!(oracle.minutes_past(t), elapsed.div_euclid(MINUTE));
    }
}

// =============================================================================
// ESTIMATE BUFFER
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_estimate_is_sum_of_buffered_items(prices in prop::collection::vec(1u64..1_000_000_000, 1..8)) {
        let registrar = Arc::new(InMemoryRegistrar::new(Arc::new(FixedClock::new(EPOCH_2020))));
        let mut basket = RegistrationBasket::new();
        for (i, price) in prices.iter().enumerate() {
            let name = format!("name{i}");
            registrar.set_rent_price(&name, U256::from(*price));
            basket.push(BasketEntry::new(name, 365 * 86_400));
        }
        let committer = RegistrationCommitter::with_buffer_percent(registrar, 15);

        let estimate = tokio_test::block_on(committer.estimate_price(&basket)).unwrap();
        let expected: u64 = prices.iter().map(|p| p * 115 / 100).sum();
        prop_assert_eq!(estimate, Some(U256::from(expected)));
    }
}
