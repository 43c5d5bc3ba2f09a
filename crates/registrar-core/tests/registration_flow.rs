//! # End-to-End Registration Tests
//!
//! Drives the public API against the in-memory registrar:
//! estimate, commit, wait, reveal, and the checkout balance gate.

use std::sync::Arc;

use registrar_core::prelude::*;

// =============================================================================
// TEST HELPERS
// =============================================================================

const NOW: i64 = 1_700_000_000;
const YEAR: u64 = 365 * 86_400;
const ETH: u128 = 1_000_000_000_000_000_000;

struct Harness {
    clock: Arc<FixedClock>,
    registrar: Arc<InMemoryRegistrar>,
    committer: Arc<RegistrationCommitter<InMemoryRegistrar>>,
}

fn harness() -> Harness {
    let clock = Arc::new(FixedClock::new(NOW));
    let registrar = Arc::new(InMemoryRegistrar::new(clock.clone()));
    let committer = Arc::new(RegistrationCommitter::new(
        registrar.clone(),
        &RegistrarConfig::default(),
    ));
    Harness {
        clock,
        registrar,
        committer,
    }
}

fn owner() -> Address {
    Address::new([0x11; 20])
}

fn basket(names: &[&str]) -> RegistrationBasket {
    names.iter().map(|n| BasketEntry::new(*n, YEAR)).collect()
}

// =============================================================================
// PRICE ESTIMATE
// =============================================================================

#[tokio::test]
async fn estimate_buffers_each_name_before_summing() {
    let h = harness();
    h.registrar.set_rent_price("ten", U256::from(10));
    h.registrar.set_rent_price("twenty", U256::from(20));
    h.registrar.set_rent_price("thirty", U256::from(30));

    let api: &dyn RegistrarApi = &*h.committer;
    let total = api
        .estimate_price(&basket(&["ten", "twenty", "thirty"]))
        .await
        .unwrap();

    // 11 + 23 + 34, not floor(60 * 1.15) = 69.
    assert_eq!(total, Some(U256::from(68)));
    assert_eq!(h.registrar.multicall_count(), 1);
}

#[tokio::test]
async fn estimate_includes_premium() {
    let h = harness();
    h.registrar.set_rent_price("hot", U256::from(100));
    h.registrar.set_premium("hot", U256::from(100));

    let total = h.committer.estimate_price(&basket(&["hot"])).await.unwrap();
    assert_eq!(total, Some(U256::from(230)));
}

#[tokio::test]
async fn empty_basket_makes_no_round_trip() {
    let h = harness();
    let empty = RegistrationBasket::new();

    assert_eq!(h.committer.estimate_price(&empty).await.unwrap(), None);
    assert_eq!(h.committer.commit(&empty, owner(), Secret::new([1; 32])).await, None);
    assert_eq!(h.registrar.multicall_count(), 0);
    assert!(h.registrar.sent().is_empty());
}

// =============================================================================
// COMMIT-REVEAL
// =============================================================================

#[tokio::test]
async fn full_registration_through_driver() {
    let h = harness();
    let driver = RegistrationFlowDriver::new(
        h.committer.clone(),
        h.clock.clone(),
        CommitmentWindow::default(),
    );

    let flow = RegistrationFlow::new(basket(&["alpha", "beta.eth"]), owner(), Address::ZERO);
    let flow = driver.begin_commit(flow).await.unwrap();

    let (flow, readiness) = driver.poll_commitments(flow).await.unwrap();
    assert_eq!(readiness, CommitmentReadiness::TooEarly { ready_at: NOW + 60 });

    h.clock.advance(61);
    let (flow, readiness) = driver.poll_commitments(flow).await.unwrap();
    assert!(readiness.is_ready());

    let flow = driver.finish_registration(flow).await.unwrap();
    assert!(matches!(flow.state, RegistrationFlowState::Success { .. }));

    let expiries = h
        .committer
        .check_on_chain_expirations(&["alpha".to_string(), "beta".to_string()])
        .await
        .unwrap();
    let expected = NOW + 61 + YEAR as i64;
    assert_eq!(expiries, vec![expected, expected]);
    assert_eq!(
        classify(Some(expiries[0]), h.clock.now()),
        RegistrationState::Registered
    );

    let stats = h.committer.stats();
    assert_eq!(stats.commits_submitted, 1);
    assert_eq!(stats.registrations_submitted, 1);
}

#[tokio::test]
async fn commitments_report_mined_time_in_request_order() {
    let h = harness();
    let secret = Secret::new([7; 32]);
    let committed = basket(&["first"]);
    h.committer.commit(&committed, owner(), secret).await.unwrap();

    let requests = vec![
        CommitmentRequest::new("missing", owner(), secret),
        CommitmentRequest::new("first", owner(), secret),
    ];
    let mined = h.committer.check_commitments(&requests).await.unwrap();
    assert_eq!(mined, vec![0, NOW]);
}

#[tokio::test]
async fn duplicate_commit_reaches_the_controller() {
    let h = harness();
    let secret = Secret::new([3; 32]);
    let names = basket(&["dup"]);

    assert!(h.committer.commit(&names, owner(), secret).await.is_some());
    assert!(h.committer.commit(&names, owner(), secret).await.is_none());

    // The second attempt was submitted and reverted on chain.
    assert_eq!(h.registrar.sent().len(), 2);
    assert_eq!(h.committer.stats().commits_failed, 1);
}

#[tokio::test]
async fn reveal_after_max_age_is_rejected() {
    let h = harness();
    let secret = Secret::new([9; 32]);
    let names = basket(&["late"]);
    h.committer.commit(&names, owner(), secret).await.unwrap();

    h.clock.advance(DAY);
    let inputs = names.registration_inputs(owner(), secret, Address::ZERO);
    assert_eq!(h.committer.register(&names, &inputs).await, None);
    assert_eq!(h.registrar.expiry("late"), None);
}

#[tokio::test]
async fn registered_name_cannot_be_registered_again() {
    let h = harness();
    h.registrar.set_expiry("taken", NOW + DAY);
    let secret = Secret::new([4; 32]);
    let names = basket(&["taken"]);
    h.committer.commit(&names, owner(), secret).await.unwrap();

    h.clock.advance(120);
    let inputs = names.registration_inputs(owner(), secret, Address::ZERO);
    assert_eq!(h.committer.register(&names, &inputs).await, None);
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[test]
fn oracle_only_exists_inside_premium_window() {
    let expiry = NOW;
    let record = DomainLifecycleRecord::new("old", Some(expiry));

    // Grace period: time sensitive, no premium.
    let in_grace = expiry + 30 * DAY;
    assert_eq!(record.special_state(in_grace), Some(RegistrationState::GracePeriod));
    assert!(record.premium_oracle(in_grace).is_none());
    assert_eq!(premium_at(Some(expiry), in_grace), 0.0);

    // Premium window: oracle available and starts at the top of the curve.
    let oracle = record.premium_oracle(expiry + 90 * DAY).unwrap();
    assert_eq!(oracle.price(oracle.released_date()), 100_000_000.0);

    // Fully released.
    assert_eq!(record.state(expiry + 200 * DAY), RegistrationState::Unregistered);
    assert!(record.premium_oracle(expiry + 200 * DAY).is_none());
}

// =============================================================================
// BALANCE GATE
// =============================================================================

#[tokio::test]
async fn balance_gate_covers_every_checkout_kind() {
    let h = harness();
    let account = Address::new([0xAB; 20]);
    h.registrar.set_balances(
        account,
        WalletBalances {
            native: U256::from(2 * ETH),
            wrapped: U256::from(ETH),
        },
    );
    let checker = BalanceSufficiencyChecker::new(
        h.committer.clone(),
        RegistrarConfig::default().balance,
    );
    let gate: &dyn BalanceGate = &checker;

    let purchase = CheckoutBasket::new(vec![CheckoutItem::purchase("a", U256::from(ETH))]);
    assert!(gate.is_balance_sufficient(CheckoutKind::Purchase, &purchase, account).await);

    let offer = CheckoutBasket::new(vec![CheckoutItem::offer("a", U256::from(2 * ETH))])
        .with_offer_duration(7 * 86_400);
    assert!(!gate.is_balance_sufficient(CheckoutKind::Offer, &offer, account).await);

    h.registrar.set_rent_price("new", U256::from(ETH));
    let registration = CheckoutBasket::new(vec![CheckoutItem::registration("new", YEAR)]);
    assert!(gate.is_balance_sufficient(CheckoutKind::Registration, &registration, account).await);
}
