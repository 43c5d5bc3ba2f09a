//! # Balance Sufficiency
//!
//! Gates checkout on whether the wallet can pay.
//!
//! | Kind | Required amount | Compared against | Precision |
//! |------|-----------------|------------------|-----------|
//! | Purchase | sum of listing prices | native balance | `10^12` wei |
//! | Offer | sum of offer values | wrapped balance | 1 wei |
//! | Registration | buffered rent estimate | native balance | `10^15` wei |
//!
//! Nothing is cached; every call reads fresh balances and prices.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::config::BalanceConfig;
use crate::domain::basket::{CheckoutBasket, CheckoutKind};
use crate::domain::value_objects::{Address, U256};
use crate::ports::inbound::BalanceGate;
use crate::ports::outbound::{RegistrarClient, WalletBalances};
use crate::service::committer::RegistrationCommitter;

/// Balance checker backed by a committer for registration estimates.
pub struct BalanceSufficiencyChecker<C: RegistrarClient> {
    committer: Arc<RegistrationCommitter<C>>,
    config: BalanceConfig,
}

impl<C: RegistrarClient> BalanceSufficiencyChecker<C> {
    /// Creates a checker.
    pub fn new(committer: Arc<RegistrationCommitter<C>>, config: BalanceConfig) -> Self {
        Self { committer, config }
    }

    /// Returns true only if `account` can cover `basket` for `kind`.
    #[instrument(skip(self, basket), fields(items = basket.items.len()))]
    pub async fn is_balance_sufficient(
        &self,
        kind: CheckoutKind,
        basket: &CheckoutBasket,
        account: Address,
    ) -> bool {
        let sufficient = match kind {
            CheckoutKind::Purchase => self.purchase_sufficient(basket, account).await,
            CheckoutKind::Offer => self.offer_sufficient(basket, account).await,
            CheckoutKind::Registration => self.registration_sufficient(basket, account).await,
        };
        debug!(sufficient, "[registrar] balance checked");
        sufficient
    }

    async fn purchase_sufficient(&self, basket: &CheckoutBasket, account: Address) -> bool {
        let Some(total) = sum_all_present(basket.items.iter().map(|i| i.listing_price)) else {
            return false;
        };
        if total.is_zero() {
            return false;
        }

        let Some(balances) = self.read_balances(account).await else {
            return false;
        };
        let Some(divisor) = self.config.purchase_divisor() else {
            error!(
                decimals = self.config.purchase_precision_decimals,
                "[registrar] purchase precision out of range"
            );
            return false;
        };
        total / divisor <= balances.native / divisor
    }

    async fn offer_sufficient(&self, basket: &CheckoutBasket, account: Address) -> bool {
        if basket.offer_duration_secs.is_none() {
            return false;
        }
        let Some(total) = sum_all_present(basket.items.iter().map(|i| i.offer_value)) else {
            return false;
        };
        if total.is_zero() {
            return false;
        }

        let Some(balances) = self.read_balances(account).await else {
            return false;
        };
        total <= balances.wrapped
    }

    async fn registration_sufficient(&self, basket: &CheckoutBasket, account: Address) -> bool {
        let registration = basket.to_registration_basket();
        let estimate = match self.committer.estimate_price(&registration).await {
            Ok(Some(estimate)) => estimate,
            Ok(None) => return false,
            Err(e) => {
                error!(error = %e, "[registrar] price estimate failed");
                return false;
            }
        };

        let Some(balances) = self.read_balances(account).await else {
            return false;
        };
        let Some(divisor) = self.config.registration_divisor() else {
            error!(
                decimals = self.config.registration_precision_decimals,
                "[registrar] registration precision out of range"
            );
            return false;
        };
        estimate / divisor <= balances.native / divisor
    }

    async fn read_balances(&self, account: Address) -> Option<WalletBalances> {
        match self.committer.client().balances(account).await {
            Ok(balances) => Some(balances),
            Err(e) => {
                error!(error = %e, account = %account, "[registrar] balance read failed");
                None
            }
        }
    }
}

/// Sum of every amount, or `None` if any is missing or zero or the sum overflows.
fn sum_all_present(amounts: impl Iterator<Item = Option<U256>>) -> Option<U256> {
    let mut total = U256::zero();
    for amount in amounts {
        let amount = amount.filter(|a| !a.is_zero())?;
        total = total.checked_add(amount)?;
    }
    Some(total)
}

#[async_trait]
impl<C: RegistrarClient> BalanceGate for BalanceSufficiencyChecker<C> {
    async fn is_balance_sufficient(
        &self,
        kind: CheckoutKind,
        basket: &CheckoutBasket,
        account: Address,
    ) -> bool {
        BalanceSufficiencyChecker::is_balance_sufficient(self, kind, basket, account).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
