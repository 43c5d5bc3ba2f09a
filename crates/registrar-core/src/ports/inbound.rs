//! # Driving Ports (API - Inbound)
//!
//! Interfaces the registrar core exposes to checkout and registration
//! frontends.

use async_trait::async_trait;

use crate::domain::basket::{CheckoutBasket, CheckoutKind, RegistrationBasket, RegistrationInput};
use crate::domain::commitment::CommitmentRequest;
use crate::domain::value_objects::{Address, Secret, TxHandle, UnixSeconds, U256};
use crate::errors::RegistrarError;

// =============================================================================
// REGISTRAR API (Primary Driving Port)
// =============================================================================

/// Commit-reveal registration against the on-chain controller.
///
/// Every read is a single batched round trip; results are returned in
/// basket order.
///
/// ## Usage
///
/// ```ignore
/// let total = api.estimate_price(&basket).await?;
/// let commit_tx = api.commit(&basket, owner, secret).await;
/// // ... wait out the minimum commitment age ...
/// let register_tx = api.register(&basket, &inputs).await;
/// ```
#[async_trait]
pub trait RegistrarApi: Send + Sync {
    /// Buffered total rent for the basket.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The basket is empty
    /// * `Ok(Some(total))` - Sum of per-name buffered prices, in wei
    async fn estimate_price(
        &self,
        basket: &RegistrationBasket,
    ) -> Result<Option<U256>, RegistrarError>;

    /// Submits one commitment per basket entry in a single transaction.
    ///
    /// Returns `None` if the commitments could not be built or sent.
    async fn commit(
        &self,
        basket: &RegistrationBasket,
        owner: Address,
        secret: Secret,
    ) -> Option<TxHandle>;

    /// Mined timestamp of each commitment, `0` where absent.
    async fn check_commitments(
        &self,
        requests: &[CommitmentRequest],
    ) -> Result<Vec<UnixSeconds>, RegistrarError>;

    /// Registers every basket entry in a single paid transaction.
    ///
    /// Returns `None` if the price could not be estimated or the
    /// transaction was rejected.
    async fn register(
        &self,
        basket: &RegistrationBasket,
        inputs: &[RegistrationInput],
    ) -> Option<TxHandle>;

    /// Authoritative on-chain expiry of each name, `0` where never registered.
    async fn check_on_chain_expirations(
        &self,
        names: &[String],
    ) -> Result<Vec<UnixSeconds>, RegistrarError>;
}

// =============================================================================
// BALANCE GATE
// =============================================================================

/// Decides whether a wallet can pay for a checkout.
#[async_trait]
pub trait BalanceGate: Send + Sync {
    /// Returns true only if `account` can cover the basket for `kind`.
    ///
    /// Missing prices, empty baskets and read failures all answer `false`.
    async fn is_balance_sufficient(
        &self,
        kind: CheckoutKind,
        basket: &CheckoutBasket,
        account: Address,
    ) -> bool;
}
