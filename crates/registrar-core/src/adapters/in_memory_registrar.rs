//! # In-Memory Registrar
//!
//! Deterministic in-process stand-in for the registrar controller.
//! Production deployments implement `RegistrarClient` over an RPC provider.
//!
//! Enforces the same rules the controller does at reveal time: commitment
//! age window, name availability, and payment covering rent plus premium.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::basket::RegistrationInput;
use crate::domain::commitment::{keccak256, labelhash, label_of, CommitmentWindow};
use crate::domain::lifecycle::{classify, RegistrationState};
use crate::domain::value_objects::{Address, Hash, TxHandle, UnixSeconds, U256};
use crate::errors::ChainError;
use crate::ports::outbound::{
    CallOutput, RegistrarCall, RegistrarClient, RegistrarWrite, TimeSource, WalletBalances,
};

/// Rent charged per second for names without an explicit price (1 gwei).
pub const DEFAULT_RENT_PER_SECOND: u64 = 1_000_000_000;

/// In-memory registrar for testing and local runs.
pub struct InMemoryRegistrar {
    clock: Arc<dyn TimeSource>,
    window: CommitmentWindow,
    /// Flat base price per label, overriding the per-second rate.
    rent_prices: RwLock<HashMap<String, U256>>,
    premiums: RwLock<HashMap<String, U256>>,
    /// Expiry per labelhash.
    expiries: RwLock<HashMap<Hash, UnixSeconds>>,
    /// Mined timestamp per commitment hash.
    commitments: RwLock<HashMap<Hash, UnixSeconds>>,
    balances: RwLock<HashMap<Address, WalletBalances>>,
    read_failure: RwLock<Option<ChainError>>,
    write_failure: RwLock<Option<ChainError>>,
    short_batches: RwLock<bool>,
    sent: RwLock<Vec<RegistrarWrite>>,
    multicalls: AtomicUsize,
    nonce: AtomicU64,
}

impl InMemoryRegistrar {
    /// Creates an empty registrar reading time from `clock`.
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            clock,
            window: CommitmentWindow::default(),
            rent_prices: RwLock::new(HashMap::new()),
            premiums: RwLock::new(HashMap::new()),
            expiries: RwLock::new(HashMap::new()),
            commitments: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
            read_failure: RwLock::new(None),
            write_failure: RwLock::new(None),
            short_batches: RwLock::new(false),
            sent: RwLock::new(Vec::new()),
            multicalls: AtomicUsize::new(0),
            nonce: AtomicU64::new(0),
        }
    }

    /// Uses a different commitment age window.
    #[must_use]
    pub fn with_commitment_window(mut self, window: CommitmentWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets a flat base price for `name`, independent of duration.
    pub fn set_rent_price(&self, name: &str, price: U256) {
        self.rent_prices.write().insert(label_of(name).to_string(), price);
    }

    /// Sets the premium charged on top of rent for `name`.
    pub fn set_premium(&self, name: &str, premium: U256) {
        self.premiums.write().insert(label_of(name).to_string(), premium);
    }

    /// Sets the on-chain expiry of `name`.
    pub fn set_expiry(&self, name: &str, expiry: UnixSeconds) {
        self.expiries.write().insert(labelhash(name), expiry);
    }

    /// Sets the balances of `account`.
    pub fn set_balances(&self, account: Address, balances: WalletBalances) {
        self.balances.write().insert(account, balances);
    }

    /// Makes every read fail with `error` until cleared with `None`.
    pub fn fail_reads(&self, error: Option<ChainError>) {
        *self.read_failure.write() = error;
    }

    /// Makes every write fail with `error` until cleared with `None`.
    pub fn fail_writes(&self, error: Option<ChainError>) {
        *self.write_failure.write() = error;
    }

    /// Drops the last output of every multicall, simulating a broken provider.
    pub fn truncate_batches(&self, enabled: bool) {
        *self.short_batches.write() = enabled;
    }

    /// Number of multicall round trips served.
    #[must_use]
    pub fn multicall_count(&self) -> usize {
        self.multicalls.load(Ordering::SeqCst)
    }

    /// Every write received, including rejected ones.
    #[must_use]
    pub fn sent(&self) -> Vec<RegistrarWrite> {
        self.sent.read().clone()
    }

    /// Mined timestamp of a commitment, if present.
    #[must_use]
    pub fn commitment(&self, hash: &Hash) -> Option<UnixSeconds> {
        self.commitments.read().get(hash).copied()
    }

    /// Current on-chain expiry of `name`, if registered.
    #[must_use]
    pub fn expiry(&self, name: &str) -> Option<UnixSeconds> {
        self.expiries.read().get(&labelhash(name)).copied()
    }

    fn rent_price(&self, name: &str, duration_secs: u64) -> (U256, U256) {
        let label = label_of(name);
        let base = self
            .rent_prices
            .read()
            .get(label)
            .copied()
            .unwrap_or_else(|| {
                U256::from(DEFAULT_RENT_PER_SECOND).saturating_mul(U256::from(duration_secs))
            });
        let premium = self.premiums.read().get(label).copied().unwrap_or_default();
        (base, premium)
    }

    fn next_tx(&self, method: &str) -> TxHandle {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut preimage = method.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        TxHandle::new(keccak256(&preimage))
    }

    fn read(&self, call: &RegistrarCall) -> CallOutput {
        match call {
            RegistrarCall::NameExpires { labelhash } => {
                let expiry = self.expiries.read().get(labelhash).copied().unwrap_or(0);
                CallOutput::Timestamp(timestamp_word(expiry))
            }
            RegistrarCall::RentPrice {
                name,
                duration_secs,
            } => {
                let (base, premium) = self.rent_price(name, *duration_secs);
                CallOutput::Price { base, premium }
            }
            RegistrarCall::Commitments { hash } => {
                let mined = self.commitments.read().get(hash).copied().unwrap_or(0);
                CallOutput::Timestamp(timestamp_word(mined))
            }
            RegistrarCall::MakeCommitment(request) => CallOutput::Commitment(request.hash()),
        }
    }

    fn apply_commit(&self, hashes: &[Hash], now: UnixSeconds) -> Result<(), ChainError> {
        let mut commitments = self.commitments.write();
        for hash in hashes {
            if let Some(&mined) = commitments.get(hash) {
                if mined.saturating_add(self.window.max_age) > now {
                    return Err(ChainError::Revert(format!(
                        "UnexpiredCommitmentExists({hash:?})"
                    )));
                }
            }
        }
        for hash in hashes {
            commitments.insert(*hash, now);
        }
        Ok(())
    }

    fn apply_register(
        &self,
        registrations: &[RegistrationInput],
        value: U256,
        now: UnixSeconds,
    ) -> Result<(), ChainError> {
        let mut commitments = self.commitments.write();
        let mut expiries = self.expiries.write();

        let mut required = U256::zero();
        for input in registrations {
            let hash = input.commitment_request().hash();
            let mined = commitments.get(&hash).copied().unwrap_or(0);
            if mined == 0 {
                return Err(ChainError::Revert(format!("CommitmentNotFound({hash:?})")));
            }
            if mined.saturating_add(self.window.min_age) > now {
                return Err(ChainError::Revert(format!("CommitmentTooNew({hash:?})")));
            }
            if mined.saturating_add(self.window.max_age) <= now {
                return Err(ChainError::Revert(format!("CommitmentTooOld({hash:?})")));
            }

            let id = labelhash(&input.name);
            let state = classify(expiries.get(&id).copied(), now);
            if !matches!(state, RegistrationState::Premium | RegistrationState::Unregistered) {
                return Err(ChainError::Revert(format!("NameNotAvailable({})", input.name)));
            }

            let (base, premium) = self.rent_price(&input.name, input.duration_secs);
            required = required.saturating_add(base.saturating_add(premium));
        }

        if value < required {
            return Err(ChainError::InsufficientValue {
                required: required.to_string(),
                sent: value.to_string(),
            });
        }

        for input in registrations {
            commitments.remove(&input.commitment_request().hash());
            let duration = i64::try_from(input.duration_secs).unwrap_or(i64::MAX);
            expiries.insert(labelhash(&input.name), now.saturating_add(duration));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrarClient for InMemoryRegistrar {
    async fn multicall(&self, calls: Vec<RegistrarCall>) -> Result<Vec<CallOutput>, ChainError> {
        self.multicalls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.read_failure.read().clone() {
            return Err(err);
        }

        let mut outputs: Vec<CallOutput> = calls.iter().map(|c| self.read(c)).collect();
        if *self.short_batches.read() {
            outputs.pop();
        }
        debug!(calls = calls.len(), outputs = outputs.len(), "[registrar] multicall served");
        Ok(outputs)
    }

    async fn send(&self, write: RegistrarWrite) -> Result<TxHandle, ChainError> {
        self.sent.write().push(write.clone());
        if let Some(err) = self.write_failure.read().clone() {
            return Err(err);
        }

        let now = self.clock.now();
        match &write {
            RegistrarWrite::BulkCommit { commitments } => self.apply_commit(commitments, now)?,
            RegistrarWrite::BulkRegister {
                registrations,
                value,
            } => self.apply_register(registrations, *value, now)?,
        }

        let tx = self.next_tx(write.method());
        debug!(method = write.method(), tx = %tx, "[registrar] write accepted");
        Ok(tx)
    }

    async fn balances(&self, account: Address) -> Result<WalletBalances, ChainError> {
        if let Some(err) = self.read_failure.read().clone() {
            return Err(err);
        }
        Ok(self.balances.read().get(&account).copied().unwrap_or_default())
    }
}

fn timestamp_word(t: UnixSeconds) -> U256 {
    U256::from(u64::try_from(t).unwrap_or(0))
}

// =============================================================================
// TESTS
// =============================================================================
