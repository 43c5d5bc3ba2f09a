//! # Registration Committer
//!
//! Drives the commit-reveal protocol against a [`RegistrarClient`].
//!
//! ## Round Trips
//!
//! | Operation | Reads | Writes |
//! |-----------|-------|--------|
//! | `estimate_price` | 1 multicall (`rentPrice` per name) | - |
//! | `commit` | 1 multicall (`makeCommitment` per name) | `bulkCommit` |
//! | `check_commitments` | 1 multicall (`commitments` per hash) | - |
//! | `register` | 1 multicall (re-estimate) | `bulkRegister` |
//! | `check_on_chain_expirations` | 1 multicall (`nameExpires` per name) | - |
//!
//! Reads fail with [`RegistrarError`]. Writes never fail loudly: any error is
//! logged and the caller receives `None`.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RegistrarConfig;
use crate::domain::basket::{apply_price_buffer, RegistrationBasket, RegistrationInput};
use crate::domain::commitment::{labelhash, CommitmentRequest};
use crate::domain::value_objects::{Address, Hash, Secret, TxHandle, UnixSeconds, U256};
use crate::errors::RegistrarError;
use crate::ports::inbound::RegistrarApi;
use crate::ports::outbound::{CallOutput, RegistrarCall, RegistrarClient, RegistrarWrite};

/// Counters for the committer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitterStats {
    /// Multicall round trips issued.
    pub batched_reads: u64,
    /// `bulkCommit` transactions accepted.
    pub commits_submitted: u64,
    /// `bulkCommit` attempts that failed.
    pub commits_failed: u64,
    /// `bulkRegister` transactions accepted.
    pub registrations_submitted: u64,
    /// `bulkRegister` attempts that failed.
    pub registrations_failed: u64,
}

/// Commit-reveal driver over a registrar client.
pub struct RegistrationCommitter<C: RegistrarClient> {
    client: Arc<C>,
    buffer_percent: u64,
    stats: RwLock<CommitterStats>,
}

impl<C: RegistrarClient> RegistrationCommitter<C> {
    /// Creates a committer using the configured price buffer.
    pub fn new(client: Arc<C>, config: &RegistrarConfig) -> Self {
        Self::with_buffer_percent(client, config.pricing.buffer_percent)
    }

    /// Creates a committer with an explicit price buffer.
    pub fn with_buffer_percent(client: Arc<C>, buffer_percent: u64) -> Self {
        Self {
            client,
            buffer_percent,
            stats: RwLock::new(CommitterStats::default()),
        }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Price buffer in percent.
    #[must_use]
    pub fn buffer_percent(&self) -> u64 {
        self.buffer_percent
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CommitterStats {
        self.stats.read().clone()
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Buffered total rent for `basket`; `None` when the basket is empty.
    ///
    /// The buffer is applied to each name's price before summing.
    #[instrument(skip(self, basket), fields(names = basket.len()))]
    pub async fn estimate_price(
        &self,
        basket: &RegistrationBasket,
    ) -> Result<Option<U256>, RegistrarError> {
        if basket.is_empty() {
            return Ok(None);
        }

        let calls = basket
            .iter()
            .map(|entry| RegistrarCall::RentPrice {
                name: entry.name.clone(),
                duration_secs: entry.duration_secs,
            })
            .collect();

        let mut total = U256::zero();
        for (index, output) in self.batch(calls).await?.into_iter().enumerate() {
            let CallOutput::Price { base, premium } = output else {
                return Err(RegistrarError::UnexpectedOutput {
                    index,
                    call: "rentPrice",
                });
            };
            total = base
                .checked_add(premium)
                .and_then(|price| apply_price_buffer(price, self.buffer_percent))
                .and_then(|price| total.checked_add(price))
                .ok_or(RegistrarError::PriceOverflow { index })?;
        }

        debug!(total = %total, "[registrar] price estimated");
        Ok(Some(total))
    }

    /// Commitment hashes as computed by the controller, in request order.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn make_commitments(
        &self,
        requests: &[CommitmentRequest],
    ) -> Result<Vec<Hash>, RegistrarError> {
        let calls = requests
            .iter()
            .cloned()
            .map(RegistrarCall::MakeCommitment)
            .collect();

        self.batch(calls)
            .await?
            .into_iter()
            .enumerate()
            .map(|(index, output)| match output {
                CallOutput::Commitment(hash) => Ok(hash),
                _ => Err(RegistrarError::UnexpectedOutput {
                    index,
                    call: "makeCommitment",
                }),
            })
            .collect()
    }

    /// Mined timestamp of each commitment, `0` where absent.
    ///
    /// Hashes are derived locally, so this is a single round trip.
    pub async fn check_commitments(
        &self,
        requests: &[CommitmentRequest],
    ) -> Result<Vec<UnixSeconds>, RegistrarError> {
        let hashes: Vec<Hash> = requests.iter().map(CommitmentRequest::hash).collect();
        self.check_commitment_hashes(&hashes).await
    }

    /// Mined timestamp of each commitment hash, `0` where absent.
    #[instrument(skip(self, hashes), fields(count = hashes.len()))]
    pub async fn check_commitment_hashes(
        &self,
        hashes: &[Hash],
    ) -> Result<Vec<UnixSeconds>, RegistrarError> {
        let calls = hashes
            .iter()
            .map(|hash| RegistrarCall::Commitments { hash: *hash })
            .collect();
        let outputs = self.batch(calls).await?;
        timestamps(outputs, "commitments")
    }

    /// Authoritative on-chain expiry of each name, `0` where never registered.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub async fn check_on_chain_expirations(
        &self,
        names: &[String],
    ) -> Result<Vec<UnixSeconds>, RegistrarError> {
        let calls = names
            .iter()
            .map(|name| RegistrarCall::NameExpires {
                labelhash: labelhash(name),
            })
            .collect();
        let outputs = self.batch(calls).await?;
        timestamps(outputs, "nameExpires")
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Commits to every name in `basket` under one owner and secret.
    ///
    /// Duplicate names are passed through; the controller decides.
    #[instrument(skip(self, basket, owner, secret), fields(names = basket.len(), owner = %owner))]
    pub async fn commit(
        &self,
        basket: &RegistrationBasket,
        owner: Address,
        secret: Secret,
    ) -> Option<TxHandle> {
        if basket.is_empty() {
            warn!("[registrar] nothing to commit");
            return None;
        }

        let requests = basket.commitment_requests(owner, secret);
        let commitments = match self.make_commitments(&requests).await {
            Ok(hashes) => hashes,
            Err(e) => {
                error!(error = %e, "[registrar] failed to build commitments");
                self.stats.write().commits_failed += 1;
                return None;
            }
        };

        match self
            .client
            .send(RegistrarWrite::BulkCommit { commitments })
            .await
        {
            Ok(tx) => {
                info!(tx = %tx, "[registrar] commitments submitted");
                self.stats.write().commits_submitted += 1;
                Some(tx)
            }
            Err(e) => {
                error!(error = %e, revert = e.is_revert(), "[registrar] commit failed");
                self.stats.write().commits_failed += 1;
                None
            }
        }
    }

    /// Registers every name in `basket`, paying the freshly estimated total.
    ///
    /// `inputs` must line up with `basket` entry for entry.
    #[instrument(skip(self, basket, inputs), fields(names = basket.len()))]
    pub async fn register(
        &self,
        basket: &RegistrationBasket,
        inputs: &[RegistrationInput],
    ) -> Option<TxHandle> {
        if inputs.len() != basket.len() {
            error!(
                basket = basket.len(),
                inputs = inputs.len(),
                "[registrar] registration inputs do not match basket"
            );
            self.stats.write().registrations_failed += 1;
            return None;
        }

        let value = match self.estimate_price(basket).await {
            Ok(Some(total)) => total,
            Ok(None) => {
                warn!("[registrar] nothing to register");
                return None;
            }
            Err(e) => {
                error!(error = %e, "[registrar] price estimate failed before register");
                self.stats.write().registrations_failed += 1;
                return None;
            }
        };

        let write = RegistrarWrite::BulkRegister {
            registrations: inputs.to_vec(),
            value,
        };
        match self.client.send(write).await {
            Ok(tx) => {
                info!(tx = %tx, value = %value, "[registrar] registration submitted");
                self.stats.write().registrations_submitted += 1;
                Some(tx)
            }
            Err(e) => {
                error!(error = %e, revert = e.is_revert(), "[registrar] register failed");
                self.stats.write().registrations_failed += 1;
                None
            }
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn batch(&self, calls: Vec<RegistrarCall>) -> Result<Vec<CallOutput>, RegistrarError> {
        let expected = calls.len();
        if expected == 0 {
            return Ok(Vec::new());
        }

        self.stats.write().batched_reads += 1;
        let outputs = self.client.multicall(calls).await?;
        if outputs.len() != expected {
            return Err(RegistrarError::BatchLengthMismatch {
                expected,
                actual: outputs.len(),
            });
        }
        Ok(outputs)
    }
}

fn timestamps(
    outputs: Vec<CallOutput>,
    call: &'static str,
) -> Result<Vec<UnixSeconds>, RegistrarError> {
    let max = U256::from(i64::MAX.unsigned_abs());
    outputs
        .into_iter()
        .enumerate()
        .map(|(index, output)| match output {
            CallOutput::Timestamp(value) if value > max => {
                Err(RegistrarError::TimestampOutOfRange { index })
            }
            CallOutput::Timestamp(value) => Ok(value.low_u64() as UnixSeconds),
            _ => Err(RegistrarError::UnexpectedOutput { index, call }),
        })
        .collect()
}

#[async_trait]
impl<C: RegistrarClient> RegistrarApi for RegistrationCommitter<C> {
    async fn estimate_price(
        &self,
        basket: &RegistrationBasket,
    ) -> Result<Option<U256>, RegistrarError> {
        RegistrationCommitter::estimate_price(self, basket).await
    }

    async fn commit(
        &self,
        basket: &RegistrationBasket,
        owner: Address,
        secret: Secret,
    ) -> Option<TxHandle> {
        RegistrationCommitter::commit(self, basket, owner, secret).await
    }

    async fn check_commitments(
        &self,
        requests: &[CommitmentRequest],
    ) -> Result<Vec<UnixSeconds>, RegistrarError> {
        RegistrationCommitter::check_commitments(self, requests).await
    }

    async fn register(
        &self,
        basket: &RegistrationBasket,
        inputs: &[RegistrationInput],
    ) -> Option<TxHandle> {
        RegistrationCommitter::register(self, basket, inputs).await
    }

    async fn check_on_chain_expirations(
        &self,
        names: &[String],
    ) -> Result<Vec<UnixSeconds>, RegistrarError> {
        RegistrationCommitter::check_on_chain_expirations(self, names).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
