//! # Registration Flow Driver
//!
//! Advances a [`RegistrationFlow`] through commit, wait and register.
//!
//! Each step takes the flow by value and hands it back in its new state.
//! Chain failures move the flow to `Error`; calling a step from the wrong
//! state is a [`FlowError`].

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::commitment::{CommitmentReadiness, CommitmentWindow};
use crate::domain::flow::{FlowFailure, RegistrationFlow, RegistrationFlowState};
use crate::errors::FlowError;
use crate::ports::outbound::{RegistrarClient, TimeSource};
use crate::service::committer::RegistrationCommitter;

/// Drives registration flows against one committer.
pub struct RegistrationFlowDriver<C: RegistrarClient> {
    committer: Arc<RegistrationCommitter<C>>,
    clock: Arc<dyn TimeSource>,
    window: CommitmentWindow,
}

impl<C: RegistrarClient> RegistrationFlowDriver<C> {
    /// Creates a driver.
    pub fn new(
        committer: Arc<RegistrationCommitter<C>>,
        clock: Arc<dyn TimeSource>,
        window: CommitmentWindow,
    ) -> Self {
        Self {
            committer,
            clock,
            window,
        }
    }

    /// `Review` -> `Committing` -> `Waiting`, or `Error` if the commit fails.
    #[instrument(skip(self, flow), fields(flow_id = %flow.id))]
    pub async fn begin_commit(
        &self,
        mut flow: RegistrationFlow,
    ) -> Result<RegistrationFlow, FlowError> {
        flow.transition_to(RegistrationFlowState::Committing)?;

        match self.committer.commit(&flow.basket, flow.owner, flow.secret).await {
            Some(commit_tx) => {
                let committed_at = self.clock.now();
                flow.transition_to(RegistrationFlowState::Waiting {
                    commit_tx,
                    committed_at,
                })?;
                info!(tx = %commit_tx, "[registrar] flow waiting for commitments");
            }
            None => flow.fail(FlowFailure::CommitFailed)?,
        }
        Ok(flow)
    }

    /// Checks whether the flow's commitments can be revealed yet.
    ///
    /// The flow stays in `Waiting` unless the lookup fails or a commitment
    /// has expired, in which case it moves to `Error`.
    #[instrument(skip(self, flow), fields(flow_id = %flow.id))]
    pub async fn poll_commitments(
        &self,
        mut flow: RegistrationFlow,
    ) -> Result<(RegistrationFlow, CommitmentReadiness), FlowError> {
        expect_waiting(&flow)?;

        let requests = flow.basket.commitment_requests(flow.owner, flow.secret);
        let mined = match self.committer.check_commitments(&requests).await {
            Ok(mined) => mined,
            Err(e) => {
                warn!(error = %e, "[registrar] commitment lookup failed");
                flow.fail(FlowFailure::CommitmentLookupFailed)?;
                return Ok((flow, CommitmentReadiness::NotFound));
            }
        };

        let readiness = self.window.readiness_all(&mined, self.clock.now());
        if readiness == CommitmentReadiness::Expired {
            warn!("[registrar] commitment expired before reveal");
            flow.fail(FlowFailure::CommitmentExpired)?;
        }
        Ok((flow, readiness))
    }

    /// `Waiting` -> `Registering` -> `Success`, or `Error` if registration fails.
    ///
    /// Does not re-check readiness; a premature reveal is rejected by the
    /// controller and ends in `Error`.
    #[instrument(skip(self, flow), fields(flow_id = %flow.id))]
    pub async fn finish_registration(
        &self,
        mut flow: RegistrationFlow,
    ) -> Result<RegistrationFlow, FlowError> {
        expect_waiting(&flow)?;
        flow.transition_to(RegistrationFlowState::Registering)?;

        let inputs = flow
            .basket
            .registration_inputs(flow.owner, flow.secret, flow.resolver);
        match self.committer.register(&flow.basket, &inputs).await {
            Some(register_tx) => {
                flow.transition_to(RegistrationFlowState::Success { register_tx })?;
                info!(tx = %register_tx, "[registrar] flow complete");
            }
            None => flow.fail(FlowFailure::RegisterFailed)?,
        }
        Ok(flow)
    }
}

fn expect_waiting(flow: &RegistrationFlow) -> Result<(), FlowError> {
    match flow.state {
        RegistrationFlowState::Waiting { .. } => Ok(()),
        other => Err(FlowError::WrongState {
            expected: "Waiting",
            actual: other.name(),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, InMemoryRegistrar};
    use crate::domain::basket::{BasketEntry, RegistrationBasket};
    use crate::domain::value_objects::{Address, Secret};
    use crate::errors::ChainError;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        clock: Arc<FixedClock>,
        registrar: Arc<InMemoryRegistrar>,
        driver: RegistrationFlowDriver<InMemoryRegistrar>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(NOW));
        let registrar = Arc::new(InMemoryRegistrar::new(clock.clone()));
        let committer = Arc::new(RegistrationCommitter::with_buffer_percent(registrar.clone(), 15));
        let driver =
            RegistrationFlowDriver::new(committer, clock.clone(), CommitmentWindow::default());
        Fixture {
            clock,
            registrar,
            driver,
        }
    }

    fn flow() -> RegistrationFlow {
        let basket: RegistrationBasket = [BasketEntry::new("one", 86_400 * 365)]
            .into_iter()
            .collect();
        RegistrationFlow::with_secret(
            basket,
            Address::new([1u8; 20]),
            Address::ZERO,
            Secret::new([5u8; 32]),
        )
    }

    #[tokio::test]
    async fn test_full_flow() {
        let f = fixture();
        let flow = f.driver.begin_commit(flow()).await.unwrap();
        assert!(matches!(
            flow.state,
            RegistrationFlowState::Waiting { committed_at: NOW, .. }
        ));

        let (flow, readiness) = f.driver.poll_commitments(flow).await.unwrap();
        assert_eq!(readiness, CommitmentReadiness::TooEarly { ready_at: NOW + 60 });

        f.clock.advance(60);
        let (flow, readiness) = f.driver.poll_commitments(flow).await.unwrap();
        assert!(readiness.is_ready());

        let flow = f.driver.finish_registration(flow).await.unwrap();
        assert!(matches!(flow.state, RegistrationFlowState::Success { .. }));
        assert!(f.registrar.expiry("one").is_some());
    }

    #[tokio::test]
    async fn test_commit_failure_ends_in_error() {
        let f = fixture();
        f.registrar.fail_writes(Some(ChainError::Unavailable));
        let flow = f.driver.begin_commit(flow()).await.unwrap();
        assert_eq!(
            flow.state,
            RegistrationFlowState::Error {
                failure: FlowFailure::CommitFailed
            }
        );
    }

    #[tokio::test]
    async fn test_premature_reveal_ends_in_error() {
        let f = fixture();
        let flow = f.driver.begin_commit(flow()).await.unwrap();
        let flow = f.driver.finish_registration(flow).await.unwrap();
        assert_eq!(
            flow.state,
            RegistrationFlowState::Error {
                failure: FlowFailure::RegisterFailed
            }
        );
    }

    #[tokio::test]
    async fn test_expired_commitment_ends_in_error() {
        let f = fixture();
        let flow = f.driver.begin_commit(flow()).await.unwrap();
        f.clock.advance(86_400);
        let (flow, readiness) = f.driver.poll_commitments(flow).await.unwrap();
        assert_eq!(readiness, CommitmentReadiness::Expired);
        assert_eq!(
            flow.state,
            RegistrationFlowState::Error {
                failure: FlowFailure::CommitmentExpired
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_ends_in_error() {
        let f = fixture();
        let flow = f.driver.begin_commit(flow()).await.unwrap();
        f.registrar.fail_reads(Some(ChainError::Unavailable));
        let (flow, _) = f.driver.poll_commitments(flow).await.unwrap();
        assert_eq!(
            flow.state,
            RegistrationFlowState::Error {
                failure: FlowFailure::CommitmentLookupFailed
            }
        );
    }

    #[tokio::test]
    async fn test_steps_out_of_order_are_rejected() {
        let f = fixture();
        let err = f.driver.finish_registration(flow()).await.unwrap_err();
        assert_eq!(
            err,
            FlowError::WrongState {
                expected: "Waiting",
                actual: "Review"
            }
        );

        let waiting = f.driver.begin_commit(flow()).await.unwrap();
        assert!(f.driver.begin_commit(waiting).await.is_err());
    }
}
