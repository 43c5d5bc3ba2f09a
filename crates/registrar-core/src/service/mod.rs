//! # Application Services
//!
//! Async orchestration over the outbound ports: the commit-reveal
//! committer, the balance checker, and the flow driver.

pub mod balance;
pub mod committer;
pub mod flow;

pub use balance::BalanceSufficiencyChecker;
pub use committer::{CommitterStats, RegistrationCommitter};
pub use flow::RegistrationFlowDriver;
