//! # Registrar Runtime
//!
//! Configuration loading and the demo registration run used by the
//! `registrar-runtime` binary.
//!
//! ## Configuration Sources
//!
//! Applied in order, later sources winning:
//!
//! 1. `RegistrarConfig::default()` (mainnet contracts, 15% buffer, 60s/24h window)
//! 2. JSON file named by `REGISTRAR_CONFIG`
//! 3. Individual `REGISTRAR_*` environment variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `REGISTRAR_PRICE_BUFFER_PERCENT` | `pricing.buffer_percent` |
//! | `REGISTRAR_MIN_COMMITMENT_AGE` | `commitments.min_age_secs` |
//! | `REGISTRAR_MAX_COMMITMENT_AGE` | `commitments.max_age_secs` |
//! | `REGISTRAR_CONTROLLER` | `contracts.controller` |
//! | `REGISTRAR_SECRET` | commitment secret (32 bytes hex) |

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use registrar_core::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_VAR: &str = "REGISTRAR_CONFIG";

/// Environment variable holding a hex-encoded commitment secret.
pub const SECRET_VAR: &str = "REGISTRAR_SECRET";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Loads configuration from the process environment.
pub fn load_config() -> Result<RegistrarConfig> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Loads configuration using `lookup` in place of the environment.
pub fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<RegistrarConfig> {
    let mut config = match lookup(CONFIG_PATH_VAR) {
        Some(path) => read_config_file(Path::new(&path))?,
        None => RegistrarConfig::default(),
    };

    if let Some(value) = lookup("REGISTRAR_PRICE_BUFFER_PERCENT") {
        config.pricing.buffer_percent = value
            .parse()
            .context("REGISTRAR_PRICE_BUFFER_PERCENT must be an integer")?;
    }
    if let Some(value) = lookup("REGISTRAR_MIN_COMMITMENT_AGE") {
        config.commitments.min_age_secs = value
            .parse()
            .context("REGISTRAR_MIN_COMMITMENT_AGE must be seconds")?;
    }
    if let Some(value) = lookup("REGISTRAR_MAX_COMMITMENT_AGE") {
        config.commitments.max_age_secs = value
            .parse()
            .context("REGISTRAR_MAX_COMMITMENT_AGE must be seconds")?;
    }
    if let Some(value) = lookup("REGISTRAR_CONTROLLER") {
        config.contracts.controller = value;
    }

    config.validate().context("invalid registrar configuration")?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<RegistrarConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    info!("Loaded registrar config from {}", path.display());
    Ok(config)
}

/// Reads the commitment secret from `REGISTRAR_SECRET`, or generates one.
pub fn load_secret(lookup: impl Fn(&str) -> Option<String>) -> Result<Secret> {
    let Some(secret_hex) = lookup(SECRET_VAR) else {
        return Ok(Secret::random());
    };

    let secret = secret_hex
        .parse::<Secret>()
        .context("REGISTRAR_SECRET must be 32 bytes of hex")?;
    info!("Loaded commitment secret from environment");
    Ok(secret)
}

/// Formats epoch seconds as a UTC date for display.
#[must_use]
pub fn format_timestamp(t: UnixSeconds) -> String {
    DateTime::from_timestamp(t, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| t.to_string())
}

// =============================================================================
// DEMO RUN
// =============================================================================

/// Outcome of [`run_demo`].
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    /// Flow correlation id.
    pub flow_id: Uuid,
    /// Controller the registration was sent to.
    pub controller: String,
    /// Names registered.
    pub names: Vec<String>,
    /// Buffered rent estimate in wei.
    pub estimate: U256,
    /// Whether the owner's balance covered the estimate.
    pub balance_sufficient: bool,
    /// Final flow state.
    pub state: RegistrationFlowState,
    /// Expiry read back from the registrar, in name order.
    pub expiries: Vec<UnixSeconds>,
}

/// Runs one commit-reveal registration against an in-memory registrar.
///
/// The clock starts at `start` and is advanced past the minimum commitment
/// age instead of sleeping.
pub async fn run_demo(
    config: &RegistrarConfig,
    names: &[String],
    secret: Secret,
    start: UnixSeconds,
) -> Result<DemoReport> {
    if names.is_empty() {
        bail!("no names to register");
    }

    let controller = config
        .contracts
        .controller_address()
        .context("invalid controller address")?;
    info!("Registering through controller {controller:?}");

    let clock = Arc::new(FixedClock::new(start));
    let registrar = Arc::new(
        InMemoryRegistrar::new(clock.clone()).with_commitment_window(config.commitment_window()),
    );
    let committer = Arc::new(RegistrationCommitter::new(registrar.clone(), config));
    let driver =
        RegistrationFlowDriver::new(committer.clone(), clock.clone(), config.commitment_window());

    let owner = Address::new([0x42; 20]);
    registrar.set_balances(
        owner,
        WalletBalances {
            native: U256::exp10(18),
            wrapped: U256::zero(),
        },
    );

    let basket: RegistrationBasket = names
        .iter()
        .map(|name| BasketEntry::new(name.as_str(), 365 * 86_400))
        .collect();

    let estimate = committer
        .estimate_price(&basket)
        .await
        .context("price estimate failed")?
        .unwrap_or_default();
    info!(estimate = %estimate, "Estimated rent for {} name(s)", basket.len());

    let checkout = CheckoutBasket::new(
        basket
            .iter()
            .map(|entry| CheckoutItem::registration(entry.name.as_str(), entry.duration_secs))
            .collect(),
    );
    let checker = BalanceSufficiencyChecker::new(committer.clone(), config.balance.clone());
    let balance_sufficient = checker
        .is_balance_sufficient(CheckoutKind::Registration, &checkout, owner)
        .await;
    if !balance_sufficient {
        warn!("Owner balance does not cover the estimate; the reveal will be rejected");
    }

    let flow = RegistrationFlow::with_secret(basket, owner, Address::ZERO, secret);
    let flow_id = flow.id;
    let mut flow = driver.begin_commit(flow).await?;

    if !flow.state.is_terminal() {
        let (polled, readiness) = driver.poll_commitments(flow).await?;
        flow = polled;
        if let CommitmentReadiness::TooEarly { ready_at } = readiness {
            info!("Commitments ready at {}", format_timestamp(ready_at));
            clock.set(ready_at);
            flow = driver.poll_commitments(flow).await?.0;
        }
    }
    if !flow.state.is_terminal() {
        flow = driver.finish_registration(flow).await?;
    }

    let expiries = committer
        .check_on_chain_expirations(names)
        .await
        .context("expiry lookup failed")?;
    for (name, expiry) in names.iter().zip(&expiries) {
        info!("{name}: expires {}", format_timestamp(*expiry));
    }

    Ok(DemoReport {
        flow_id,
        controller: format!("{controller:?}"),
        names: names.to_vec(),
        estimate,
        balance_sufficient,
        state: flow.state,
        expiries,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load_config_from(env(&[])).unwrap();
        assert_eq!(config, RegistrarConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = load_config_from(env(&[
            ("REGISTRAR_PRICE_BUFFER_PERCENT", "20"),
            ("REGISTRAR_MIN_COMMITMENT_AGE", "10"),
            ("REGISTRAR_MAX_COMMITMENT_AGE", "3600"),
        ]))
        .unwrap();
        assert_eq!(config.pricing.buffer_percent, 20);
        assert_eq!(config.commitments.min_age_secs, 10);
        assert_eq!(config.commitments.max_age_secs, 3600);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        assert!(load_config_from(env(&[("REGISTRAR_MIN_COMMITMENT_AGE", "soon")])).is_err());
        assert!(load_config_from(env(&[("REGISTRAR_CONTROLLER", "0x1234")])).is_err());
        assert!(load_config_from(env(&[("REGISTRAR_PRICE_BUFFER_PERCENT", "250")])).is_err());
    }

    #[test]
    fn test_config_file_then_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pricing": {{"buffer_percent": 5}}, "commitments": {{"min_age_secs": 30}}}}"#)
            .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = load_config_from(env(&[
            (CONFIG_PATH_VAR, path.as_str()),
            ("REGISTRAR_PRICE_BUFFER_PERCENT", "7"),
        ]))
        .unwrap();
        assert_eq!(config.pricing.buffer_percent, 7);
        assert_eq!(config.commitments.min_age_secs, 30);
        assert_eq!(config.commitments.max_age_secs, 86_400);
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config_from(env(&[(CONFIG_PATH_VAR, "/nonexistent/registrar.json")]))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_load_secret() {
        let hex_secret = "ab".repeat(32);
        let secret = load_secret(env(&[(SECRET_VAR, hex_secret.as_str())])).unwrap();
        assert_eq!(secret.as_bytes(), &[0xAB; 32]);

        assert!(load_secret(env(&[(SECRET_VAR, "abcd")])).is_err());
        assert!(load_secret(env(&[(SECRET_VAR, "zz")])).is_err());
        assert!(load_secret(env(&[])).is_ok());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[tokio::test]
    async fn test_demo_registers_every_name() {
        let names = vec!["alice".to_string(), "bob.eth".to_string()];
        let start = 1_700_000_000;
        let report = run_demo(
            &RegistrarConfig::default(),
            &names,
            Secret::new([1; 32]),
            start,
        )
        .await
        .unwrap();

        assert!(matches!(report.state, RegistrationFlowState::Success { .. }));
        assert!(report.balance_sufficient);
        assert_eq!(report.controller, "0x253553366da8546fc250f225fe3d25d0c782303b");
        let expected = start + 60 + 365 * 86_400;
        assert_eq!(report.expiries, vec![expected, expected]);
        assert!(serde_json::to_string(&report).is_ok());
    }

    #[tokio::test]
    async fn test_demo_requires_names() {
        let result = run_demo(&RegistrarConfig::default(), &[], Secret::new([1; 32]), 0).await;
        assert!(result.is_err());
    }
}
