//! # Registrar Runtime
//!
//! Runs a commit-reveal registration for the names given on the command line
//! against the in-memory registrar and prints the resulting report as JSON.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG` honoured, default `info`)
//! 2. Load configuration (file, then environment)
//! 3. Load or generate the commitment secret
//! 4. Run the flow and print the report
//!
//! ```text
//! REGISTRAR_MIN_COMMITMENT_AGE=30 registrar-runtime alice bob.eth
//! ```

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use registrar_core::prelude::{SystemClock, TimeSource};
use registrar_runtime::{format_timestamp, load_config, load_secret, run_demo};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Registrar Runtime v{}", registrar_core::VERSION);
    info!("===========================================");

    let config = load_config().context("Failed to load configuration")?;
    let secret = load_secret(|key| std::env::var(key).ok())?;

    let mut names: Vec<String> = std::env::args().skip(1).collect();
    if names.is_empty() {
        names = vec!["example".to_string()];
    }

    let now = SystemClock.now();
    info!("Starting registration at {}", format_timestamp(now));

    let report = run_demo(&config, &names, secret, now)
        .await
        .context("Registration run failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to encode report")?
    );
    Ok(())
}
