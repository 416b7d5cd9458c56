//! POS Sync - one sales sync run per invocation.
//!
//! Runs must not overlap; schedule the binary so that one invocation ends
//! before the next starts.

use anyhow::Context;
use possync_app::utils::logging::{error_label, init_tracing, log_run_report};
use possync_app::AppContext;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging first so .env loading is visible
    init_tracing()?;

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    let context = AppContext::new()
        .inspect_err(|err| {
            error!(kind = error_label(err), error = %err, "failed to initialize");
        })
        .context("failed to initialize possync")?;

    let report = context.run_once().await;
    log_run_report(&report);

    Ok(())
}
