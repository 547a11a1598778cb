//! opbot - channel operator bot
//!
//! Usage: `opbot <policy.json>`

use std::sync::Arc;

use anyhow::Context;
use opbot::PolicyService;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
fn spawn_reload_on_hangup(service: Arc<PolicyService>) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading policy");
            match service.reload() {
                Ok(report) => info!(warnings = report.warnings.len(), "Policy reloaded"),
                Err(e) => {
                    for message in e.messages() {
                        error!(code = e.error_code(), "{}", message);
                    }
                    warn!("Policy reload failed, keeping current policy");
                }
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_reload_on_hangup(_service: Arc<PolicyService>) -> anyhow::Result<()> {
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let Some(policy_path) = std::env::args().nth(1) else {
        anyhow::bail!("usage: opbot <policy.json>");
    };

    let service = PolicyService::open(&policy_path).map_err(|e| {
        for message in e.messages() {
            error!(path = %policy_path, code = e.error_code(), "{}", message);
        }
        e
    })?;
    let service = Arc::new(service);

    info!(path = %policy_path, "Starting opbot");
    spawn_reload_on_hangup(Arc::clone(&service))?;

    tokio::select! {
        result = opbot::network::run(Arc::clone(&service)) => {
            result.context("bot stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
