//! Dummy Controller
//!
//! Reconciles cluster-scoped `Dummy` resources:
//! - Echoes `spec.forProvider.message` into `status.atProvider.specEcho`
//! - Keeps one nginx Pod per Dummy, owned by it
//! - Mirrors the Pod phase into `status.atProvider.podStatus`

mod backoff;
mod config;
mod controller;
mod error;
mod probes;
mod reconciler;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Dummy Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Pod watch namespace: {}", config.watch_namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Pod namespace for cluster-scoped Dummies: {}", config.pod_namespace);
    info!("  Requeue after Pod creation: {:?}", config.requeue_after);
    info!("  Reconcile timeout: {:?}", config.reconcile_timeout);
    info!("  Backoff: {}s..{}s", config.backoff_min_secs, config.backoff_max_secs);
    info!("  Concurrency: {}, debounce: {:?}", config.concurrency, config.debounce);
    info!("  Probe address: {}", config.probe_addr);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
