//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the cluster store,
//! reconciler and watcher together and runs them next to the probe server.

use crate::backoff::BackoffTracker;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::probes::{self, Metrics};
use crate::reconciler::Reconciler;
use crate::watcher::{Context, Watcher};
use cluster_store::KubeClusterStore;
use crds::Dummy;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for Dummy resources.
#[derive(Debug)]
pub struct Controller {
    dummy_watcher: JoinHandle<Result<(), ControllerError>>,
    probe_server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its background tasks.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Dummy Controller");

        let kube_client = Client::try_default().await?;

        // Dummy is cluster scoped; Pods may be restricted to one namespace
        let dummy_api: Api<Dummy> = Api::all(kube_client.clone());
        let pod_api: Api<Pod> = match config.watch_namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };

        let store = KubeClusterStore::new(kube_client);
        let reconciler = Reconciler::new(store, config.pod_namespace.clone());
        let metrics = Arc::new(Metrics::new()?);

        let context = Arc::new(Context::new(
            reconciler,
            BackoffTracker::new(config.backoff_min_secs, config.backoff_max_secs),
            Arc::clone(&metrics),
            config.requeue_after,
            config.reconcile_timeout,
        ));

        let watcher_instance = Watcher::new(
            context,
            dummy_api,
            pod_api,
            config.concurrency,
            config.debounce,
        );

        let dummy_watcher = tokio::spawn(async move { watcher_instance.watch_dummies().await });

        let probe_addr = config.probe_addr;
        let probe_server = tokio::spawn(async move { probes::serve(probe_addr, metrics).await });

        Ok(Self {
            dummy_watcher,
            probe_server,
        })
    }

    /// Runs the controller until shutdown.
    ///
    /// Returns once the watcher stops after a shutdown signal, or with an
    /// error if either task fails.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Dummy Controller running");

        tokio::select! {
            result = &mut self.dummy_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Dummy watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("Dummy watcher error: {}", e)))?;
            }
            result = &mut self.probe_server => {
                result.map_err(|e| ControllerError::Probe(format!("Probe server panicked: {}", e)))??;
            }
        }

        self.probe_server.abort();
        info!("Dummy Controller stopped");
        Ok(())
    }
}
