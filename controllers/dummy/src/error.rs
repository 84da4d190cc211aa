//! Controller-specific error types.
//!
//! This module defines error types specific to the Dummy Controller
//! that are not covered by upstream library errors.

use cluster_store::StoreError;
use kube::Error as KubeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the Dummy Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Cluster store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Kubernetes client setup error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Owner reference could not be built for a dependent.
    ///
    /// This points at a malformed owner (no name or uid), so retrying the same
    /// object will not help until the object itself changes.
    #[error("Owner reference error: {0}")]
    OwnerReference(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reconciliation did not finish before its deadline
    #[error("Reconciliation timed out after {0:?}")]
    Timeout(Duration),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Probe server failed
    #[error("Probe server failed: {0}")]
    Probe(String),
}

impl ControllerError {
    /// Whether re-running the same reconciliation may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ControllerError::OwnerReference(_) | ControllerError::InvalidConfig(_)
        )
    }
}
