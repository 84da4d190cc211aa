//! Cluster store errors

use thiserror::Error;

/// Errors that can occur when talking to the cluster state store.
///
/// A missing object is not represented here; lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API request/response error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// The store rejected the request (conflict, already exists, unavailable)
    #[error("Store API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The object is missing fields the store needs to address it
    #[error("Invalid object: {0}")]
    InvalidObject(String),
}
