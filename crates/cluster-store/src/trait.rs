//! ClusterStoreTrait for mocking
//!
//! This trait abstracts the cluster API so the reconciler can be unit tested
//! against an in-memory store. `KubeClusterStore` is the production implementation.

use crate::error::StoreError;
use crate::key::ObjectKey;
use crds::Dummy;
use k8s_openapi::api::core::v1::Pod;

/// Typed access to the cluster state store.
///
/// Every call commits independently; no call holds a lock across another.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterStoreTrait: Send + Sync {
    /// Fetch a Dummy. `Dummy` is cluster scoped, so the namespace of `key` is ignored.
    async fn get_dummy(&self, key: &ObjectKey) -> Result<Option<Dummy>, StoreError>;

    /// Write the status subresource of `dummy` and return the stored object.
    ///
    /// The write is conditional on `metadata.resourceVersion` when it is set,
    /// so a stale copy fails with a conflict instead of overwriting newer state.
    async fn update_dummy_status(&self, dummy: &Dummy) -> Result<Dummy, StoreError>;

    /// Fetch a Pod. `key` must carry a namespace.
    async fn get_pod(&self, key: &ObjectKey) -> Result<Option<Pod>, StoreError>;

    /// Create a Pod and return it as stored.
    async fn create_pod(&self, pod: &Pod) -> Result<Pod, StoreError>;
}
