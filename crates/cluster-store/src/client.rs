//! Kubernetes-backed cluster store
//!
//! Implements `ClusterStoreTrait` on top of `kube::Api`.

use crate::error::StoreError;
use crate::key::ObjectKey;
use crate::store_trait::ClusterStoreTrait;
use crds::Dummy;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client};
use tracing::debug;

/// Cluster store backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeClusterStore {
    client: Client,
}

impl std::fmt::Debug for KubeClusterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterStore").finish_non_exhaustive()
    }
}

impl KubeClusterStore {
    /// Create a new store from an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn dummies(&self) -> Api<Dummy> {
        Api::all(self.client.clone())
    }

    fn pods(&self, namespace: Option<&str>) -> Result<Api<Pod>, StoreError> {
        let ns = namespace
            .ok_or_else(|| StoreError::InvalidObject("Pod requires a namespace".to_string()))?;
        Ok(Api::namespaced(self.client.clone(), ns))
    }
}

/// Builds the merge patch for a Dummy status write.
///
/// Every observation field is sent explicitly, including empty strings, so a
/// cleared value overwrites the stored one instead of being skipped by the merge.
/// `resourceVersion` is carried along to make the write conditional.
pub(crate) fn status_patch(dummy: &Dummy) -> serde_json::Value {
    let obs = dummy.observation();
    let mut patch = serde_json::json!({
        "status": {
            "atProvider": {
                "specEcho": obs.spec_echo,
                "podStatus": obs.pod_status,
                "message": obs.message,
            }
        }
    });
    if let Some(rv) = &dummy.metadata.resource_version {
        patch["metadata"] = serde_json::json!({ "resourceVersion": rv });
    }
    patch
}

#[async_trait::async_trait]
impl ClusterStoreTrait for KubeClusterStore {
    async fn get_dummy(&self, key: &ObjectKey) -> Result<Option<Dummy>, StoreError> {
        debug!("Fetching Dummy {}", key.name);
        Ok(self.dummies().get_opt(&key.name).await?)
    }

    async fn update_dummy_status(&self, dummy: &Dummy) -> Result<Dummy, StoreError> {
        let key = ObjectKey::of(dummy)?;
        debug!("Updating Dummy {} status", key.name);
        let patch = status_patch(dummy);
        Ok(self
            .dummies()
            .patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?)
    }

    async fn get_pod(&self, key: &ObjectKey) -> Result<Option<Pod>, StoreError> {
        debug!("Fetching Pod {}", key);
        Ok(self
            .pods(key.namespace.as_deref())?
            .get_opt(&key.name)
            .await?)
    }

    async fn create_pod(&self, pod: &Pod) -> Result<Pod, StoreError> {
        let key = ObjectKey::of(pod)?;
        debug!("Creating Pod {}", key);
        Ok(self
            .pods(key.namespace.as_deref())?
            .create(&PostParams::default(), pod)
            .await?)
    }
}
