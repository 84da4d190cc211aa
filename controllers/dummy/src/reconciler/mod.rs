//! Reconciliation logic for Dummy CRDs.
//!
//! One pass fetches the Dummy, echoes its message into status, makes sure
//! its Pod exists and mirrors the Pod phase into status. Every pass reads
//! fresh state and rewrites status unconditionally, so repeating a pass is
//! always safe.

pub mod pod;

use crate::error::ControllerError;
use cluster_store::{ClusterStoreTrait, ObjectKey};
use tracing::{error, info};

/// What the scheduling layer should do after a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Converged; wait for the next change event
    Done,
    /// Run again shortly, independent of new events
    Requeue,
}

/// Reconciles Dummy resources.
///
/// Holds no state between passes besides its store handle, so one instance
/// can serve any number of Dummies concurrently.
pub struct Reconciler {
    store: Box<dyn ClusterStoreTrait>,
    pod_namespace: String,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("pod_namespace", &self.pod_namespace)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    ///
    /// `pod_namespace` is where Pods of cluster-scoped Dummies are created.
    pub fn new(store: impl ClusterStoreTrait + 'static, pod_namespace: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            pod_namespace: pod_namespace.into(),
        }
    }

    /// Reconciles the Dummy identified by `key`.
    ///
    /// This method:
    /// 1. Fetches the Dummy; a missing Dummy was deleted and needs nothing
    /// 2. Writes `status.atProvider.specEcho` from the fetched spec
    /// 3. Fetches the Pod, creating it when missing
    /// 4. Writes the Pod phase into `status.atProvider.podStatus`
    ///
    /// A newly created Pod yields `ReconcileOutcome::Requeue` so its phase is
    /// looked at again soon. Store errors are returned unchanged; retrying is
    /// up to the caller.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError> {
        let Some(mut dummy) = self.store.get_dummy(key).await.map_err(|e| {
            error!("Failed to fetch Dummy {}: {}", key, e);
            e
        })?
        else {
            info!("Dummy {} not found, nothing to reconcile", key);
            return Ok(ReconcileOutcome::Done);
        };

        info!("Processing Dummy {} with message {:?}", key, dummy.message());

        // Echo goes out before the Pod is touched, so it is correct even if
        // the rest of the pass fails.
        let message = dummy.message().to_string();
        dummy.observation_mut().spec_echo = message;
        let mut dummy = self.store.update_dummy_status(&dummy).await?;

        let pod_key = pod::pod_key(&dummy, &self.pod_namespace)?;
        match self.store.get_pod(&pod_key).await? {
            None => {
                info!("Creating Pod {}", pod_key);
                let desired = pod::build_pod(&dummy, &self.pod_namespace)?;
                let created = self.store.create_pod(&desired).await?;

                dummy.observation_mut().pod_status = pod::phase(&created);
                self.store.update_dummy_status(&dummy).await?;

                Ok(ReconcileOutcome::Requeue)
            }
            Some(existing) => {
                let phase = pod::phase(&existing);
                info!("Pod {} fetched successfully, phase {:?}", pod_key, phase);

                dummy.observation_mut().pod_status = phase;
                self.store.update_dummy_status(&dummy).await?;

                Ok(ReconcileOutcome::Done)
            }
        }
    }
}
