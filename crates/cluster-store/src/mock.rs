//! Mock ClusterStore for unit testing
//!
//! In-memory implementation of `ClusterStoreTrait` that behaves like the API
//! server for the handful of operations the controller uses: resource versions
//! are bumped on every write, stale status writes conflict, duplicate creates
//! fail and freshly created Pods start in the `Pending` phase.

use crate::error::StoreError;
use crate::key::ObjectKey;
use crate::store_trait::ClusterStoreTrait;
use crds::Dummy;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A store operation, used for failure injection and call recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `get_dummy`
    GetDummy,
    /// `update_dummy_status`
    UpdateDummyStatus,
    /// `get_pod`
    GetPod,
    /// `create_pod`
    CreatePod,
}

/// Mock cluster store for testing
///
/// Clones share the same underlying state, so a test can keep a handle while
/// the reconciler owns another.
#[derive(Debug, Clone, Default)]
pub struct MockClusterStore {
    dummies: Arc<Mutex<HashMap<String, Dummy>>>,
    pods: Arc<Mutex<HashMap<ObjectKey, Pod>>>,
    failures: Arc<Mutex<HashMap<Operation, String>>>,
    calls: Arc<Mutex<Vec<Operation>>>,
    next_version: Arc<Mutex<u64>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockClusterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_version(&self) -> String {
        let mut v = lock(&self.next_version);
        *v += 1;
        v.to_string()
    }

    fn record(&self, op: Operation) -> Result<(), StoreError> {
        lock(&self.calls).push(op);
        match lock(&self.failures).get(&op) {
            Some(msg) => Err(StoreError::Api(msg.clone())),
            None => Ok(()),
        }
    }

    /// Add a Dummy (for test setup). A uid and resource version are assigned.
    pub fn add_dummy(&self, mut dummy: Dummy) {
        let name = dummy.metadata.name.clone().unwrap_or_default();
        dummy
            .metadata
            .uid
            .get_or_insert_with(|| format!("uid-{}", name));
        self.add_dummy_without_uid(dummy);
    }

    /// Add a Dummy as given, leaving `metadata.uid` untouched
    ///
    /// Lets tests store an object that cannot own anything yet.
    pub fn add_dummy_without_uid(&self, mut dummy: Dummy) {
        let name = dummy.metadata.name.clone().unwrap_or_default();
        dummy.metadata.resource_version = Some(self.bump_version());
        lock(&self.dummies).insert(name, dummy);
    }

    /// Add a Pod (for test setup)
    pub fn add_pod(&self, mut pod: Pod) {
        pod.metadata.resource_version = Some(self.bump_version());
        if let Ok(key) = ObjectKey::of(&pod) {
            lock(&self.pods).insert(key, pod);
        }
    }

    /// Remove a Dummy, as if it was deleted by a user
    pub fn remove_dummy(&self, name: &str) {
        lock(&self.dummies).remove(name);
    }

    /// Current stored copy of a Dummy
    pub fn dummy(&self, name: &str) -> Option<Dummy> {
        lock(&self.dummies).get(name).cloned()
    }

    /// Current stored copy of a Pod
    pub fn pod(&self, key: &ObjectKey) -> Option<Pod> {
        lock(&self.pods).get(key).cloned()
    }

    /// Number of Pods in the store
    pub fn pod_count(&self) -> usize {
        lock(&self.pods).len()
    }

    /// Set the phase of a stored Pod, as the kubelet would
    pub fn set_pod_phase(&self, key: &ObjectKey, phase: &str) {
        if let Some(pod) = lock(&self.pods).get_mut(key) {
            pod.status.get_or_insert_with(PodStatus::default).phase = Some(phase.to_string());
        }
    }

    /// Make every call to `op` fail with `message` until cleared
    pub fn fail_on(&self, op: Operation, message: impl Into<String>) {
        lock(&self.failures).insert(op, message.into());
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Operations invoked so far, in order
    pub fn calls(&self) -> Vec<Operation> {
        lock(&self.calls).clone()
    }

    /// Number of times `op` was invoked
    pub fn call_count(&self, op: Operation) -> usize {
        lock(&self.calls).iter().filter(|c| **c == op).count()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait::async_trait]
impl ClusterStoreTrait for MockClusterStore {
    async fn get_dummy(&self, key: &ObjectKey) -> Result<Option<Dummy>, StoreError> {
        self.record(Operation::GetDummy)?;
        Ok(lock(&self.dummies).get(&key.name).cloned())
    }

    async fn update_dummy_status(&self, dummy: &Dummy) -> Result<Dummy, StoreError> {
        self.record(Operation::UpdateDummyStatus)?;
        let key = ObjectKey::of(dummy)?;
        let version = self.bump_version();
        let mut dummies = lock(&self.dummies);
        let stored = dummies
            .get_mut(&key.name)
            .ok_or_else(|| StoreError::Api(format!("dummies \"{}\" not found", key.name)))?;

        if let Some(rv) = &dummy.metadata.resource_version {
            if stored.metadata.resource_version.as_ref() != Some(rv) {
                return Err(StoreError::Api(format!(
                    "Operation cannot be fulfilled on dummies \"{}\": the object has been modified",
                    key.name
                )));
            }
        }

        stored.status = dummy.status.clone();
        stored.metadata.resource_version = Some(version);
        Ok(stored.clone())
    }

    async fn get_pod(&self, key: &ObjectKey) -> Result<Option<Pod>, StoreError> {
        self.record(Operation::GetPod)?;
        if key.namespace.is_none() {
            return Err(StoreError::InvalidObject("Pod requires a namespace".to_string()));
        }
        Ok(lock(&self.pods).get(key).cloned())
    }

    async fn create_pod(&self, pod: &Pod) -> Result<Pod, StoreError> {
        self.record(Operation::CreatePod)?;
        let key = ObjectKey::of(pod)?;
        if key.namespace.is_none() {
            return Err(StoreError::InvalidObject("Pod requires a namespace".to_string()));
        }
        let version = self.bump_version();
        let mut pods = lock(&self.pods);
        if pods.contains_key(&key) {
            return Err(StoreError::Api(format!("pods \"{}\" already exists", key.name)));
        }

        let mut created = pod.clone();
        created.metadata.uid = Some(format!("uid-pod-{}", key.name));
        created.metadata.resource_version = Some(version);
        created
            .status
            .get_or_insert_with(PodStatus::default)
            .phase
            .get_or_insert_with(|| "Pending".to_string());
        pods.insert(key, created.clone());
        Ok(created)
    }
}
