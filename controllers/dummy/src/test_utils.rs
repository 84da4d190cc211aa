//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::reconciler::Reconciler;
use cluster_store::{MockClusterStore, ObjectKey};
use crds::{Dummy, DummyParameters, DummySpec};
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;

/// Namespace Pods of cluster-scoped Dummies land in during tests
pub const TEST_POD_NAMESPACE: &str = "default";

/// Helper to create a test Dummy with a uid, ready to own a Pod
pub fn create_test_dummy(name: &str, message: &str) -> Dummy {
    Dummy {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            uid: Some(format!("uid-{}", name)),
            ..Default::default()
        },
        spec: DummySpec {
            for_provider: DummyParameters {
                message: message.to_string(),
            },
        },
        status: None,
    }
}

/// Helper to create a test Pod owned by `owner` in the given phase
pub fn create_test_pod(owner: &Dummy, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: owner.metadata.name.clone(),
            namespace: Some(TEST_POD_NAMESPACE.to_string()),
            owner_references: owner.controller_owner_ref(&()).map(|r| vec![r]),
            ..Default::default()
        },
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Key of the Pod belonging to the Dummy called `name`
pub fn pod_key(name: &str) -> ObjectKey {
    ObjectKey::namespaced(TEST_POD_NAMESPACE, name)
}

/// Helper to create a reconciler sharing state with `store`
pub fn create_test_reconciler(store: &MockClusterStore) -> Reconciler {
    Reconciler::new(store.clone(), TEST_POD_NAMESPACE)
}
