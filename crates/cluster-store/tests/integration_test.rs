//! Integration tests for the Kubernetes-backed store
//!
//! These tests require a reachable cluster (current kubeconfig context) with
//! the Dummy CRD installed (`cargo run -p crds --bin crdgen | kubectl apply -f -`).

use cluster_store::{ClusterStoreTrait, KubeClusterStore, ObjectKey};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

async fn store() -> KubeClusterStore {
    let client = kube::Client::try_default()
        .await
        .expect("Failed to create Kubernetes client");
    KubeClusterStore::new(client)
}

#[tokio::test]
#[ignore] // Requires running cluster
async fn test_missing_dummy_is_none() {
    let store = store().await;

    let dummy = store
        .get_dummy(&ObjectKey::cluster("does-not-exist-7f3a"))
        .await
        .expect("Failed to query Dummy");

    assert!(dummy.is_none());
}

#[tokio::test]
#[ignore] // Requires running cluster
async fn test_missing_pod_is_none() {
    let store = store().await;

    let pod = store
        .get_pod(&ObjectKey::namespaced("default", "does-not-exist-7f3a"))
        .await
        .expect("Failed to query Pod");

    assert!(pod.is_none());
}

#[tokio::test]
#[ignore]
async fn test_create_and_get_pod() {
    let store = store().await;
    let key = ObjectKey::namespaced("default", "cluster-store-it");

    let pod = Pod {
        metadata: ObjectMeta {
            name: Some(key.name.clone()),
            namespace: key.namespace.clone(),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "nginx".to_string(),
                image: Some("nginx".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    };

    if store.get_pod(&key).await.expect("Failed to query Pod").is_none() {
        store.create_pod(&pod).await.expect("Failed to create Pod");
    }

    let fetched = store.get_pod(&key).await.expect("Failed to query Pod");
    assert!(fetched.is_some());

    // Clean up
    let pods: kube::Api<Pod> = kube::Api::namespaced(
        kube::Client::try_default().await.expect("client"),
        "default",
    );
    let _ = pods.delete(&key.name, &Default::default()).await;
}
