//! Dependent Pod factory
//!
//! Builds the Pod a Dummy owns. The Pod carries a controller owner reference
//! back to its Dummy, which lets the API server garbage-collect it when the
//! Dummy is deleted and lets the watcher route Pod events to the owner.

use crate::error::ControllerError;
use cluster_store::ObjectKey;
use crds::Dummy;
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;

/// Name of the single container in a Dummy's Pod.
pub const CONTAINER_NAME: &str = "nginx";

/// Image run by a Dummy's Pod.
pub const CONTAINER_IMAGE: &str = "nginx";

/// Identity of the Pod owned by `owner`.
///
/// Same name as the owner; same namespace, or `default_namespace` when the
/// owner is cluster scoped.
pub fn pod_key(owner: &Dummy, default_namespace: &str) -> Result<ObjectKey, ControllerError> {
    Ok(ObjectKey::of(owner)?.or_namespace(default_namespace))
}

/// Builds the desired Pod for `owner`. Pure, no I/O.
///
/// Fails with `ControllerError::OwnerReference` when the owner lacks the
/// name or uid an owner reference needs.
pub fn build_pod(owner: &Dummy, default_namespace: &str) -> Result<Pod, ControllerError> {
    let key = pod_key(owner, default_namespace)?;
    let owner_ref = owner.controller_owner_ref(&()).ok_or_else(|| {
        ControllerError::OwnerReference(format!(
            "Dummy {} has no uid, cannot own Pod {}",
            key.name, key
        ))
    })?;

    Ok(Pod {
        metadata: ObjectMeta {
            name: Some(key.name),
            namespace: key.namespace,
            owner_references: Some(vec![owner_ref]),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: CONTAINER_NAME.to_string(),
                image: Some(CONTAINER_IMAGE.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Lifecycle phase of `pod`, empty when the API server has not reported one.
pub fn phase(pod: &Pod) -> String {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_dummy;
    use crds::{DUMMY_GROUP, DUMMY_KIND};
    use k8s_openapi::api::core::v1::PodStatus;

    #[test]
    fn test_build_pod_links_owner() {
        let owner = create_test_dummy("dummy-test", "hello");
        let pod = build_pod(&owner, "default").unwrap();

        assert_eq!(pod.metadata.name.as_deref(), Some("dummy-test"));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("default"));

        let refs = pod.metadata.owner_references.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, DUMMY_KIND);
        assert_eq!(refs[0].api_version, format!("{}/v1alpha1", DUMMY_GROUP));
        assert_eq!(refs[0].name, "dummy-test");
        assert_eq!(refs[0].uid, "uid-dummy-test");
        assert_eq!(refs[0].controller, Some(true));
    }

    #[test]
    fn test_build_pod_runs_single_nginx_container() {
        let owner = create_test_dummy("dummy-test", "hello");
        let spec = build_pod(&owner, "default").unwrap().spec.unwrap();

        assert_eq!(spec.containers.len(), 1);
        assert_eq!(spec.containers[0].name, CONTAINER_NAME);
        assert_eq!(spec.containers[0].image.as_deref(), Some(CONTAINER_IMAGE));
    }

    #[test]
    fn test_build_pod_is_deterministic() {
        let owner = create_test_dummy("dummy-test", "hello");
        assert_eq!(
            build_pod(&owner, "default").unwrap(),
            build_pod(&owner, "default").unwrap()
        );
    }

    #[test]
    fn test_build_pod_prefers_owner_namespace() {
        let mut owner = create_test_dummy("dummy-test", "hello");
        owner.metadata.namespace = Some("team-a".to_string());

        let pod = build_pod(&owner, "default").unwrap();
        assert_eq!(pod.metadata.namespace.as_deref(), Some("team-a"));
    }

    #[test]
    fn test_build_pod_without_uid_fails() {
        let mut owner = create_test_dummy("dummy-test", "hello");
        owner.metadata.uid = None;

        let result = build_pod(&owner, "default");
        assert!(matches!(result, Err(ControllerError::OwnerReference(_))));
    }

    #[test]
    fn test_phase() {
        let mut pod = Pod::default();
        assert_eq!(phase(&pod), "");

        pod.status = Some(PodStatus {
            phase: Some("Running".to_string()),
            ..Default::default()
        });
        assert_eq!(phase(&pod), "Running");
    }
}
