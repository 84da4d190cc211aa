//! Object identity

use crate::error::StoreError;
use kube::Resource;
use std::fmt;

/// Identity of a single object in the cluster: an optional namespace plus a name.
///
/// Cluster-scoped objects carry no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Namespace, `None` for cluster-scoped objects
    pub namespace: Option<String>,
    /// Object name
    pub name: String,
}

impl ObjectKey {
    /// Identity of a cluster-scoped object.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// Identity of a namespaced object.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Identity of an existing object, read from its metadata.
    pub fn of<K: Resource>(obj: &K) -> Result<Self, StoreError> {
        let meta = obj.meta();
        let name = meta
            .name
            .clone()
            .ok_or_else(|| StoreError::InvalidObject("object has no metadata.name".to_string()))?;
        Ok(Self {
            namespace: meta.namespace.clone(),
            name,
        })
    }

    /// Same name, with the namespace filled in when this key has none.
    #[must_use]
    pub fn or_namespace(&self, namespace: &str) -> Self {
        Self {
            namespace: Some(
                self.namespace
                    .clone()
                    .unwrap_or_else(|| namespace.to_string()),
            ),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Pod;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_display() {
        assert_eq!(ObjectKey::cluster("a").to_string(), "a");
        assert_eq!(ObjectKey::namespaced("ns", "a").to_string(), "ns/a");
    }

    #[test]
    fn test_or_namespace_keeps_existing_namespace() {
        assert_eq!(
            ObjectKey::namespaced("ns", "a").or_namespace("default"),
            ObjectKey::namespaced("ns", "a")
        );
        assert_eq!(
            ObjectKey::cluster("a").or_namespace("default"),
            ObjectKey::namespaced("default", "a")
        );
    }

    #[test]
    fn test_of_requires_name() {
        let pod = Pod::default();
        assert!(matches!(ObjectKey::of(&pod), Err(StoreError::InvalidObject(_))));

        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("p".to_string()),
                namespace: Some("ns".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ObjectKey::of(&pod).unwrap(), ObjectKey::namespaced("ns", "p"));
    }
}
