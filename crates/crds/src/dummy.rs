//! Dummy CRD
//!
//! Declares a free-form message and reports what the controller observed
//! about the Pod it runs on the Dummy's behalf.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the Dummy resource.
pub const DUMMY_GROUP: &str = "interview.interview.com";

/// Kind of the Dummy resource.
pub const DUMMY_KIND: &str = "Dummy";

/// Spec of a Dummy: the parameters the controller acts on.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "interview.interview.com",
    version = "v1alpha1",
    kind = "Dummy",
    plural = "dummies",
    status = "DummyStatus",
    category = "crossplane",
    category = "managed",
    printcolumn = r#"{"name":"Echo","type":"string","jsonPath":".status.atProvider.specEcho"}"#,
    printcolumn = r#"{"name":"Pod","type":"string","jsonPath":".status.atProvider.podStatus"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DummySpec {
    /// Desired state handed to the provider
    pub for_provider: DummyParameters,
}

/// Desired state of a Dummy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DummyParameters {
    /// Free-form message, echoed back into status
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Status subresource of a Dummy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DummyStatus {
    /// Observed state reported by the controller
    #[serde(default)]
    pub at_provider: DummyObservation,
}

/// Observed state of a Dummy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DummyObservation {
    /// Copy of `spec.forProvider.message` as last seen by the controller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spec_echo: String,

    /// Phase of the Pod owned by this Dummy
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pod_status: String,

    /// Reserved
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Dummy {
    /// The desired message, empty when unset.
    pub fn message(&self) -> &str {
        &self.spec.for_provider.message
    }

    /// Observed state, or the empty observation when no status was written yet.
    pub fn observation(&self) -> DummyObservation {
        self.status
            .as_ref()
            .map(|s| s.at_provider.clone())
            .unwrap_or_default()
    }

    /// Mutable access to the observed state, creating an empty status if needed.
    pub fn observation_mut(&mut self) -> &mut DummyObservation {
        &mut self.status.get_or_insert_with(DummyStatus::default).at_provider
    }
}
