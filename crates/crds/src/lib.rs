//! Dummy CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the Dummy controller.

pub mod dummy;

pub use dummy::*;
