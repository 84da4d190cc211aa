//! Cluster State Access
//!
//! Typed get/create/update-status operations against the Kubernetes API for
//! the resources the Dummy controller touches.
//!
//! # Example
//!
//! ```no_run
//! use cluster_store::{ClusterStoreTrait, KubeClusterStore, ObjectKey};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = KubeClusterStore::new(kube::Client::try_default().await?);
//!
//! match store.get_dummy(&ObjectKey::cluster("my-dummy")).await? {
//!     Some(dummy) => println!("message: {}", dummy.message()),
//!     None => println!("gone"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Not-found is never an error here: the get operations return `Ok(None)`,
//! which lets callers tell a missing object apart from a failing API server.

pub mod client;
pub mod error;
pub mod key;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::KubeClusterStore;
pub use error::StoreError;
pub use key::ObjectKey;
pub use store_trait::ClusterStoreTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockClusterStore, Operation};
