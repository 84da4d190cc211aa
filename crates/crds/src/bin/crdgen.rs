//! Prints the Dummy CustomResourceDefinition as YAML.
//!
//! ```text
//! cargo run -p crds --bin crdgen > config/crd/dummies.yaml
//! ```

use crds::Dummy;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Dummy::crd())?);
    Ok(())
}
