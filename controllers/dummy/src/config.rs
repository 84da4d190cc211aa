//! Controller configuration loaded from environment variables.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings for the Dummy Controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch Pods in, `None` for all namespaces
    pub watch_namespace: Option<String>,
    /// Namespace for Pods whose owning Dummy is cluster scoped
    pub pod_namespace: String,
    /// Delay before re-examining a Dummy after its Pod was created
    pub requeue_after: Duration,
    /// Deadline for a single reconciliation
    pub reconcile_timeout: Duration,
    /// First error backoff, in seconds
    pub backoff_min_secs: u64,
    /// Error backoff cap, in seconds
    pub backoff_max_secs: u64,
    /// Maximum number of Dummies reconciled in parallel
    pub concurrency: u16,
    /// Quiet period after an event before reconciling
    pub debounce: Duration,
    /// Listen address for health probes and metrics
    pub probe_addr: SocketAddr,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            pod_namespace: "default".to_string(),
            requeue_after: Duration::from_secs(5),
            reconcile_timeout: Duration::from_secs(30),
            backoff_min_secs: 1,
            backoff_max_secs: 300,
            concurrency: 4,
            debounce: Duration::from_millis(1000),
            probe_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ControllerError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| {
            ControllerError::InvalidConfig(format!("{} has invalid value {:?}", key, raw))
        }),
        _ => Ok(default),
    }
}

impl ControllerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let defaults = Self::default();

        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());
        // Pods must land where the Pod watch can see them
        let pod_namespace = lookup("DUMMY_POD_NAMESPACE")
            .filter(|ns| !ns.is_empty())
            .or_else(|| watch_namespace.clone())
            .unwrap_or(defaults.pod_namespace);

        let config = Self {
            watch_namespace,
            pod_namespace,
            requeue_after: Duration::from_secs(parse(
                &lookup,
                "REQUEUE_AFTER_SECS",
                defaults.requeue_after.as_secs(),
            )?),
            reconcile_timeout: Duration::from_secs(parse(
                &lookup,
                "RECONCILE_TIMEOUT_SECS",
                defaults.reconcile_timeout.as_secs(),
            )?),
            backoff_min_secs: parse(&lookup, "BACKOFF_MIN_SECS", defaults.backoff_min_secs)?,
            backoff_max_secs: parse(&lookup, "BACKOFF_MAX_SECS", defaults.backoff_max_secs)?,
            concurrency: parse(&lookup, "CONTROLLER_CONCURRENCY", defaults.concurrency)?,
            debounce: Duration::from_millis(parse(
                &lookup,
                "CONTROLLER_DEBOUNCE_MILLIS",
                u64::try_from(defaults.debounce.as_millis()).unwrap_or(1000),
            )?),
            probe_addr: parse(&lookup, "PROBE_ADDR", defaults.probe_addr)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ControllerError> {
        if self.backoff_min_secs == 0 {
            return Err(ControllerError::InvalidConfig(
                "BACKOFF_MIN_SECS must be at least 1".to_string(),
            ));
        }
        if self.backoff_max_secs < self.backoff_min_secs {
            return Err(ControllerError::InvalidConfig(format!(
                "BACKOFF_MAX_SECS ({}) is below BACKOFF_MIN_SECS ({})",
                self.backoff_max_secs, self.backoff_min_secs
            )));
        }
        if self.concurrency == 0 {
            return Err(ControllerError::InvalidConfig(
                "CONTROLLER_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if let Some(watch_namespace) = &self.watch_namespace {
            if *watch_namespace != self.pod_namespace {
                return Err(ControllerError::InvalidConfig(format!(
                    "DUMMY_POD_NAMESPACE ({}) is outside WATCH_NAMESPACE ({}), Pod events would be missed",
                    self.pod_namespace, watch_namespace
                )));
            }
        }
        if self.reconcile_timeout.is_zero() {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ControllerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ControllerConfig::from_lookup(lookup(&[
            ("WATCH_NAMESPACE", "workloads"),
            ("DUMMY_POD_NAMESPACE", "workloads"),
            ("REQUEUE_AFTER_SECS", "10"),
            ("CONTROLLER_CONCURRENCY", "8"),
            ("PROBE_ADDR", "127.0.0.1:9090"),
        ]))
        .unwrap();

        assert_eq!(config.watch_namespace.as_deref(), Some("workloads"));
        assert_eq!(config.pod_namespace, "workloads");
        assert_eq!(config.requeue_after, Duration::from_secs(10));
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.probe_addr.port(), 9090);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let result = ControllerConfig::from_lookup(lookup(&[("REQUEUE_AFTER_SECS", "soon")]));
        assert!(matches!(result, Err(ControllerError::InvalidConfig(msg)) if msg.contains("REQUEUE_AFTER_SECS")));
    }

    #[test]
    fn test_inverted_backoff_bounds_are_rejected() {
        let result = ControllerConfig::from_lookup(lookup(&[
            ("BACKOFF_MIN_SECS", "60"),
            ("BACKOFF_MAX_SECS", "10"),
        ]));
        assert!(matches!(result, Err(ControllerError::InvalidConfig(_))));
    }

    #[test]
    fn test_pod_namespace_follows_watch_namespace() {
        let config = ControllerConfig::from_lookup(lookup(&[("WATCH_NAMESPACE", "team-a")])).unwrap();
        assert_eq!(config.watch_namespace.as_deref(), Some("team-a"));
        assert_eq!(config.pod_namespace, "team-a");
    }

    #[test]
    fn test_pod_namespace_outside_watch_is_rejected() {
        let result = ControllerConfig::from_lookup(lookup(&[
            ("WATCH_NAMESPACE", "team-a"),
            ("DUMMY_POD_NAMESPACE", "default"),
        ]));
        assert!(matches!(result, Err(ControllerError::InvalidConfig(msg)) if msg.contains("WATCH_NAMESPACE")));
    }
}
