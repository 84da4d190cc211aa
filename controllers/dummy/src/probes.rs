//! Health probes and Prometheus metrics.
//!
//! Serves `/healthz`, `/readyz` and `/metrics` on the probe address.

use crate::error::ControllerError;
use crate::reconciler::ReconcileOutcome;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Reconciliation metrics and readiness flag shared with the probe server.
#[derive(Debug)]
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounterVec,
    pods_created: IntCounter,
    duration: Histogram,
    ready: AtomicBool,
}

impl Metrics {
    /// Create and register all metrics
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new(
                "dummy_reconciliations_total",
                "Dummy reconciliations by outcome",
            ),
            &["outcome"],
        )?;
        let pods_created = IntCounter::new(
            "dummy_pods_created_total",
            "Pods created for Dummies",
        )?;
        let duration = Histogram::with_opts(HistogramOpts::new(
            "dummy_reconcile_duration_seconds",
            "Time spent in a single Dummy reconciliation",
        ))?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(pods_created.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            pods_created,
            duration,
            ready: AtomicBool::new(false),
        })
    }

    /// Record the result of one reconciliation
    ///
    /// A pass asks for a requeue exactly when it created the Dummy's Pod.
    pub fn observe(&self, result: &Result<ReconcileOutcome, ControllerError>, elapsed: Duration) {
        let outcome = match result {
            Ok(ReconcileOutcome::Done) => "done",
            Ok(ReconcileOutcome::Requeue) => {
                self.pods_created.inc();
                "requeue"
            }
            Err(_) => "error",
        };
        self.reconciliations.with_label_values(&[outcome]).inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    /// Mark the controller as ready to serve
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub(crate) fn pods_created(&self) -> u64 {
        self.pods_created.get()
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz(State(metrics): State<Arc<Metrics>>) -> StatusCode {
    if metrics.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> (StatusCode, String) {
    match metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Router with all probe endpoints
pub fn router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

/// Serve probes on `addr` until the task is dropped
pub async fn serve(addr: SocketAddr, metrics: Arc<Metrics>) -> Result<(), ControllerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ControllerError::Probe(format!("bind {}: {}", addr, e)))?;
    info!("Serving probes and metrics on {}", addr);

    axum::serve(listener, router(metrics))
        .await
        .map_err(|e| ControllerError::Probe(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_readyz_follows_ready_flag() {
        let metrics = Arc::new(Metrics::new().unwrap());
        assert_eq!(readyz(State(metrics.clone())).await, StatusCode::SERVICE_UNAVAILABLE);

        metrics.set_ready();
        assert_eq!(readyz(State(metrics)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_count_outcomes() {
        let metrics = Arc::new(Metrics::new().unwrap());
        metrics.observe(&Ok(ReconcileOutcome::Requeue), Duration::from_millis(5));
        metrics.observe(&Ok(ReconcileOutcome::Done), Duration::from_millis(5));
        metrics.observe(
            &Err(ControllerError::Timeout(Duration::from_secs(1))),
            Duration::from_secs(1),
        );

        let (status, body) = metrics_handler(State(metrics)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"dummy_reconciliations_total{outcome="requeue"} 1"#));
        assert!(body.contains(r#"dummy_reconciliations_total{outcome="done"} 1"#));
        assert!(body.contains(r#"dummy_reconciliations_total{outcome="error"} 1"#));
        assert!(body.contains("dummy_pods_created_total 1"));
        assert!(body.contains("dummy_reconcile_duration_seconds_count 3"));
    }
}
