//! Kubernetes resource watchers.
//!
//! This module wires the reconciler into `kube_runtime::Controller`. Changes
//! to a Dummy, and changes to any Pod a Dummy controls, both land in the same
//! reconcile entry point. The controller serializes work per Dummy, handles
//! reconnection, and applies the error policy defined here.

use crate::backoff::BackoffTracker;
use crate::error::ControllerError;
use crate::probes::Metrics;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use cluster_store::ObjectKey;
use crds::{Dummy, DUMMY_GROUP, DUMMY_KIND};
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube_runtime::controller::{self, Action, Config as RuntimeConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconciliation by the controller runtime.
#[derive(Debug)]
pub struct Context {
    reconciler: Reconciler,
    backoff: BackoffTracker,
    metrics: Arc<Metrics>,
    requeue_after: Duration,
    reconcile_timeout: Duration,
}

impl Context {
    /// Creates a new context.
    pub fn new(
        reconciler: Reconciler,
        backoff: BackoffTracker,
        metrics: Arc<Metrics>,
        requeue_after: Duration,
        reconcile_timeout: Duration,
    ) -> Self {
        Self {
            reconciler,
            backoff,
            metrics,
            requeue_after,
            reconcile_timeout,
        }
    }
}

/// Maps a Pod to the Dummy that controls it, if any.
///
/// Only the controller owner reference counts, and only when it points at
/// the Dummy kind in our API group.
pub fn owning_dummy(pod: Pod) -> Option<ObjectRef<Dummy>> {
    pod.metadata
        .owner_references
        .as_ref()?
        .iter()
        .find(|owner| {
            owner.controller == Some(true)
                && owner.kind == DUMMY_KIND
                && owner.api_version.split('/').next() == Some(DUMMY_GROUP)
        })
        .map(|owner| ObjectRef::new(&owner.name))
}

/// Reconcile entry point registered with the controller runtime.
///
/// Only the identity of the cached object is used; the reconciler refetches
/// everything it needs. The pass is bounded by the configured deadline, and
/// dropping it on expiry cancels whatever store call is in flight.
pub async fn reconcile_dummy(dummy: Arc<Dummy>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let key = ObjectKey::of(dummy.as_ref())?;
    debug!("Reconciling Dummy {}", key);

    let started = Instant::now();
    let result = tokio::time::timeout(ctx.reconcile_timeout, ctx.reconciler.reconcile(&key))
        .await
        .unwrap_or(Err(ControllerError::Timeout(ctx.reconcile_timeout)));
    ctx.metrics.observe(&result, started.elapsed());

    let action = match result? {
        ReconcileOutcome::Done => Action::await_change(),
        ReconcileOutcome::Requeue => Action::requeue(ctx.requeue_after),
    };
    ctx.backoff.reset(&key);
    Ok(action)
}

/// Error policy: requeue with Fibonacci backoff per Dummy.
///
/// Errors that retrying cannot fix are still requeued, at the longest delay,
/// so a fixed object is eventually picked up even without a new event.
pub fn error_policy(dummy: Arc<Dummy>, err: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = ObjectKey::of(dummy.as_ref()).unwrap_or_else(|_| ObjectKey::cluster("<unknown>"));

    if !err.is_retryable() {
        error!(
            "Reconciliation error for Dummy {} will not resolve by retrying: {}",
            key, err
        );
        return Action::requeue(ctx.backoff.max());
    }

    let delay = ctx.backoff.next_for(&key);
    error!(
        "Reconciliation error for Dummy {}: {} (retrying in {:?})",
        key, err, delay
    );
    Action::requeue(delay)
}

/// Watches Dummy resources and the Pods they own.
pub struct Watcher {
    context: Arc<Context>,
    dummy_api: Api<Dummy>,
    pod_api: Api<Pod>,
    concurrency: u16,
    debounce: Duration,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("concurrency", &self.concurrency)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        context: Arc<Context>,
        dummy_api: Api<Dummy>,
        pod_api: Api<Pod>,
        concurrency: u16,
        debounce: Duration,
    ) -> Self {
        Self {
            context,
            dummy_api,
            pod_api,
            concurrency,
            debounce,
        }
    }

    /// Runs the Dummy controller until a shutdown signal arrives.
    pub async fn watch_dummies(&self) -> Result<(), ControllerError> {
        info!("Starting Dummy watcher");

        let runtime_config = RuntimeConfig::default()
            .debounce(self.debounce)
            .concurrency(self.concurrency);

        let results = Controller::new(self.dummy_api.clone(), watcher::Config::default())
            .with_config(runtime_config)
            .watches(self.pod_api.clone(), watcher::Config::default(), owning_dummy)
            .shutdown_on_signal()
            .run(reconcile_dummy, error_policy, Arc::clone(&self.context));

        drive(results, &self.context).await;

        info!("Dummy watcher stopped");
        Ok(())
    }
}

/// Polls the controller stream to completion, logging each result.
///
/// The watches start on the first poll, so readiness is reported here rather
/// than when the controller is built.
async fn drive<S>(results: S, ctx: &Context)
where
    S: Stream<Item = ControllerResult>,
{
    ctx.metrics.set_ready();
    results.for_each(|res| async move { handle_result(res, ctx) }).await;
}

type ControllerResult =
    Result<(ObjectRef<Dummy>, Action), controller::Error<ControllerError, watcher::Error>>;

fn handle_result(res: ControllerResult, ctx: &Context) {
    match res {
        Ok((obj, action)) => debug!("Reconciled Dummy {}: {:?}", obj.name, action),
        // A Dummy deleted while failing is never reconciled again
        Err(controller::Error::ObjectNotFound(obj)) => {
            debug!("Dummy {} is gone, dropping its backoff", obj.name);
            ctx.backoff.reset(&ObjectKey::cluster(obj.name));
        }
        Err(e) => warn!("Dummy controller error: {}", e),
    }
}
