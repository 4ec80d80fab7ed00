// src/checker/pool.rs
// =============================================================================
// Checks many links concurrently with a fixed pool of workers.
//
// How it works:
// 1. Every link is pushed into a job queue sized for the whole batch, then
//    the queue is closed (the producer never waits)
// 2. W workers pull jobs until the queue is empty
// 3. For each job a worker asks the circuit breaker about the link's domain;
//    if the domain is blocked the job is dropped without a trace
// 4. Otherwise it probes the link, tells the breaker how it went, and sends
//    the result to the aggregator
// 5. When the last worker exits, its result sender is dropped, the result
//    channel closes and the aggregator's loop ends
//
// At most W probes are in flight at once. The breaker is consulted at
// dispatch time only, so two workers can both see a half-open domain and
// both send a trial probe before either reports back.
//
// Rust concepts:
// - tokio::spawn / JoinSet: run workers as tasks and wait for all of them
// - mpsc channels: hand jobs out and collect results
// - Arc: share the breaker registry and the job queue between workers
// =============================================================================

use crate::checker::breaker::BreakerRegistry;
use crate::checker::probe::{domain_of, probe, ProbeResult};
use crate::checker::transport::{HttpTransport, Transport};
use crate::config::CheckConfig;
use crate::error::ProbeError;
use crate::models::{Link, LinkError};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

// Shared receiving end of the job queue
type JobQueue = Arc<Mutex<mpsc::Receiver<Link>>>;

// Checks all links and returns the ones that failed
//
// Never fails as a whole: each link's problem ends up as a LinkError.
// The order of the returned errors follows completion order, not input order.
// Links skipped by an open circuit breaker are not reported at all.
pub async fn check_links(links: &[Link], config: &CheckConfig) -> Vec<LinkError> {
    if links.is_empty() {
        return Vec::new();
    }

    let registry = Arc::new(BreakerRegistry::new(config.breaker));
    let workers = config.worker_count();

    tracing::debug!(links = links.len(), workers, "starting link check");

    // Pre-sized and the receiver is still alive, so try_send cannot fail
    let (job_tx, job_rx) = mpsc::channel(links.len());
    for link in links {
        let queued = job_tx.try_send(link.clone());
        debug_assert!(queued.is_ok(), "job queue is sized for every link");
    }
    drop(job_tx);

    let jobs: JobQueue = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<ProbeResult>(links.len());

    let mut pool = JoinSet::new();
    for id in 0..workers {
        pool.spawn(worker(
            id,
            jobs.clone(),
            result_tx.clone(),
            config.clone(),
            registry.clone(),
        ));
    }
    // Only the workers hold senders now; the channel closes when they finish
    drop(result_tx);

    let mut errors = Vec::new();
    let mut checked = 0usize;
    while let Some(result) = result_rx.recv().await {
        checked += 1;
        if let Some(error) = result.into_link_error() {
            errors.push(error);
        }
    }

    let mut skipped = 0usize;
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(stats) => skipped += stats.skipped,
            Err(e) => tracing::error!(error = %e, "link check worker panicked"),
        }
    }

    tracing::info!(
        total = links.len(),
        checked,
        failed = errors.len(),
        skipped,
        "link check finished"
    );

    errors
}

// What a worker did, reported when it exits
#[derive(Debug, Default)]
struct WorkerStats {
    probed: usize,
    skipped: usize,
}

// Builds the request sender a worker uses for all its jobs
fn worker_transport(config: &CheckConfig) -> Result<Arc<dyn Transport>, ProbeError> {
    if let Some(transport) = &config.transport {
        return Ok(transport.clone());
    }

    let transport = HttpTransport::new(config.timeout, config.max_redirects)
        .map_err(|e| ProbeError::ClientSetup(e.to_string()))?;
    Ok(Arc::new(transport))
}

// Pulls jobs until the queue is closed and empty
async fn worker(
    id: usize,
    jobs: JobQueue,
    results: mpsc::Sender<ProbeResult>,
    config: CheckConfig,
    registry: Arc<BreakerRegistry>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    let transport = worker_transport(&config);
    if let Err(e) = &transport {
        tracing::warn!(worker = id, error = %e, "could not set up HTTP client");
    }

    loop {
        // The lock is released as soon as a job (or None) comes back
        let next = jobs.lock().await.recv().await;
        let Some(link) = next else {
            break;
        };

        let domain = domain_of(&link.url);
        if !domain.is_empty() && !registry.allow(&domain) {
            tracing::debug!(worker = id, %domain, url = %link.url, "circuit open, skipping link");
            stats.skipped += 1;
            continue;
        }

        let result = match &transport {
            Ok(transport) => probe(transport.as_ref(), &link.url, config.timeout).await,
            Err(e) => {
                // Not the domain's fault, so the breaker is left alone
                let failed = ProbeResult {
                    url: link.url,
                    status_code: 0,
                    error: Some(e.clone()),
                };
                if results.send(failed).await.is_err() {
                    break;
                }
                continue;
            }
        };
        stats.probed += 1;

        if !domain.is_empty() {
            if result.is_ok() {
                registry.record_success(&domain);
            } else {
                registry.record_failure(&domain);
            }
        }

        tracing::debug!(
            worker = id,
            url = %result.url,
            status = result.status_code,
            ok = result.is_ok(),
            "probed link"
        );

        if results.send(result).await.is_err() {
            // Aggregator is gone, nobody wants more results
            break;
        }
    }

    tracing::trace!(worker = id, probed = stats.probed, skipped = stats.skipped, "worker done");
    stats
}
