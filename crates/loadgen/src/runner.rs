//! Transaction runner and load harness.
//!
//! [`IterationRunner`] performs one iteration: build a request, dispatch it
//! once, classify the outcome and record it. [`LoadRunner`] drives many
//! virtual users (VUs) doing that concurrently for a fixed duration.

use crate::checks::{classify, FailureReason, Outcome};
use crate::config::{ConfigError, LoadConfig, MixMode};
use crate::metrics::{LoadReport, MetricsCollector};
use crate::mix::TransactionMix;
use crate::workload::{FixedWorkload, MixedWorkload, WorkloadGenerator};
use async_trait::async_trait;
use futures::future::join_all;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tpcc_client::{ApiClient, ApiError, RawResponse};
use tpcc_types::{TransactionKind, TransactionRequest};
use tracing::{debug, info, warn};

/// Sends a transaction request and returns the raw response.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn dispatch(&self, request: &TransactionRequest) -> Result<RawResponse, ApiError>;
}

#[async_trait]
impl Dispatcher for ApiClient {
    async fn dispatch(&self, request: &TransactionRequest) -> Result<RawResponse, ApiError> {
        ApiClient::dispatch(self, request).await
    }
}

/// Errors starting a load run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ApiError),
}

/// What happened in one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationRecord {
    pub kind: TransactionKind,
    pub outcome: Outcome,
    pub latency: Duration,
}

/// Runs single iterations against a dispatcher. Never retries.
pub struct IterationRunner<D> {
    dispatcher: Arc<D>,
    workload: Arc<dyn WorkloadGenerator>,
    metrics: Arc<MetricsCollector>,
    check_fields: bool,
}

impl<D> Clone for IterationRunner<D> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            workload: Arc::clone(&self.workload),
            metrics: Arc::clone(&self.metrics),
            check_fields: self.check_fields,
        }
    }
}

impl<D: Dispatcher> IterationRunner<D> {
    pub fn new(
        dispatcher: Arc<D>,
        workload: Arc<dyn WorkloadGenerator>,
        metrics: Arc<MetricsCollector>,
        check_fields: bool,
    ) -> Self {
        Self {
            dispatcher,
            workload,
            metrics,
            check_fields,
        }
    }

    /// Build the next request.
    pub fn prepare(&self, rng: &mut dyn RngCore) -> TransactionRequest {
        self.workload.generate_one(rng)
    }

    /// Dispatch `request` once, classify and record the result.
    pub async fn execute(&self, request: &TransactionRequest) -> IterationRecord {
        let kind = request.kind();
        let started = Instant::now();
        let result = self.dispatcher.dispatch(request).await;
        let latency = match &result {
            Ok(response) => response.latency,
            Err(_) => started.elapsed(),
        };

        let outcome = classify(kind, &result, self.check_fields);
        if let Outcome::Failure(reason) = &outcome {
            debug!(%kind, %reason, ?latency, "Iteration failed");
        }
        self.metrics.record(kind, &outcome, latency);

        IterationRecord {
            kind,
            outcome,
            latency,
        }
    }

    /// Prepare and execute one iteration.
    pub async fn run_iteration<R: RngCore + Send>(&self, rng: &mut R) -> IterationRecord {
        let request = self.prepare(rng);
        self.execute(&request).await
    }

    /// Record an iteration cut off by the end of the run.
    pub fn abandon(&self, kind: TransactionKind, latency: Duration) -> IterationRecord {
        let outcome = Outcome::Failure(FailureReason::Abandoned);
        self.metrics.record(kind, &outcome, latency);
        IterationRecord {
            kind,
            outcome,
            latency,
        }
    }
}

/// Runs a configured number of VUs for a configured duration.
pub struct LoadRunner<D> {
    config: LoadConfig,
    dispatcher: Arc<D>,
    mix: Arc<TransactionMix>,
    shutdown: CancellationToken,
}

impl LoadRunner<ApiClient> {
    /// Create a runner talking HTTP to the configured API.
    pub fn from_config(config: LoadConfig) -> Result<Self, RunError> {
        let client = ApiClient::new(config.client.clone())?;
        Ok(Self::new(config, client)?)
    }
}

impl<D: Dispatcher> LoadRunner<D> {
    /// Create a runner over any dispatcher.
    pub fn new(config: LoadConfig, dispatcher: D) -> Result<Self, ConfigError> {
        config.validate()?;
        let mix = Arc::new(TransactionMix::new(config.weights));
        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
            mix,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Token that ends the run early when cancelled. In-flight iterations
    /// still get the graceful-stop period.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Workload for each VU, in VU order.
    fn vu_workloads(&self) -> Vec<Arc<dyn WorkloadGenerator>> {
        let ranges = &self.config.ranges;
        match self.config.mix_mode {
            MixMode::Weighted => {
                let shared: Arc<dyn WorkloadGenerator> = Arc::new(MixedWorkload::new(
                    Arc::clone(&self.mix),
                    ranges.clone(),
                ));
                vec![shared; self.config.vus]
            }
            MixMode::Dedicated => self
                .config
                .weights
                .allocate_vus(self.config.vus)
                .into_iter()
                .map(|kind| {
                    Arc::new(FixedWorkload::new(kind, ranges.clone())) as Arc<dyn WorkloadGenerator>
                })
                .collect(),
        }
    }

    /// Run for the configured duration and report.
    pub async fn run(&self) -> LoadReport {
        let config = &self.config;
        info!(
            vus = config.vus,
            duration = ?config.duration,
            mode = %config.mix_mode,
            weights = %config.weights,
            warehouses = config.ranges.warehouses,
            check_fields = config.check_fields,
            seed = config.seed,
            "Starting load run"
        );

        let metrics = Arc::new(MetricsCollector::new());
        let stop = self.shutdown.child_token();
        let abandon = CancellationToken::new();
        let started = Instant::now();

        let handles: Vec<_> = self
            .vu_workloads()
            .into_iter()
            .enumerate()
            .map(|(vu, workload)| {
                let runner = IterationRunner::new(
                    Arc::clone(&self.dispatcher),
                    workload,
                    Arc::clone(&metrics),
                    config.check_fields,
                );
                let rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(vu as u64));
                tokio::spawn(run_vu(
                    vu,
                    runner,
                    rng,
                    config.think_time,
                    stop.clone(),
                    abandon.clone(),
                ))
            })
            .collect();

        tokio::select! {
            _ = tokio::time::sleep(config.duration) => {}
            _ = stop.cancelled() => info!("Load run cancelled"),
        }
        stop.cancel();

        let joined = join_all(handles);
        tokio::pin!(joined);
        let results = match tokio::time::timeout(config.graceful_stop, &mut joined).await {
            Ok(results) => results,
            Err(_) => {
                warn!(
                    graceful_stop = ?config.graceful_stop,
                    "Graceful stop elapsed, abandoning in-flight iterations"
                );
                abandon.cancel();
                joined.await
            }
        };
        for (vu, result) in results.into_iter().enumerate() {
            if let Err(e) = result {
                warn!(vu, error = %e, "Virtual user task failed");
            }
        }

        let report = metrics.report(started.elapsed(), self.mix.fallback_count());
        info!(
            iterations = report.total_attempts(),
            failures = report.total_failures(),
            throughput = report.throughput(),
            "Load run finished"
        );
        report
    }
}

async fn run_vu<D: Dispatcher>(
    vu: usize,
    runner: IterationRunner<D>,
    mut rng: ChaCha8Rng,
    think_time: Duration,
    stop: CancellationToken,
    abandon: CancellationToken,
) {
    let mut iterations = 0u64;

    while !stop.is_cancelled() {
        let request = runner.prepare(&mut rng);
        let kind = request.kind();
        let started = Instant::now();

        tokio::select! {
            _ = runner.execute(&request) => {}
            _ = abandon.cancelled() => {
                runner.abandon(kind, started.elapsed());
                break;
            }
        }
        iterations += 1;

        if !think_time.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(think_time) => {}
                _ = stop.cancelled() => break,
            }
        }
    }

    debug!(vu, iterations, "Virtual user finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mix::WeightTable;
    use crate::sampler::SampleRanges;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tpcc_client::ClientConfig;

    /// Answers every request with a fixed status and body.
    struct FixedResponse {
        status_code: u16,
        body: &'static str,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FixedResponse {
        fn new(status_code: u16, body: &'static str) -> Self {
            Self {
                status_code,
                body,
                delay: Duration::from_millis(1),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl Dispatcher for FixedResponse {
        async fn dispatch(&self, _: &TransactionRequest) -> Result<RawResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(RawResponse {
                status_code: self.status_code,
                body: self.body.to_string(),
                latency: self.delay,
            })
        }
    }

    fn iteration_runner(
        dispatcher: Arc<FixedResponse>,
        kind: TransactionKind,
        check_fields: bool,
    ) -> IterationRunner<FixedResponse> {
        IterationRunner::new(
            dispatcher,
            Arc::new(FixedWorkload::new(kind, SampleRanges::default())),
            Arc::new(MetricsCollector::new()),
            check_fields,
        )
    }

    fn short_config() -> LoadConfig {
        LoadConfig::new(ClientConfig::default())
            .with_vus(3)
            .with_duration(Duration::from_millis(100))
            .with_graceful_stop(Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_server_error_is_one_failed_attempt() {
        let dispatcher = Arc::new(FixedResponse::new(500, "boom"));
        let runner = iteration_runner(Arc::clone(&dispatcher), TransactionKind::NewOrder, false);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let record = runner.run_iteration(&mut rng).await;

        assert_eq!(record.kind, TransactionKind::NewOrder);
        assert_eq!(record.outcome, Outcome::Failure(FailureReason::Status(500)));
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_field_depends_on_checks() {
        let body = r#"{"payment_amount": "1.00"}"#;
        let dispatcher = Arc::new(FixedResponse::new(200, body));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let checked = iteration_runner(Arc::clone(&dispatcher), TransactionKind::Payment, true);
        assert_eq!(
            checked.run_iteration(&mut rng).await.outcome,
            Outcome::Failure(FailureReason::MissingField("customer.c_id"))
        );

        let unchecked = iteration_runner(Arc::clone(&dispatcher), TransactionKind::Payment, false);
        assert_eq!(unchecked.run_iteration(&mut rng).await.outcome, Outcome::Success);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_weighted_run_produces_report() {
        let runner = LoadRunner::new(short_config(), FixedResponse::new(200, "{}")).unwrap();
        let report = runner.run().await;

        assert!(report.total_attempts() > 0);
        assert_eq!(report.total_failures(), 0);
        assert_eq!(report.selector_fallbacks, 0);
        assert_eq!(
            report.total_attempts() as usize,
            runner.dispatcher.calls.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_dedicated_run_covers_every_kind() {
        let config = short_config()
            .with_vus(5)
            .with_mix_mode(MixMode::Dedicated)
            .with_weights(WeightTable::tpcc());
        let runner = LoadRunner::new(config, FixedResponse::new(200, "{}")).unwrap();
        let report = runner.run().await;

        for kind in TransactionKind::ALL {
            assert!(
                report.kind(kind).unwrap().attempts > 0,
                "{kind} was never run"
            );
        }
    }

    #[tokio::test]
    async fn test_slow_calls_are_abandoned_after_graceful_stop() {
        let config = short_config()
            .with_vus(2)
            .with_duration(Duration::from_millis(50))
            .with_graceful_stop(Duration::from_millis(50));
        let dispatcher = FixedResponse::new(200, "{}").with_delay(Duration::from_secs(30));
        let runner = LoadRunner::new(config, dispatcher).unwrap();

        let report = runner.run().await;

        assert_eq!(report.total_attempts(), 2);
        assert_eq!(report.total_successes(), 0);
        let abandoned: u64 = report
            .kinds
            .iter()
            .map(|k| k.failures_of(crate::checks::FailureClass::Abandoned))
            .sum();
        assert_eq!(abandoned, 2);
    }

    #[tokio::test]
    async fn test_shutdown_token_ends_run_early() {
        let config = short_config().with_duration(Duration::from_secs(60));
        let runner = LoadRunner::new(config, FixedResponse::new(200, "{}")).unwrap();
        let token = runner.shutdown_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let report = runner.run().await;
        assert!(report.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = short_config().with_vus(0);
        assert!(LoadRunner::new(config, FixedResponse::new(200, "{}")).is_err());
    }
}
