//! TPC-C Load Generator
//!
//! Drives the five TPC-C transactions against an HTTP API and reports
//! per-kind throughput, failures and latency percentiles.
//!
//! # Architecture
//!
//! - **Mix Selection**: cumulative-weight choice of a transaction kind ([`mix`])
//! - **Parameter Sampling**: seeded, uniform TPC-C request parameters ([`sampler`])
//! - **Workloads**: weighted or single-kind request generators ([`workload`])
//! - **Running**: one dispatch per iteration, no retries, many virtual users ([`runner`])
//! - **Checks and Metrics**: outcome classification and hdrhistogram latencies
//!
//! # Example
//!
//! ```ignore
//! use tpcc_loadgen::{LoadConfig, LoadRunner, MixMode};
//! use tpcc_client::ClientConfig;
//! use std::time::Duration;
//!
//! let config = LoadConfig::new(ClientConfig::from_env())
//!     .with_warehouses(10)
//!     .with_vus(20)
//!     .with_duration(Duration::from_secs(60))
//!     .with_mix_mode(MixMode::Weighted);
//!
//! let runner = LoadRunner::from_config(config)?;
//! let report = runner.run().await;
//! report.print();
//! ```

pub mod checks;
pub mod config;
pub mod metrics;
pub mod mix;
pub mod runner;
pub mod sampler;
pub mod workload;

pub use checks::{classify, required_fields, FailureClass, FailureReason, Outcome};
pub use config::{ConfigError, LoadConfig, MixMode, RunFile, Scenario};
pub use metrics::{KindReport, LatencySummary, LoadReport, MetricsCollector};
pub use mix::{MixError, TransactionMix, WeightTable};
pub use runner::{Dispatcher, IterationRecord, IterationRunner, LoadRunner, RunError};
pub use sampler::SampleRanges;
pub use workload::{FixedWorkload, MixedWorkload, WorkloadGenerator};
