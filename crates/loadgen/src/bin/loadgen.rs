//! TPC-C Load Generator CLI
//!
//! Runs the TPC-C transaction mix against an HTTP API and prints a report.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tpcc_client::API_BASE_ENV;
use tpcc_loadgen::sampler;
use tpcc_loadgen::{LoadConfig, LoadRunner, MixMode, RunFile, SampleRanges, Scenario, WeightTable};
use tpcc_types::TransactionKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the warehouse count.
const WAREHOUSES_ENV: &str = "WAREHOUSES";

#[derive(Parser)]
#[command(name = "tpcc-loadgen")]
#[command(about = "TPC-C transaction mix load generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load test against the API
    Run(RunArgs),

    /// Print sampled requests as JSON lines
    Sample {
        /// Transaction kind to sample; omit to sample from the weight table
        #[arg(long)]
        kind: Option<TransactionKind>,

        /// Number of requests
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        #[arg(long, env = WAREHOUSES_ENV, default_value = "10")]
        warehouses: u16,

        #[arg(long, default_value = "12345")]
        seed: u64,

        #[arg(long)]
        weights: Option<WeightTable>,
    },

    /// Show a weight table's shares and its per-kind VU split
    Mix {
        #[arg(long)]
        weights: Option<WeightTable>,

        #[arg(long, default_value = "45")]
        vus: usize,
    },
}

/// Options of `run`, applied on top of scenario, environment and run file.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// API base URL [env: API_BASE, below the run file]
    #[arg(long)]
    api_base: Option<String>,

    /// Number of warehouses to sample from [env: WAREHOUSES, below the run file]
    #[arg(long)]
    warehouses: Option<u16>,

    /// Preset run shape (full-mix, per-kind, payment, delivery)
    #[arg(long)]
    scenario: Option<Scenario>,

    /// TOML run file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of virtual users
    #[arg(long)]
    vus: Option<usize>,

    /// Duration to run (e.g., "30s", "5m", "1h")
    #[arg(short, long)]
    duration: Option<humantime::Duration>,

    /// Time in-flight requests may finish after the run ends
    #[arg(long)]
    graceful_stop: Option<humantime::Duration>,

    /// Pause between iterations of one virtual user
    #[arg(long)]
    think_time: Option<humantime::Duration>,

    /// Per-request timeout
    #[arg(long)]
    timeout: Option<humantime::Duration>,

    /// Weight table, e.g. "new_order=45,payment=43,order_status=4,delivery=4,stock_level=4"
    #[arg(long)]
    weights: Option<WeightTable>,

    /// How virtual users pick kinds (weighted, dedicated)
    #[arg(long)]
    mode: Option<MixMode>,

    /// Require the per-kind response fields on success
    #[arg(long, overrides_with = "no_check_fields")]
    check_fields: bool,

    /// Accept any 2xx response, even when the scenario or run file checks fields
    #[arg(long, overrides_with = "check_fields")]
    no_check_fields: bool,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn check_fields(&self) -> Option<bool> {
        match (self.check_fields, self.no_check_fields) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Layer defaults, scenario, environment, run file and flags, in that
    /// order.
    fn load_config(&self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<LoadConfig> {
        let mut load = LoadConfig::default();
        if let Some(scenario) = self.scenario {
            info!(%scenario, "Applying scenario");
            load = scenario.apply(load);
        }

        if let Some(base) = env(API_BASE_ENV).filter(|b| !b.trim().is_empty()) {
            load.client = load.client.with_base_url(base.trim());
        }
        if let Some(raw) = env(WAREHOUSES_ENV) {
            let warehouses: u16 = raw
                .trim()
                .parse()
                .with_context(|| format!("{WAREHOUSES_ENV}={raw:?} is not a warehouse count"))?;
            load = load.with_warehouses(warehouses);
        }

        if let Some(path) = &self.config {
            load = RunFile::load(path)?.apply(load);
        }

        if let Some(base) = &self.api_base {
            load.client = load.client.with_base_url(base.as_str());
        }
        if let Some(warehouses) = self.warehouses {
            load = load.with_warehouses(warehouses);
        }
        if let Some(vus) = self.vus {
            load = load.with_vus(vus);
        }
        if let Some(duration) = self.duration {
            load = load.with_duration(*duration);
        }
        if let Some(graceful_stop) = self.graceful_stop {
            load = load.with_graceful_stop(*graceful_stop);
        }
        if let Some(think_time) = self.think_time {
            load = load.with_think_time(*think_time);
        }
        if let Some(timeout) = self.timeout {
            load = load.with_timeout(*timeout);
        }
        if let Some(weights) = self.weights {
            load = load.with_weights(weights);
        }
        if let Some(mode) = self.mode {
            load = load.with_mix_mode(mode);
        }
        if let Some(check_fields) = self.check_fields() {
            load = load.with_check_fields(check_fields);
        }
        if let Some(seed) = self.seed {
            load = load.with_seed(seed);
        }
        Ok(load)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            init_tracing();

            let load = args.load_config(|key| std::env::var(key).ok())?;
            let runner = LoadRunner::from_config(load).context("Invalid load configuration")?;

            let shutdown = runner.shutdown_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, stopping load run");
                    shutdown.cancel();
                }
            });

            println!(
                "Running {} VUs against {} for {:?}...",
                runner.config().vus,
                runner.config().client.base_url,
                runner.config().duration
            );
            let report = runner.run().await;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
        }

        Commands::Sample {
            kind,
            count,
            warehouses,
            seed,
            weights,
        } => {
            // No tracing here - output goes to stdout
            let ranges = SampleRanges::new(warehouses);
            ranges.validate().map_err(anyhow::Error::msg)?;
            let table = match kind {
                Some(kind) => WeightTable::single(kind),
                None => weights.unwrap_or_default(),
            };
            let mix = tpcc_loadgen::TransactionMix::new(table);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            for _ in 0..count {
                let kind = mix.select(&mut rng);
                let request = sampler::sample(kind, &ranges, &mut rng);
                println!("{}", serde_json::to_string(&request)?);
            }
        }

        Commands::Mix { weights, vus } => {
            let table = weights.unwrap_or_default();
            let allocation = table.allocate_vus(vus);

            println!("{:<14} {:>8} {:>8} {:>6}", "kind", "weight", "share", "vus");
            for kind in TransactionKind::ALL {
                let allocated = allocation.iter().filter(|k| **k == kind).count();
                println!(
                    "{:<14} {:>8} {:>7.2}% {:>6}",
                    kind.name(),
                    table.weight(kind),
                    table.share(kind) * 100.0,
                    allocated
                );
            }
            println!("{:<14} {:>8} {:>8} {:>6}", "total", table.total(), "", vus);
        }
    }

    Ok(())
}
