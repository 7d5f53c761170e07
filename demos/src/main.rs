//! Bell-State Remote Execution Demo
//!
//! Builds a two-qubit Bell circuit, submits it to the configured remote
//! backend and prints the decoded measurement counts.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use grane_adapter_qx::{QxAccelerator, QxConfig};
use grane_hal::{Accelerator, MeasurementBuffer, PollPolicy};
use grane_ir::Circuit;

#[derive(Parser, Debug)]
#[command(name = "demo-bell")]
#[command(about = "Run a Bell circuit on a remote backend")]
struct Args {
    /// Backend to run on (overrides config/environment)
    #[arg(long)]
    backend: Option<String>,

    /// Shots per circuit
    #[arg(long, default_value_t = 1024)]
    shots: u32,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_interval_ms: u64,

    /// Give up after this many status queries
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = QxConfig::from_env().context("loading configuration")?;
    if let Some(backend) = args.backend {
        config = config.with_backend(backend);
    }
    let mut policy = PollPolicy::with_interval(Duration::from_millis(args.poll_interval_ms));
    if let Some(attempts) = args.max_attempts {
        policy = policy.with_max_attempts(attempts);
    }
    config = config.with_shots(args.shots).with_poll(policy);

    println!("Connecting to {} ...", config.url);
    let accelerator = QxAccelerator::connect(config)
        .await
        .context("connecting to backend")?;

    let selected = accelerator.selected_backend()?;
    println!(
        "Backend: {} ({} qubits, simulator: {})",
        selected.name, selected.n_qubits, selected.is_simulator
    );

    let circuit = Circuit::bell();
    let mut buffer = MeasurementBuffer::new("bell", 2)?;

    let shots = accelerator.config().shots;
    let poll = accelerator.config().poll;
    let extra = accelerator
        .execute(&mut buffer, &[circuit], shots, &poll)
        .await
        .context("executing circuit")?;
    anyhow::ensure!(extra.is_empty(), "single-circuit batch returned extra buffers");

    println!("\nResults ({} shots):", buffer.measurements().len());
    for (bitstring, count) in buffer.counts().iter() {
        println!("  |{bitstring}>  {count}");
    }
    println!("  <Z..Z> = {:.4}", buffer.expectation_value_z());

    Ok(())
}
