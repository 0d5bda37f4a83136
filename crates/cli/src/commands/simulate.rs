//! Metric producer: posts random samples on a fixed interval

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rand::Rng;

use crate::client::{ApiClient, MetricReport, ReceivedResponse};
use crate::output::{format_gas, format_rate, print_error, print_info, OutputFormat};

/// Network name used when none is given on the command line or in config
pub const DEFAULT_NETWORK: &str = "demo";

/// Build one random sample for `network`
pub fn make_sample(network: &str) -> MetricReport {
    let mut rng = rand::thread_rng();

    MetricReport {
        network: network.to_string(),
        gas_price: round_to(rng.gen_range(10.0..=200.0), 2),
        block_time: round_to(rng.gen_range(1.0..=15.0), 2),
        tx_volume: rng.gen_range(10..=5000),
        pending_tx: rng.gen_range(0..=2000),
        failed_tx_rate: round_to(rng.gen_range(0.0..=0.4), 3),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Send samples until `count` is reached or Ctrl-C
pub async fn run(
    client: &ApiClient,
    network: &str,
    interval_secs: u64,
    count: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let endpoint = client.url("metrics")?;
    if matches!(format, OutputFormat::Table) {
        print_info(&format!("Simulator started, sending samples to {}", endpoint));
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    let mut sent = 0u64;

    loop {
        if count.is_some_and(|limit| sent >= limit) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let sample = make_sample(network);
        sent += 1;

        // Best effort: report the failure and keep going
        match client.post::<ReceivedResponse, _>("metrics", &sample).await {
            Ok(_) => print_sent(&sample, format)?,
            Err(e) => print_error(&format!("error sending sample: {:#}", e)),
        }
    }

    if matches!(format, OutputFormat::Table) {
        print_info(&format!("Simulator stopped after {} samples", sent));
    }

    Ok(())
}

fn print_sent(sample: &MetricReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(sample)?),
        OutputFormat::Table => println!(
            "{} {} gas={} block={:.2}s tx={} pending={} failed={}",
            "sent".green(),
            sample.network.cyan(),
            format_gas(sample.gas_price),
            sample.block_time,
            sample.tx_volume,
            sample.pending_tx,
            format_rate(sample.failed_tx_rate),
        ),
    }
    Ok(())
}
