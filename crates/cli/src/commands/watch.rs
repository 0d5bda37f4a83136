//! Realtime feed viewer over the `/ws` channel

use anyhow::{Context, Result};
use colored::Colorize;
use futures::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::client::{ApiClient, StreamEvent};
use crate::output::{
    color_severity, format_gas, format_rate, format_timestamp, print_info, print_warning,
    OutputFormat,
};

/// Print events until the server closes, `limit` is reached, or Ctrl-C
pub async fn run(client: &ApiClient, limit: Option<u64>, format: OutputFormat) -> Result<()> {
    let url = client.ws_url()?;
    let (mut stream, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("Failed to connect to {}", url))?;

    if matches!(format, OutputFormat::Table) {
        print_info(&format!("Connected to {}, waiting for events", url));
    }

    let mut seen = 0u64;

    loop {
        if limit.is_some_and(|limit| seen >= limit) {
            break;
        }

        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = tokio::signal::ctrl_c() => break,
        };

        let text = match frame {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                if matches!(format, OutputFormat::Table) {
                    print_warning("Server closed the connection");
                }
                break;
            }
            // Pings are answered by the protocol layer
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e).context("WebSocket error"),
        };

        match format {
            OutputFormat::Json => println!("{}", text),
            OutputFormat::Table => {
                let event: StreamEvent =
                    serde_json::from_str(&text).context("Failed to parse event")?;
                print_event(&event);
            }
        }
        seen += 1;
    }

    let _ = stream.close(None).await;
    Ok(())
}

fn print_event(event: &StreamEvent) {
    match event {
        StreamEvent::Metric(sample) => println!(
            "{} {} {} gas={} block={:.2}s tx={} pending={} failed={}",
            format_timestamp(sample.ts).dimmed(),
            "metric".cyan(),
            sample.network,
            format_gas(sample.gas_price),
            sample.block_time,
            sample.tx_volume,
            sample.pending_tx,
            format_rate(sample.failed_tx_rate),
        ),
        StreamEvent::Alert(alert) => println!(
            "{} {} #{} {} [{}] {} gas={}",
            format_timestamp(alert.ts).dimmed(),
            "ALERT".red().bold(),
            alert.id,
            alert.alert_type,
            color_severity(&alert.severity),
            alert.sample.network,
            format_gas(alert.sample.gas_price),
        ),
    }
}
