//! Alert listing

use anyhow::Result;
use colored::Colorize;
use tabled::{Table, Tabled};

use crate::client::{Alert, ApiClient};
use crate::output::{color_severity, format_gas, format_timestamp, print_info, OutputFormat};

/// Row for alerts table
#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Type")]
    alert_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Gas Price")]
    gas_price: String,
    #[tabled(rename = "Raised At (UTC)")]
    raised_at: String,
}

impl From<&Alert> for AlertRow {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id,
            alert_type: alert.alert_type.clone(),
            severity: color_severity(&alert.severity),
            network: alert.sample.network.clone(),
            gas_price: format_gas(alert.sample.gas_price),
            raised_at: format_timestamp(alert.ts),
        }
    }
}

/// List all alerts in the order they were raised
pub async fn list_alerts(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let alerts: Vec<Alert> = client.get("alerts").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&alerts)?);
        }
        OutputFormat::Table => {
            if alerts.is_empty() {
                print_info("No alerts raised");
                return Ok(());
            }

            let rows: Vec<AlertRow> = alerts.iter().map(AlertRow::from).collect();
            println!("{}", Table::new(rows));
            println!();
            println!("Total: {} alerts", alerts.len().to_string().bold());
        }
    }

    Ok(())
}
