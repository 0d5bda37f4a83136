//! Score and health commands

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use crate::client::{ApiClient, HealthResponse, ScoreResponse};
use crate::output::{color_label, print_success, print_warning, stability_label, OutputFormat};

/// Show the stability score of the most recent sample
pub async fn show_score(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: ScoreResponse = client.get("stability_score").await?;
    let label = stability_label(result.score);

    match format {
        OutputFormat::Json => {
            let out = json!({ "score": result.score, "label": label });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!("{}", "Network Stability".bold());
            println!("{}", "=".repeat(30));
            println!("Score:  {}/100", result.score);
            println!("Status: {}", color_label(label));
        }
    }

    Ok(())
}

/// Show server health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let result: HealthResponse = client.get("health").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            if result.status == "ok" {
                print_success(&format!("Server is healthy ({})", client.url("")?));
            } else {
                print_warning(&format!("Server reported status: {}", result.status));
            }
        }
    }

    Ok(())
}
