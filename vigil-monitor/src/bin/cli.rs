//! Command-line interface for vigil-monitor.
//!
//! This binary provides a CLI for querying and feeding the monitor
//! daemon via the HTTP API.

use std::env;

use anyhow::Result;

use vigil_monitor::api_client;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: vigil-cli <command>");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  status            Show cumulative availability");
        eprintln!("  submit <json>     Submit one reading payload");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  VIGIL_API_URL    API base URL (default: {})", api_client::DEFAULT_BASE_URL);
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "submit" => cmd_submit(args.get(2).map(String::as_str)).await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring VIGIL_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("VIGIL_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print the current availability snapshot.
async fn cmd_status() -> Result<()> {
    let client = make_client();
    let stats = client.get_stats().await?;

    println!("Online:  {} ({} ms)", stats.total_online, stats.total_online_ms);
    println!("Offline: {} ({} ms)", stats.total_offline, stats.total_offline_ms);

    match (stats.last_status, stats.last_timestamp) {
        (Some(status), Some(at)) => println!("Last:    {status} at {at}"),
        _ => println!("Last:    (no readings yet)"),
    }

    Ok(())
}

/// Submit a reading payload given as a JSON object argument.
async fn cmd_submit(payload: Option<&str>) -> Result<()> {
    let Some(payload) = payload else {
        eprintln!("Usage: vigil-cli submit '{{\"power\": 1}}'");
        std::process::exit(1);
    };

    let payload: serde_json::Value = serde_json::from_str(payload)?;
    let client = make_client();
    let stamped = client.submit_reading(&payload).await?;

    println!("{}", serde_json::to_string_pretty(&stamped)?);
    Ok(())
}
