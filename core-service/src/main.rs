//! Log Triage - Main Entry Point
//!
//! Reads one log from stdin, analyzes it and prints the JSON response.
//! Raw text is wrapped into `{"log": ...}`; JSON requests with a `log` key pass through.

use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use log_triage_core::api::{self, TriageEngine};
use log_triage_core::constants::{APP_NAME, APP_VERSION};
use log_triage_core::logic::telemetry;
use log_triage_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    init_tracing(json_logs);
    let config = Config::from_env();

    tracing::info!("{} v{} starting...", APP_NAME, APP_VERSION);

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read log from stdin")?;

    let body = api::stdin_request(&input)?;
    let engine = TriageEngine::from_config(&config);
    let response = api::handle(&engine, &body).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    tracing::info!(stats = ?telemetry::snapshot(), "Done");

    Ok(if response.is_rejected() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "log_triage_core=info,log_triage=info".into());

    // stdout carries the response
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
