use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use pumphouse::series::now_ms;
use pumphouse::{
    CommandState, CommandWriter, Config, SeriesPoint, StateProjector, StatusState, StreamClient,
    Telemetry, WindowedSeries,
};

/// Operator-side telemetry link for the water-supply controller.
#[derive(Parser)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "pumphouse.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the live controller state and log changes
    Watch,
    /// Write one command value to the controller
    Write {
        /// Command field name, e.g. "enable_P1_cmd"
        name: String,
        /// Value to write: true/false, a number, or a bare string
        value: String,
    },
}

fn setup_tracing() -> Result<()> {
    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::ERROR.into())
                .from_env_lossy()
                .add_directive("pumphouse=INFO".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(true));

    // Journald is there when running as a service; off-box it is not, and
    // that must not stop an interactive session.
    match tracing_journald::layer() {
        Ok(journald) => tracing::subscriber::set_global_default(registry.with(journald))?,
        Err(_) => tracing::subscriber::set_global_default(registry)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing()?;

    let cli = Cli::parse();
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        info!(path = %cli.config.display(), "No config file, using controller defaults");
        Config::default()
    };

    match cli.command {
        Command::Watch => run_watch(config).await,
        Command::Write { name, value } => run_write(config, name, value).await,
    }
}

async fn run_watch(config: Config) -> Result<()> {
    let projector = StateProjector::new(config.fields.clone());
    let client = StreamClient::connect(config.stream.clone());

    let mut state = client.state();
    let mut connected = client.connected();

    let mut pressure = WindowedSeries::new(config.chart.window_ms);
    let mut after_filter = WindowedSeries::new(config.chart.window_ms);

    let mut telemetry = Telemetry::default();
    let mut commands = CommandState::default();
    let mut statuses = StatusState::default();

    let mut summary = interval(Duration::from_secs(config.chart.summary_interval_secs));
    summary.tick().await;

    info!(addr = %config.stream.addr, "Watching controller state, ^C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let remote = state.borrow_and_update().clone();

                // Both pressure series get the same timestamp per update
                // cycle so chart consumers can align them without a join.
                let now = now_ms();
                pressure.push(remote.number(&config.fields.water_pressure), now);
                after_filter.push(remote.number(&config.fields.pressure_after_filter), now);

                let next = projector.telemetry(&remote);
                if next != telemetry {
                    info!(
                        level = next.water_level,
                        pressure = next.water_pressure,
                        after_filter = next.pressure_after_filter,
                        "Telemetry"
                    );
                    telemetry = next;
                }

                let next_commands = projector.commands(&remote);
                log_flag_changes("Command", &commands, &next_commands);
                commands = next_commands;

                let next_statuses = projector.statuses(&remote);
                log_flag_changes("Status", &statuses, &next_statuses);
                statuses = next_statuses;
            }

            changed = connected.changed() => {
                if changed.is_err() {
                    break;
                }
                if !*connected.borrow_and_update() {
                    warn!("Telemetry link down, controls should be treated as stale");
                }
            }

            _ = summary.tick() => {
                log_window_summary("pressure", pressure.snapshot(), *connected.borrow());
                log_window_summary("after-filter", after_filter.snapshot(), *connected.borrow());
            }
        }
    }

    info!("Shutting down");
    client.teardown().await;

    Ok(())
}

fn log_flag_changes(kind: &str, previous: &CommandState, next: &CommandState) {
    for (name, value) in next {
        if previous.get(name) != Some(value) {
            info!(%name, value, "{kind} flag changed");
        }
    }
}

fn log_window_summary(series: &str, points: &VecDeque<SeriesPoint>, connected: bool) {
    if points.is_empty() {
        return;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for p in points {
        min = min.min(p.value);
        max = max.max(p.value);
        sum += p.value;
    }

    info!(
        series,
        connected,
        points = points.len(),
        min,
        max,
        mean = sum / points.len() as f64,
        "Window summary"
    );
}

async fn run_write(config: Config, name: String, value: String) -> Result<()> {
    if !config.fields.is_command(&name) {
        warn!(%name, "Not a command field in the catalog, writing anyway");
    }

    let writer = CommandWriter::new(&config.write)?;
    let status = writer.status();

    writer.write(&name, parse_value(&value)).await;

    let result = match &status.borrow().error {
        None => {
            info!(%name, %value, "Write accepted");
            Ok(())
        }
        Some(error) => bail!("Write of {name} failed: {error}"),
    };
    result
}

/// Booleans and numbers go over the wire typed; anything else is a string.
fn parse_value(raw: &str) -> Value {
    if let Ok(flag) = raw.parse::<bool>() {
        return Value::Bool(flag);
    }
    if let Ok(number) = raw.parse::<i64>() {
        return serde_json::json!(number);
    }
    if let Ok(number) = raw.parse::<f64>() {
        return serde_json::json!(number);
    }
    Value::String(raw.to_string())
}
