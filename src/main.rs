mod client;
mod config;
mod dashboard;
mod error;
mod types;
mod web;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

use client::{BackendClient, TrainingService};
use config::DashboardSettings;
use dashboard::{DashboardController, DashboardView, Pollers};
use error::DashboardError;
use types::{
    FIELD_EPOCHS, FIELD_FORCE_DOWNLOAD, FIELD_LOOKBACK_DAYS, FIELD_THRESHOLD,
};
use web::{start_dashboard_server, AppState};

#[derive(Parser)]
#[command(name = "day-trading-dashboard")]
#[command(version = "0.1.0")]
#[command(about = "Dashboard for training and monitoring the day trading model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "dashboard.toml")]
    config: PathBuf,

    /// Training service base URL (overrides configuration)
    #[arg(short, long)]
    backend: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard and keep it in sync with the training service
    Serve {
        /// Dashboard port
        #[arg(short, long)]
        port: Option<u16>,
        /// JSON file with initial `metrics` and `history_plot`
        #[arg(long)]
        initial_state: Option<PathBuf>,
    },
    /// Train the model once and print the results
    Train {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        #[arg(long)]
        lookback_days: Option<String>,
        #[arg(long)]
        epochs: Option<String>,
        #[arg(long)]
        threshold: Option<String>,
        /// Redownload market data instead of using the cache
        #[arg(long)]
        force_download: bool,
    },
    /// Show stored evaluation metrics and training history
    Status,
    /// Show the latest live inference window
    Stream,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs)?;

    let mut settings = DashboardSettings::load(Some(cli.config.as_path()))?;
    if let Some(url) = cli.backend {
        settings.backend.base_url = url;
    }

    match cli.command {
        Commands::Serve { port, initial_state } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if initial_state.is_some() {
                settings.initial_state_path = initial_state;
            }
            validate(&settings)?;
            run_dashboard(settings).await?;
        }
        Commands::Train {
            symbol,
            interval,
            lookback_days,
            epochs,
            threshold,
            force_download,
        } => {
            validate(&settings)?;
            let form = &settings.form;
            let mut entries = vec![
                ("symbol".to_string(), symbol.unwrap_or_else(|| form.symbol.clone())),
                ("interval".to_string(), interval.unwrap_or_else(|| form.interval.clone())),
                (
                    FIELD_LOOKBACK_DAYS.to_string(),
                    lookback_days.unwrap_or_else(|| form.lookback_days.to_string()),
                ),
                (FIELD_EPOCHS.to_string(), epochs.unwrap_or_else(|| form.epochs.to_string())),
                (
                    FIELD_THRESHOLD.to_string(),
                    threshold.unwrap_or_else(|| form.threshold.to_string()),
                ),
            ];
            if force_download {
                entries.push((FIELD_FORCE_DOWNLOAD.to_string(), "on".to_string()));
            }
            train_once(&settings, &entries).await?;
        }
        Commands::Status => {
            validate(&settings)?;
            show_status(&settings).await?;
        }
        Commands::Stream => {
            validate(&settings)?;
            show_stream(&settings).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn validate(settings: &DashboardSettings) -> Result<(), DashboardError> {
    settings
        .validate()
        .map_err(|errors| DashboardError::Config(errors.join(", ")))
}

fn build_controller(settings: &DashboardSettings) -> Result<Arc<DashboardController>> {
    let client = BackendClient::new(
        &settings.backend.base_url,
        settings.backend.request_timeout(),
    )?;
    info!("Training service: {}", client.base_url());
    let service: Arc<dyn TrainingService> = Arc::new(client);
    Ok(Arc::new(DashboardController::new(
        service,
        settings.timing.status_clear_delay(),
    )))
}

async fn run_dashboard(settings: DashboardSettings) -> Result<()> {
    let controller = build_controller(&settings)?;

    match settings.load_initial_state() {
        Ok(initial) => controller.apply_initial_state(initial).await,
        Err(e) => {
            warn!("Ignoring initial state: {}", e);
            controller.apply_initial_state(Default::default()).await;
        }
    }

    let pollers = Pollers::spawn(Arc::clone(&controller), settings.timing.poll_interval());

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::new(controller, settings.form.clone());

    info!("Dashboard available at http://{}", addr);
    info!("Press Ctrl+C to stop");

    tokio::select! {
        res = start_dashboard_server(state, addr) => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    pollers.abort();
    Ok(())
}

async fn train_once(settings: &DashboardSettings, entries: &[(String, String)]) -> Result<()> {
    let controller = build_controller(settings)?;
    info!("Training started; this may take a couple of minutes");

    let outcome = controller.train(entries).await;
    let view = controller.snapshot().await.view;

    println!("\n{}", view.banner.message);
    let resp = outcome?;
    print_view(&view);
    if let Some(report) = &resp.report {
        println!("\n=== Report ===");
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}

async fn show_status(settings: &DashboardSettings) -> Result<()> {
    let client = BackendClient::new(
        &settings.backend.base_url,
        settings.backend.request_timeout(),
    )?;
    let resp = client.status().await?;
    if resp.status.as_deref() == Some("not_trained") {
        println!("No metrics found. Train the model first.");
        return Ok(());
    }

    let mut view = DashboardView::new();
    if let Some(metrics) = &resp.metrics {
        view.apply_metrics(metrics);
    }
    if let Some(history) = resp.history_plot {
        view.apply_history(&history.normalize());
    }
    print_view(&view);

    if let Some(model_config) = &resp.model_config {
        println!("\n=== Model Config ===");
        println!("{}", serde_json::to_string_pretty(model_config)?);
    }
    Ok(())
}

async fn show_stream(settings: &DashboardSettings) -> Result<()> {
    let controller = build_controller(settings)?;
    if !controller.poll_stream().await {
        println!("Model artefacts missing. Train the model first.");
        return Ok(());
    }

    let stream = controller.snapshot().await.view.stream;
    println!("\n=== Live Stream ===");
    println!("Points: {}", stream.price.point_count());
    let prices = stream.price.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[]);
    let probs = stream
        .probability
        .datasets
        .first()
        .map(|d| d.data.as_slice())
        .unwrap_or(&[]);
    for (i, ts) in stream.price.labels.iter().enumerate() {
        println!(
            "{} | price {} | p(long) {}",
            ts,
            fmt_point(prices.get(i).copied().flatten(), 2),
            fmt_point(probs.get(i).copied().flatten(), 3),
        );
    }
    Ok(())
}

fn print_view(view: &DashboardView) {
    println!("\n=== Evaluation ===");
    for row in &view.metrics.rows {
        println!("{:<24} {}", row.name, row.value);
    }

    if view.history.labels.is_empty() {
        return;
    }
    println!("\n=== Training History ===");
    for (i, epoch) in view.history.labels.iter().enumerate() {
        let values: Vec<String> = view
            .history
            .datasets
            .iter()
            .map(|d| format!("{}={}", d.label, fmt_point(d.data.get(i).copied().flatten(), 4)))
            .collect();
        println!("epoch {:>3} | {}", epoch, values.join(" "));
    }
}

fn fmt_point(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}
