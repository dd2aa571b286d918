use chrono::Local;
use clap::{Parser, Subcommand};
use meddonate::config::Config;
use meddonate::db::seed::seed_reference_data;
use meddonate::db::sqlite::Storage;
use meddonate::router::{AppState, app_router};
use mimalloc::MiMalloc;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "meddonate", version, about = "Medicine donation matching service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the schema and load reference NGOs and shelf-life entries.
    InitDb {
        /// Also insert a few demo donations into an empty donations table.
        #[arg(long)]
        sample_donations: bool,
    },
    /// Run the HTTP server (default).
    Serve {
        /// Overrides `listen_addr` from the configuration.
        #[arg(long)]
        listen: Option<String>,
    },
}

fn init_tracing(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.log_file)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

async fn init_db(cfg: &Config, sample_donations: bool) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::connect(&cfg.database_url).await?;
    storage.init_schema().await?;
    let report =
        seed_reference_data(&storage, sample_donations, Local::now().date_naive()).await?;
    info!(
        database_url = %cfg.database_url,
        ngos = report.ngos,
        shelf_life = report.shelf_life,
        donations = report.donations,
        "database initialized"
    );
    Ok(())
}

async fn serve(cfg: &Config, listen: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::from_config(cfg).await?;
    info!(
        database_url = %cfg.database_url,
        inference = state.assistant.inference_enabled(),
        admin_enabled = !cfg.admin_key.is_empty(),
        uploads_dir = %cfg.uploads_dir.display(),
        threshold_days = cfg.eligibility_threshold_days
    );

    let app = app_router(state);
    let addr = listen.unwrap_or_else(|| cfg.listen_addr.clone());
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    // a bad value aborts startup rather than running against defaults
    let cfg = Config::load().map_err(|e| format!("invalid configuration: {e}"))?;
    init_tracing(&cfg)?;

    match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::InitDb { sample_donations } => init_db(&cfg, sample_donations).await,
        Command::Serve { listen } => serve(&cfg, listen).await,
    }
}
