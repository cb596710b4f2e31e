//! cms-admin - content admin console
//!
//! Serves the console pages and the admin API in front of the content API.
//! Configuration: CLI > `CMS_*` environment > TOML file > defaults.

use anyhow::{Context, Result};
use clap::Parser;
use cms_admin::backend::RestBackend;
use cms_admin::drafts::DraftStore;
use cms_admin::{build_router, resolve_config, AdminSettings, AppState};
use cms_common::config::{self, ConfigOverrides, LoggingConfig};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cms-admin", version, about = "Content admin console")]
struct Args {
    /// TOML config file
    #[arg(long, env = "CMS_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind_address: Option<String>,

    /// Content API base URL
    #[arg(long)]
    api_base_url: Option<String>,

    /// SQLite file for local drafts (`:memory:` keeps them in memory)
    #[arg(long)]
    drafts_database: Option<PathBuf>,

    /// Skip session checks and act as a local admin
    #[arg(long)]
    auth_disabled: bool,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

async fn open_drafts(path: &Path) -> Result<DraftStore> {
    let store = if path == Path::new(":memory:") {
        DraftStore::in_memory().await?
    } else {
        DraftStore::open(path).await?
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        api_base_url: args.api_base_url,
        port: args.port,
        bind_address: args.bind_address,
        drafts_database: args.drafts_database,
        auth_disabled: args.auth_disabled,
    };
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .finish();
    let config = resolve_config(bootstrap, args.config.as_deref(), overrides)?;

    init_tracing(&config.logging)?;

    info!(
        "Starting content admin console (cms-admin) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Content API: {}", config.api_base_url);
    if config.auth_disabled {
        info!("Session checks disabled, all requests run as local admin");
    }

    let backend = RestBackend::new(&config)?;

    let drafts_path = config
        .drafts_database
        .clone()
        .unwrap_or_else(config::default_drafts_database);
    let drafts = open_drafts(&drafts_path)
        .await
        .with_context(|| format!("Cannot open drafts database {}", drafts_path.display()))?;

    let state = AppState::new(Arc::new(backend), drafts, AdminSettings::from(&config));
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;
    info!("cms-admin listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
