//! User API server entry point and composition root.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use user_api::api::{create_router, user_api, AppState, Dispatcher, FailureNormalizer};
use user_api::config::Config;
use user_api::metrics;
use user_api::store::UserStore;
use user_api::utils::shutdown_signal;

/// In-memory user CRUD API.
#[derive(Parser, Debug)]
#[command(name = "user-api")]
#[command(about = "User CRUD API with uniform JSON envelopes")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// HTTP server port (overrides PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Check configuration validity.
    CheckConfig,

    /// Print the route table.
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("user_api=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Routes) => cmd_routes(),
        Some(Command::Serve) | None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, applying CLI overrides.
fn load_config(port_override: Option<u16>) -> anyhow::Result<Config> {
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Wire store, handlers and dispatcher together.
fn build_dispatcher(config: &Config) -> Dispatcher {
    let store = Arc::new(UserStore::with_seed_data());
    let normalizer = FailureNormalizer::new(config.error_messages());
    user_api(store, config.context_path.clone(), normalizer)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("USER API - CONFIGURATION CHECK");
    println!("======================================================================");

    let config = load_config(None)?;
    let messages = config.error_messages();

    println!("Configuration Summary:");
    println!("  Listen Address: {}", config.bind_addr());
    println!("  Context Path: {}", if config.context_path.is_empty() { "/" } else { config.context_path.as_str() });
    println!(
        "  Metrics: {}",
        config
            .metrics_port
            .map(|p| format!("port {}", p))
            .unwrap_or_else(|| "Disabled".to_string())
    );
    println!("  Max Body Size: {} bytes", config.max_body_bytes);
    println!("  404 Label: {}", messages.not_found);
    println!("  405 Label: {}", messages.method_not_allowed);
    println!("  500 Label: {}", messages.internal);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the route table in registration order.
fn cmd_routes() -> anyhow::Result<()> {
    let config = load_config(None)?;
    let dispatcher = build_dispatcher(&config);

    for route in dispatcher.routes() {
        println!(
            "{:<7} {}{:<20} {}",
            route.method.as_str(),
            dispatcher.context_path(),
            route.pattern.as_str(),
            route.name
        );
    }

    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(port_override)?;
    info!("Configuration loaded successfully");

    if let Some(metrics_port) = config.metrics_port {
        let addr: SocketAddr = format!("{}:{}", config.host, metrics_port).parse()?;
        metrics::install_exporter(addr)?;
    }

    let dispatcher = build_dispatcher(&config);
    info!(
        routes = dispatcher.routes().len(),
        context_path = %config.context_path,
        "Route table assembled"
    );

    let state = AppState::new(dispatcher, config.max_body_bytes);
    let router = create_router(state);

    let addr: SocketAddr = config.bind_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
