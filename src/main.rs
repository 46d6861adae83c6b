use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use clap::Parser;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

mod config;
mod db;
mod middleware;
mod models;
pub mod observability;
mod routes;
pub mod services;

const DEFAULT_CONFIG_FILE: &str = "usergroups.toml";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub db: Option<Arc<db::DbPool>>,
    pub services: Option<services::Services>,
}

impl AppState {
    pub async fn new(config: config::AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Initialize database and services if configured
        #[allow(unreachable_patterns)]
        let (db, services) = match &config.database {
            config::DatabaseConfig::None => {
                tracing::warn!("No database configured, only health endpoints are served");
                (None, None)
            }
            _ => {
                let pool = db::DbPool::from_config(&config.database).await?;
                if config.database.run_migrations() {
                    pool.run_migrations().await?;
                }
                services::bootstrap(&pool, &config.groups).await?;

                let db = Arc::new(pool);
                let services = services::Services::new(db.clone(), &config.groups);
                (Some(db), Some(services))
            }
        };

        Ok(Self {
            config: Arc::new(config),
            db,
            services,
        })
    }
}

/// CLI arguments for the user groups service
#[derive(Parser, Debug)]
#[command(version, about = "User group administration service", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Run database migrations and seed the default organization and groups
    Migrate,
}

pub fn build_app(config: &config::AppConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness));

    // Group administration needs persistent storage
    if !config.database.is_none() {
        app = app.nest(
            "/api/user_groups",
            routes::admin::user_group_routes(state.clone()),
        );
    }

    app.layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Migrate) => run_migrate(&args.config).await,
        Some(Command::Serve) | None => run_server(&args.config).await,
    }
}

fn load_config(path: &std::path::Path) -> config::AppConfig {
    match config::AppConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn init_observability(config: &config::AppConfig) {
    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Error: Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }
}

async fn run_server(config_path: &std::path::Path) {
    let config = load_config(config_path);
    init_observability(&config);

    tracing::info!(
        config_file = %config_path.display(),
        "Starting user groups service"
    );

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize application state");
            eprintln!("Error: Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let app = build_app(&config, state);

    let bind_addr = config.server.bind_address();
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: Failed to bind to {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}

async fn run_migrate(config_path: &std::path::Path) {
    let config = load_config(config_path);
    init_observability(&config);

    tracing::info!(
        config_file = %config_path.display(),
        "Running database migrations"
    );

    if config.database.is_none() {
        eprintln!("Error: Database is not configured. Nothing to migrate.");
        std::process::exit(1);
    }

    let pool = match db::DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        tracing::error!(error = %e, "Database migrations failed");
        eprintln!("Error: Database migrations failed: {}", e);
        std::process::exit(1);
    }

    match services::bootstrap(&pool, &config.groups).await {
        Ok(()) => {
            tracing::info!("Database migrations and bootstrap completed successfully");
        }
        Err(e) => {
            tracing::error!(error = %e, "Bootstrap failed");
            eprintln!("Error: Bootstrap failed: {}", e);
            std::process::exit(1);
        }
    }
}
