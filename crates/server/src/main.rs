//! racehub server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use racehub_api::{app, middleware::AppState};
use racehub_common::{Config, ImageFormatter};
use racehub_core::{AccountDeletionService, CommentService, RaceService, UserService};
use racehub_db::repositories::{
    AccountDeletionRequestRepository, CommentRepository, RaceRepository, UserRepository,
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "racehub=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting racehub server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(racehub_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    racehub_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let race_repo = RaceRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let deletion_repo = AccountDeletionRequestRepository::new(Arc::clone(&db));

    // Initialize services
    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        race_service: RaceService::new(
            race_repo.clone(),
            comment_repo.clone(),
            config.listing.page_size,
        ),
        comment_service: CommentService::new(comment_repo, race_repo),
        account_deletion_service: AccountDeletionService::new(deletion_repo, user_repo),
        image_formatter: ImageFormatter::new(config.media.cloud_name.clone()),
    };

    if config.media.cloud_name.is_none() {
        info!("No media cloud configured, race images will be omitted");
    }

    let app = app(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, url = %config.server.url, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
