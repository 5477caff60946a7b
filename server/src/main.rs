//! Ridepool HTTP server binary.
//!
//! Wires the reservation ledger, the user directory, and the notification
//! store together and serves the JSON API.

use ridepool_core::{ChannelEmitter, InMemoryDirectory, ReservationLedger, SystemClock};
use ridepool_server::notifications::{drain, NotificationStore};
use ridepool_server::{build_router, AppState, Config};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ridepool=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ridepool HTTP server");

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!(
        host = %config.server.host,
        port = config.server.port,
        max_seats = config.booking.max_seats_per_booking,
        "Configuration loaded"
    );

    // Shared clock and user directory
    let clock = Arc::new(SystemClock);
    let directory = Arc::new(InMemoryDirectory::new());

    // Ledger events flow into the notification store through an unbounded
    // channel; a slow consumer never blocks a reservation
    let (emitter, rx) = ChannelEmitter::channel();
    let ledger = Arc::new(ReservationLedger::new(
        directory.clone(),
        Arc::new(emitter),
        clock.clone(),
    ));

    let notifications = Arc::new(NotificationStore::new());
    tokio::spawn(drain(rx, notifications.clone(), clock));
    info!("Notification drain task started");

    // Build application state and router
    let state = AppState::new(ledger, directory, notifications, config.clone());
    let app = build_router(state);

    // Create TCP listener
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
