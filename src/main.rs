// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use std::net::SocketAddr;
use std::sync::Arc;

use network_telemetry_exporter::{
    AppState, Config, ConnectionPool, DriverRegistry, ROUTEROS_PLATFORM, Result, RouterOsClient,
    create_router, start_pool_cleanup_task,
};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    setup_tracing();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    tracing::info!(
        "Loaded inventory with {} host(s), {} worker(s), host timeout {:?}, cycle deadline {:?}",
        config.inventory.len(),
        config.num_workers,
        config.host_timeout,
        config.cycle_deadline
    );
    for host in config.inventory.values() {
        tracing::info!("  - Host '{}' at {} ({})", host.name, host.address, host.platform);
    }

    // Sessions persist across poll cycles; the pool lives as long as the process
    let pool = Arc::new(ConnectionPool::new());
    let drivers = DriverRegistry::new().register(
        ROUTEROS_PLATFORM,
        Arc::new(RouterOsClient::with_pool(pool.clone())),
    );
    for host in config.inventory.values() {
        if !drivers.supports(&host.platform) {
            tracing::warn!(
                "Host '{}' uses unsupported platform '{}'; it will be reported as failed",
                host.name,
                host.platform
            );
        }
    }

    let state = Arc::new(AppState::new(config.clone(), Arc::new(drivers)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn({
        let shutdown_tx = shutdown_tx.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let cleanup_handle = start_pool_cleanup_task(pool.clone(), shutdown_rx.clone());

    let app = create_router(state);

    let addr: SocketAddr = config.server_addr.parse().map_err(|e| {
        tracing::error!("Invalid server address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind address: {}", e);
        e
    })?;

    tracing::info!("Network telemetry exporter starting on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - GET /metrics          - Fleet interface and BGP metrics");
    tracing::info!("  - GET /health           - Health check");
    tracing::info!("  - GET /exporter/metrics - Exporter self-telemetry");

    let mut server_shutdown = shutdown_rx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.changed().await;
            tracing::info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    let _ = cleanup_handle.await;
    pool.shutdown().await;

    Ok(())
}

fn setup_tracing() {
    // RUST_LOG wins; otherwise default to "info"
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
