use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use hybrid_market::{
    clients::HttpBackend,
    create_app, init_observability,
    repositories::InMemorySessionRepository,
    services::{AdminService, CartService, CatalogService},
    shutdown_observability, AppServices, Config, Metrics, RequestLimits,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (basic logging only)
    let config = Config::from_environment().context("Failed to load configuration")?;
    println!("Configuration loaded successfully");

    // Initialize comprehensive observability
    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        &config.observability.otlp_endpoint,
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )?;

    info!("Starting hybrid-market service");
    info!(
        "Service: {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!("Backend: {}", config.backend.backend_url);

    // Initialize metrics
    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    // One HTTP client serves both the catalog and the order backend
    let backend = Arc::new(
        HttpBackend::new(
            &config.backend.backend_url,
            config.backend.upstream_timeout(),
        )?
        .with_metrics(metrics.clone()),
    );
    info!("Backend client initialized successfully");

    let sessions = Arc::new(InMemorySessionRepository::new());

    let catalog_service = Arc::new(CatalogService::new(backend.clone()));
    let cart_service = Arc::new(CartService::new(
        sessions,
        catalog_service.clone(),
        backend.clone(),
        metrics.clone(),
    ));
    let admin_service = Arc::new(AdminService::new(backend.clone(), backend));
    info!("Services initialized successfully");

    spawn_session_sweeper(cart_service.clone(), &config);

    // Build the application router
    let app = create_app(
        AppServices {
            metrics,
            catalog_service,
            cart_service,
            admin_service,
        },
        RequestLimits {
            max_request_size: config.server.max_request_size,
            request_timeout: config.server.request_timeout(),
        },
    );

    // Create socket address
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Server listening on {}", addr);

    // Create TCP listener
    let listener = TcpListener::bind(addr).await?;

    // Set up graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        shutdown_observability().await;
    };

    // Start the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop sessions that have been idle longer than the TTL
fn spawn_session_sweeper(cart_service: Arc<CartService>, config: &Config) {
    let ttl = config.sessions.ttl();
    let mut interval = tokio::time::interval(config.sessions.sweep_interval());

    tokio::spawn(async move {
        loop {
            interval.tick().await;
            match cart_service.purge_idle_sessions(ttl).await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Expired idle sessions"),
                Err(e) => warn!(error = %e, "Session sweep failed"),
            }
        }
    });
}
