//! Kasa Cloud Gateway
//!
//! A small REST gateway over the TP-Link Kasa cloud: lists the account's
//! devices, looks one up by MAC address, and reports online/offline status.

mod api;
mod config;
mod error;
mod mac;
mod models;
mod tplink;

use std::net::SocketAddr;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiState;
use crate::tplink::{DeviceManager, DeviceSource, KasaCloudClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kasa_cloud_gateway=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting Kasa Cloud Gateway...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded (cloud: {})", config.cloud.base_url);

    // Cloud login is deferred until the first request
    let cloud_client: Arc<dyn DeviceSource> = Arc::new(KasaCloudClient::new(config.cloud.clone())?);
    let device_manager = Arc::new(DeviceManager::new(cloud_client));

    // Build application router
    let cors = CorsLayer::permissive();

    let app = api::routes()
        .with_state(ApiState::new(device_manager))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
