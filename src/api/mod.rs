//! API module - HTTP handlers and routes

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::tplink::DeviceManager;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub device_manager: Arc<DeviceManager>,
}

impl ApiState {
    pub fn new(device_manager: Arc<DeviceManager>) -> Self {
        Self { device_manager }
    }
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // API description
        .route("/openapi.json", get(handlers::openapi_spec))
        // Devices
        .route("/devices", get(handlers::list_devices))
        .route("/devices/:mac_addr", get(handlers::get_device))
        .route("/devices/:mac_addr/status", get(handlers::get_device_status))
}
