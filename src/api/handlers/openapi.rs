//! OpenAPI description of the gateway, generated from the handler annotations

use axum::Json;
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::{DeviceInfo, DeviceResponse, DeviceStatus};

use super::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kasa Cloud Gateway",
        description = "Read-only REST access to the devices registered on a TP-Link Kasa cloud account"
    ),
    paths(
        super::health_check,
        super::list_devices,
        super::get_device,
        super::get_device_status
    ),
    components(schemas(
        DeviceInfo,
        DeviceResponse,
        DeviceStatus,
        ErrorResponse,
        HealthResponse
    )),
    tags(
        (name = "devices", description = "Kasa cloud devices"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// GET /openapi.json
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
