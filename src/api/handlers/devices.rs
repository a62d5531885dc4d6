//! Device API handlers
//!
//! Each request fetches the device list from the cloud exactly once.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::ApiState;
use crate::error::{AppError, ErrorResponse};
use crate::models::{DeviceResponse, DeviceStatus};

const DEVICE_NOT_FOUND: &str = "Device not found";
const DEVICE_OFFLINE: &str = "Device offline or status 0";

/// GET /devices - List every device on the account
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    responses(
        (status = 200, description = "List of devices", body = [DeviceResponse]),
        (status = 502, description = "Cloud request failed", body = ErrorResponse)
    )
)]
pub async fn list_devices(
    State(state): State<ApiState>,
) -> Result<Json<Vec<DeviceResponse>>, AppError> {
    let devices = state.device_manager.list_devices().await?;

    Ok(Json(devices.iter().map(DeviceResponse::from).collect()))
}

/// GET /devices/:mac_addr - Single device by MAC (any case, `:`/`-` or no delimiter)
#[utoipa::path(
    get,
    path = "/devices/{mac_addr}",
    tag = "devices",
    params(("mac_addr" = String, Path, description = "Device MAC; case and delimiters are ignored")),
    responses(
        (status = 200, description = "Device details", body = DeviceResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
        (status = 502, description = "Cloud request failed", body = ErrorResponse)
    )
)]
pub async fn get_device(
    State(state): State<ApiState>,
    Path(mac_addr): Path<String>,
) -> Result<Json<DeviceResponse>, AppError> {
    let device = state
        .device_manager
        .get_device_by_mac(&mac_addr)
        .await?
        .ok_or_else(|| AppError::NotFound(DEVICE_NOT_FOUND.to_string()))?;

    Ok(Json(DeviceResponse::from(&device)))
}

/// GET /devices/:mac_addr/status - 200 when online, 503 otherwise
#[utoipa::path(
    get,
    path = "/devices/{mac_addr}/status",
    tag = "devices",
    params(("mac_addr" = String, Path, description = "Device MAC; case and delimiters are ignored")),
    responses(
        (status = 200, description = "Device status", body = DeviceStatus),
        (status = 404, description = "Device not found", body = ErrorResponse),
        (status = 503, description = "Device offline", body = ErrorResponse,
            example = json!({"error": "Device offline or status 0", "status": 503})),
        (status = 502, description = "Cloud request failed", body = ErrorResponse)
    )
)]
pub async fn get_device_status(
    State(state): State<ApiState>,
    Path(mac_addr): Path<String>,
) -> Result<Json<DeviceStatus>, AppError> {
    let device = state
        .device_manager
        .get_device_by_mac(&mac_addr)
        .await?
        .ok_or_else(|| AppError::NotFound(DEVICE_NOT_FOUND.to_string()))?;

    if !device.info.is_online() {
        tracing::debug!(
            "Device {} reports status {}",
            device.alias(),
            device.info.status
        );
        return Err(AppError::ServiceUnavailable(DEVICE_OFFLINE.to_string()));
    }

    Ok(Json(DeviceStatus::online()))
}
