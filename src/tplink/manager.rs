//! DeviceManager: request-scoped device lookups
//!
//! Every call fetches the device list fresh from the source. Nothing is cached.

use std::sync::Arc;

use async_trait::async_trait;

use crate::mac::mac_matches;
use crate::models::Device;
use crate::tplink::client::{CloudError, KasaCloudClient};

/// Anything that can produce the account's current device list
#[async_trait]
pub trait DeviceSource: Send + Sync {
    async fn get_devices(&self) -> Result<Vec<Device>, CloudError>;
}

#[async_trait]
impl DeviceSource for KasaCloudClient {
    async fn get_devices(&self) -> Result<Vec<Device>, CloudError> {
        self.get_device_list().await
    }
}

pub struct DeviceManager {
    source: Arc<dyn DeviceSource>,
}

impl DeviceManager {
    pub fn new(source: Arc<dyn DeviceSource>) -> Self {
        Self { source }
    }

    pub async fn list_devices(&self) -> Result<Vec<Device>, CloudError> {
        let devices = self.source.get_devices().await?;
        tracing::debug!("[DeviceManager] Fetched {} devices", devices.len());
        Ok(devices)
    }

    /// Look up a device by MAC, ignoring case and delimiters
    pub async fn get_device_by_mac(&self, mac: &str) -> Result<Option<Device>, CloudError> {
        let devices = self.list_devices().await?;
        Ok(find_by_mac(devices, mac))
    }
}

/// First device whose MAC matches `mac`; devices without a MAC are skipped
pub fn find_by_mac(devices: Vec<Device>, mac: &str) -> Option<Device> {
    devices
        .into_iter()
        .find(|d| d.mac().is_some_and(|m| mac_matches(m, mac)))
}
