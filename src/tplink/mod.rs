//! TP-Link Kasa cloud integration module
//!
//! - `client`: Low-level cloud client (login, token reuse, device list)
//! - `manager`: Request-scoped lookups over a `DeviceSource`

pub mod client;
pub mod manager;

pub use client::{CloudError, KasaCloudClient};
pub use manager::{DeviceManager, DeviceSource};
