//! Data models for the Kasa cloud gateway

mod info;

pub use self::info::serialize_device_info;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

// ============================================================================
// Device Models
// ============================================================================

/// Cloud sends `null` for fields it has no value for; treat that like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Device record as reported by the Kasa cloud `getDeviceList` call.
///
/// The cloud speaks camelCase; the gateway exposes snake_case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct DeviceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "IOT.SMARTPLUGSWITCH")]
    pub device_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: i64,
    /// Firmware version
    #[serde(default, deserialize_with = "null_as_default")]
    pub fw_ver: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub app_server_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_hw_ver: String,
    /// User-assigned name
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_mac: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub oem_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "HS100(US)")]
    pub device_model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hw_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fw_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_same_region: bool,
    /// 1 = online, anything else = offline
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: i64,
}

impl DeviceInfo {
    pub fn is_online(&self) -> bool {
        self.status == 1
    }
}

/// One entry of the cloud `deviceList`: typed fields plus whatever else the cloud sent
#[derive(Debug, Deserialize)]
struct CloudRecord {
    #[serde(flatten)]
    info: DeviceInfo,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Device family, derived from the model string ("HS100(US)" → HS100)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    Hs100,
    Hs103,
    Hs105,
    Hs110,
    Hs200,
    Hs220,
    Hs300,
    Kp115,
    Kp125,
    Kp200,
    Kp303,
    Kp400,
    Kl420l5,
    Kl430,
    Kl50,
    Kl60,
    Kl110,
    Kl120,
    Kl125,
    Kl130,
    Ep10,
    Ep40,
    Es20m,
    Ks230,
    Unknown,
}

impl ModelType {
    const KNOWN: [ModelType; 24] = [
        ModelType::Hs100,
        ModelType::Hs103,
        ModelType::Hs105,
        ModelType::Hs110,
        ModelType::Hs200,
        ModelType::Hs220,
        ModelType::Hs300,
        ModelType::Kp115,
        ModelType::Kp125,
        ModelType::Kp200,
        ModelType::Kp303,
        ModelType::Kp400,
        ModelType::Kl420l5,
        ModelType::Kl430,
        ModelType::Kl50,
        ModelType::Kl60,
        ModelType::Kl110,
        ModelType::Kl120,
        ModelType::Kl125,
        ModelType::Kl130,
        ModelType::Ep10,
        ModelType::Ep40,
        ModelType::Es20m,
        ModelType::Ks230,
    ];

    pub fn from_model(device_model: &str) -> Self {
        let family = device_model
            .split('(')
            .next()
            .unwrap_or_default()
            .trim();

        Self::KNOWN
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(family))
            .unwrap_or(ModelType::Unknown)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelType::Hs100 => "HS100",
            ModelType::Hs103 => "HS103",
            ModelType::Hs105 => "HS105",
            ModelType::Hs110 => "HS110",
            ModelType::Hs200 => "HS200",
            ModelType::Hs220 => "HS220",
            ModelType::Hs300 => "HS300",
            ModelType::Kp115 => "KP115",
            ModelType::Kp125 => "KP125",
            ModelType::Kp200 => "KP200",
            ModelType::Kp303 => "KP303",
            ModelType::Kp400 => "KP400",
            ModelType::Kl420l5 => "KL420L5",
            ModelType::Kl430 => "KL430",
            ModelType::Kl50 => "KL50",
            ModelType::Kl60 => "KL60",
            ModelType::Kl110 => "KL110",
            ModelType::Kl120 => "KL120",
            ModelType::Kl125 => "KL125",
            ModelType::Kl130 => "KL130",
            ModelType::Ep10 => "EP10",
            ModelType::Ep40 => "EP40",
            ModelType::Es20m => "ES20M",
            ModelType::Ks230 => "KS230",
            ModelType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cloud device fetched for the current request
#[derive(Debug, Clone)]
pub struct Device {
    pub model_type: ModelType,
    pub info: DeviceInfo,
    /// Fields the cloud sent that `DeviceInfo` does not name, passed through as-is
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn new(info: DeviceInfo) -> Self {
        Self::with_extra(info, Map::new())
    }

    pub fn with_extra(info: DeviceInfo, extra: Map<String, Value>) -> Self {
        Self {
            model_type: ModelType::from_model(&info.device_model),
            info,
            extra,
        }
    }

    /// Decode one raw `deviceList` entry
    pub fn from_cloud_record(record: Value) -> Result<Self, serde_json::Error> {
        let record: CloudRecord = serde_json::from_value(record)?;
        Ok(Self::with_extra(record.info, record.extra))
    }

    pub fn alias(&self) -> &str {
        &self.info.alias
    }

    /// MAC address of the device: `deviceMac`, falling back to `mac` / `macAddress`
    pub fn mac(&self) -> Option<&str> {
        if !self.info.device_mac.is_empty() {
            return Some(self.info.device_mac.as_str());
        }

        ["mac", "macAddress"]
            .iter()
            .filter_map(|key| self.extra.get(*key).and_then(Value::as_str))
            .find(|mac| !mac.is_empty())
    }
}

// ============================================================================
// API Response Models
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "alias": "Living Room",
    "model_type": "UNKNOWN",
    "info": {
        "device_type": "WIRELESSROUTER",
        "role": 0,
        "fw_ver": "1.0.0 Build 20230101 Rel. 12345",
        "app_server_url": "https://api.tplinkcloud.com",
        "device_region": "us-east-1",
        "device_id": "1234567890ABCDEF1234567890ABCDEF12345678",
        "device_name": "Mock Router 1",
        "device_hw_ver": "1.0",
        "alias": "Living Room",
        "device_mac": "AA:BB:CC:DD:EE:FF",
        "oem_id": "11223344556677889900AABBCCDDEEFF",
        "device_model": "Archer AX50",
        "hw_id": "1A2B3C4D5E6F78901A2B3C4D5E6F7890",
        "fw_id": "9876543210FEDCBA9876543210FEDCBA",
        "is_same_region": true,
        "status": 1
    }
}))]
pub struct DeviceResponse {
    pub alias: String,
    /// Device family name, `UNKNOWN` when the model is not recognized
    pub model_type: String,
    #[schema(value_type = DeviceInfo)]
    pub info: Value,
}

impl From<&Device> for DeviceResponse {
    fn from(device: &Device) -> Self {
        Self {
            alias: device.alias().to_string(),
            model_type: device.model_type.name().to_string(),
            info: serialize_device_info(device),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({"status": "online"}))]
pub struct DeviceStatus {
    pub status: String,
}

impl DeviceStatus {
    pub fn online() -> Self {
        Self {
            status: "online".to_string(),
        }
    }
}
