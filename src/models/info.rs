//! Device info → JSON flattening

use serde_json::{Map, Value};

use super::Device;

/// Serialize a device's info tree into plain JSON with snake_case keys.
///
/// Typed fields are already snake_case; pass-through fields and anything
/// nested inside them still carry the cloud's camelCase names. Typed fields
/// win if a pass-through key lands on the same name.
pub fn serialize_device_info(device: &Device) -> Value {
    let mut out = match flatten_value(Value::Object(device.extra.clone())) {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    match serde_json::to_value(&device.info) {
        Ok(Value::Object(typed)) => out.extend(typed),
        Ok(_) => {}
        Err(e) => {
            // Only fails on non-string map keys
            tracing::error!("Device info serialization failed: {}", e);
        }
    }

    Value::Object(out)
}

fn flatten_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), flatten_value(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(flatten_value).collect()),
        other => other,
    }
}

/// "deviceHwVer" → "device_hw_ver"; snake_case input is returned unchanged
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceInfo;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("deviceHwVer"), "device_hw_ver");
        assert_eq!(to_snake_case("isSameRegion"), "is_same_region");
        assert_eq!(to_snake_case("macAddress"), "mac_address");
        assert_eq!(to_snake_case("device_mac"), "device_mac");
        assert_eq!(to_snake_case("status"), "status");
        assert_eq!(to_snake_case("fwId"), "fw_id");
    }

    #[test]
    fn test_serialize_typed_fields() {
        let info = DeviceInfo {
            alias: "Living Room".into(),
            device_mac: "AA:BB:CC:DD:EE:FF".into(),
            device_model: "Archer AX50".into(),
            is_same_region: true,
            status: 1,
            ..DeviceInfo::default()
        };

        let value = serialize_device_info(&Device::new(info));
        assert_eq!(value["alias"], "Living Room");
        assert_eq!(value["device_mac"], "AA:BB:CC:DD:EE:FF");
        assert_eq!(value["is_same_region"], true);
        assert_eq!(value["status"], 1);
        assert_eq!(value["device_hw_ver"], "");
    }

    #[test]
    fn test_nested_pass_through_fields_are_snake_cased() {
        let device = Device::from_cloud_record(serde_json::json!({
            "alias": "Strip",
            "childList": [
                {"childId": "00", "childAlias": "Plug 1"},
                {"childId": "01", "childAlias": "Plug 2"}
            ],
            "powerInfo": {"lastOnTime": 1700000000, "tags": ["a", "b"]}
        }))
        .unwrap();

        let value = serialize_device_info(&device);
        assert_eq!(value["alias"], "Strip");
        assert_eq!(value["child_list"][0]["child_alias"], "Plug 1");
        assert_eq!(value["child_list"][1]["child_id"], "01");
        assert_eq!(value["power_info"]["last_on_time"], 1700000000);
        assert_eq!(value["power_info"]["tags"], serde_json::json!(["a", "b"]));
        assert!(value.get("childList").is_none());
    }
}
