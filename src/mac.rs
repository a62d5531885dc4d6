//! MAC address helpers
//!
//! The cloud reports MACs in whatever form the device firmware uses
//! ("AA:BB:CC:DD:EE:FF", "aa-bb-cc-dd-ee-ff", "AABBCCDDEEFF"), and callers
//! type them however they like. Lookups compare the normalized form.

/// Normalize MAC address: lowercase, no separators (e.g. "AA:BB:CC:DD:EE:FF" → "aabbccddeeff")
pub fn normalize_mac(mac: &str) -> String {
    mac.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Case- and delimiter-insensitive MAC comparison. Empty MACs never match.
pub fn mac_matches(candidate: &str, wanted: &str) -> bool {
    let candidate = normalize_mac(candidate);
    !candidate.is_empty() && candidate == normalize_mac(wanted)
}
