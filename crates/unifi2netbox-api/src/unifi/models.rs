// UniFi legacy API response types
//
// Fields use `#[serde(default)]` liberally because the API is inconsistent
// about field presence across firmware versions.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site entry from `/api/self/sites`.
///
/// `name` is the internal reference used in `/api/s/{name}/...` paths;
/// `desc` is the human-facing label shown in the controller UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiSite {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `stat/device`.
///
/// Only the fields needed for inventory sync are modelled; everything else
/// lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    /// Present on some controller builds, as either a bool or a string.
    #[serde(default)]
    pub is_access_point: Option<serde_json::Value>,
    #[serde(default)]
    pub port_table: Vec<UnifiPort>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a device's `port_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiPort {
    #[serde(default)]
    pub port_idx: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    /// Physical media, e.g. `"GE"`, `"SFP+"`.
    #[serde(default)]
    pub media: Option<String>,
}
