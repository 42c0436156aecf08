// NetBox API object and request types
//
// Read models carry only the fields the sync needs; NetBox returns far
// more. Write models serialize to the exact JSON NetBox validates.

use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

/// Paginated list response: `{ count, next, previous, results }`.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// Brief nested representation of a related object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedRef {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

// ── Read models ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRole {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vrf {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: u64,
    pub model: String,
    #[serde(default)]
    pub manufacturer: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceTemplate {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub primary_ip4: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub device: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefix {
    pub id: u64,
    /// CIDR notation, e.g. `"10.0.0.0/24"`.
    pub prefix: String,
    #[serde(default)]
    pub vrf: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAddress {
    pub id: u64,
    /// Address with mask, e.g. `"10.0.0.5/24"`.
    pub address: String,
}

// ── Write models ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NewManufacturer {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDeviceRole {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVrf {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDeviceType {
    pub manufacturer: u64,
    pub model: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInterfaceTemplate {
    pub device_type: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The role key on device creation was renamed across NetBox versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoleAssignment {
    /// NetBox 4.x: `"role": <id>`.
    #[serde(rename = "role")]
    Role(u64),
    /// NetBox 3.x: `"device_role": <id>`.
    #[serde(rename = "device_role")]
    DeviceRole(u64),
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDevice {
    pub name: String,
    pub device_type: u64,
    pub tenant: u64,
    pub site: u64,
    pub serial: String,
    #[serde(flatten)]
    pub role: RoleAssignment,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInterface {
    pub device: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    pub vrf: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewIpAddress {
    pub address: String,
    pub vrf: u64,
    pub tenant: u64,
    pub status: String,
    pub assigned_object_type: String,
    pub assigned_object_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrimaryIp4 {
    pub primary_ip4: u64,
}
