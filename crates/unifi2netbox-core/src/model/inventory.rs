// Records held by the NetBox system of record.
//
// Every record carries the NetBox object id; only the fields the
// reconciler reads are kept.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

pub use unifi2netbox_api::netbox::models::RoleAssignment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySite {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRole {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// Which configured role a device gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    Wireless,
    Lan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    pub id: u64,
    pub name: String,
}

impl Vrf {
    /// Deterministic per-site VRF name.
    pub fn name_for_site(site: &str) -> String {
        format!("vrf_{site}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: u64,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDevice {
    pub id: u64,
    pub name: String,
    pub serial: String,
    pub primary_ip4: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    pub id: u64,
    pub prefix: IpNet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress {
    pub id: u64,
    pub address: String,
}

// ── Drafts ───────────────────────────────────────────────────────────

/// Fields for a device about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDraft {
    pub name: String,
    pub device_type: u64,
    pub tenant: u64,
    pub site: u64,
    pub serial: String,
    pub role: RoleAssignment,
}

/// Fields for an IP address about to be created and bound to an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpDraft {
    /// `<ip>/<mask>`.
    pub address: String,
    pub vrf: u64,
    pub tenant: u64,
    pub interface: u64,
}
