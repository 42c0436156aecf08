// ── API-to-domain type conversions ──
//
// Bridges raw `unifi2netbox_api` response types into `crate::model`
// records. Each impl fills defaults for fields the APIs leave out.

use tracing::warn;

use unifi2netbox_api::netbox::models as nb;
use unifi2netbox_api::unifi::models::{UnifiDevice, UnifiPort, UnifiSite};

use crate::model::{
    ControllerSite, Device, DeviceRole, DeviceType, Interface, InventoryDevice, InventorySite,
    IpAddress, Manufacturer, Port, Prefix, Tenant, Vrf,
};

/// UniFi `type` value for access points.
const ACCESS_POINT_TYPE: &str = "uap";

// ── Controller side ─────────────────────────────────────────────────

impl From<UnifiSite> for ControllerSite {
    fn from(site: UnifiSite) -> Self {
        let display_name = site
            .desc
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| site.name.clone());
        Self {
            display_name,
            internal_name: site.name,
        }
    }
}

impl From<UnifiPort> for Port {
    fn from(port: UnifiPort) -> Self {
        let name = port.name.unwrap_or_else(|| match port.port_idx {
            Some(idx) => format!("Port {idx}"),
            None => String::new(),
        });
        Self {
            name,
            media: port.media,
        }
    }
}

/// Normalize the access-point flag to a string, falling back to the
/// device type when the controller omits it.
fn access_point_flag(raw: Option<serde_json::Value>, device_type: &str) -> String {
    match raw {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => (device_type == ACCESS_POINT_TYPE).to_string(),
    }
}

impl From<UnifiDevice> for Device {
    fn from(d: UnifiDevice) -> Self {
        let is_access_point = access_point_flag(d.is_access_point, &d.device_type);
        Self {
            name: d.name.unwrap_or_else(|| d.mac.clone()),
            model: d.model.unwrap_or_default(),
            mac: d.mac,
            ip: d.ip,
            serial: d.serial,
            is_access_point: Some(is_access_point),
            ports: d.port_table.into_iter().map(Port::from).collect(),
        }
    }
}

// ── Inventory side ──────────────────────────────────────────────────

impl From<nb::Site> for InventorySite {
    fn from(s: nb::Site) -> Self {
        Self {
            id: s.id,
            name: s.name,
        }
    }
}

impl From<nb::Tenant> for Tenant {
    fn from(t: nb::Tenant) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}

impl From<nb::Manufacturer> for Manufacturer {
    fn from(m: nb::Manufacturer) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

impl From<nb::DeviceRole> for DeviceRole {
    fn from(r: nb::DeviceRole) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
        }
    }
}

impl From<nb::Vrf> for Vrf {
    fn from(v: nb::Vrf) -> Self {
        Self {
            id: v.id,
            name: v.name,
        }
    }
}

impl From<nb::DeviceType> for DeviceType {
    fn from(t: nb::DeviceType) -> Self {
        Self {
            id: t.id,
            model: t.model,
        }
    }
}

impl From<nb::Device> for InventoryDevice {
    fn from(d: nb::Device) -> Self {
        Self {
            id: d.id,
            name: d.name.unwrap_or_default(),
            serial: d.serial,
            primary_ip4: d.primary_ip4.map(|ip| ip.id),
        }
    }
}

impl From<nb::Interface> for Interface {
    fn from(i: nb::Interface) -> Self {
        Self {
            id: i.id,
            name: i.name,
        }
    }
}

impl From<nb::IpAddress> for IpAddress {
    fn from(ip: nb::IpAddress) -> Self {
        Self {
            id: ip.id,
            address: ip.address,
        }
    }
}

/// Parse a NetBox prefix, dropping (and logging) anything that is not CIDR.
pub(crate) fn prefix(p: nb::Prefix) -> Option<Prefix> {
    match p.prefix.parse() {
        Ok(prefix) => Some(Prefix { id: p.id, prefix }),
        Err(e) => {
            warn!(id = p.id, prefix = %p.prefix, error = %e, "ignoring unparseable prefix");
            None
        }
    }
}
