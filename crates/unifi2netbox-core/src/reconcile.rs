// ── Entity reconciler ──
//
// Upserts one controller device and everything it depends on:
// VRF → device type (+ interface templates) → device → interface → IP →
// primary IP. Every step looks up before it creates, so re-running a sync
// against unchanged state creates nothing. The management interface does
// not depend on the IP, so a device without a usable address still gets
// one.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};

use tracing::{debug, error, info, warn};

use crate::error::CoreError;
use crate::inventory::InventoryApi;
use crate::lookup::Lookup;
use crate::model::inventory::RoleAssignment;
use crate::model::{
    Device, DeviceDraft, DeviceRole, DeviceType, Interface, InventoryDevice, InventorySite,
    IpAddress, IpDraft, Manufacturer, RoleKind, Tenant, Vrf,
};

/// Name of the management interface created on every device.
pub const MANAGEMENT_INTERFACE: &str = "vlan.1";
/// NetBox interface type for copper gigabit ports.
pub const GIGABIT_TEMPLATE_TYPE: &str = "1000base-t";

// ── Capabilities ────────────────────────────────────────────────────

/// Which role key the device serializer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleField {
    /// NetBox 4.x
    Role,
    /// NetBox 3.x
    DeviceRole,
}

/// What the NetBox instance accepts on device creation, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCreateCapabilities {
    role_field: Option<RoleField>,
}

impl DeviceCreateCapabilities {
    /// `role` wins when a version advertises both keys.
    pub fn from_fields(fields: &BTreeSet<String>) -> Self {
        let role_field = if fields.contains("role") {
            Some(RoleField::Role)
        } else if fields.contains("device_role") {
            Some(RoleField::DeviceRole)
        } else {
            None
        };
        Self { role_field }
    }

    pub fn with_role_field(role_field: RoleField) -> Self {
        Self {
            role_field: Some(role_field),
        }
    }

    pub fn role_field(&self) -> Option<RoleField> {
        self.role_field
    }

    /// Role assignment under the negotiated key, or `None` if the schema
    /// exposes neither.
    pub fn assign(&self, role_id: u64) -> Option<RoleAssignment> {
        self.role_field.map(|field| match field {
            RoleField::Role => RoleAssignment::Role(role_id),
            RoleField::DeviceRole => RoleAssignment::DeviceRole(role_id),
        })
    }
}

// ── Run context ─────────────────────────────────────────────────────

/// Singletons resolved before any device is processed. Immutable for
/// the run and shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub manufacturer: Manufacturer,
    pub tenant: Tenant,
    pub wireless_role: DeviceRole,
    pub lan_role: DeviceRole,
    pub capabilities: DeviceCreateCapabilities,
}

impl RunContext {
    pub fn role_kind(device: &Device) -> RoleKind {
        if device.is_wireless() {
            RoleKind::Wireless
        } else {
            RoleKind::Lan
        }
    }

    pub fn role_for(&self, device: &Device) -> &DeviceRole {
        match Self::role_kind(device) {
            RoleKind::Wireless => &self.wireless_role,
            RoleKind::Lan => &self.lan_role,
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Successful end states of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// A device with this serial already exists at the site.
    AlreadyPresent { id: u64 },
    /// Device created and its primary IP assigned.
    Synced {
        id: u64,
        name: String,
        address: String,
    },
}

// ── Reconciliation ──────────────────────────────────────────────────

/// Resolve a lookup to one record, warning when the inventory returned
/// several.
fn first_or_warn<T>(lookup: Lookup<T>, what: impl FnOnce() -> String) -> Option<T> {
    if let Lookup::Ambiguous(items) = &lookup {
        warn!(
            "Multiple {} found ({}). Using 1st one in the list.",
            what(),
            items.len()
        );
    }
    lookup.into_first()
}

/// Reconcile one controller device into NetBox.
///
/// Any step failing aborts the remaining steps for this device only.
/// Skip conditions (missing serial, bad IP, no containing prefix) come
/// back as errors for which [`CoreError::is_skip`] is `true`. A bad IP is
/// caught once the device exists but before its interface is created; a
/// missing prefix leaves both the device and its `vlan.1` interface.
pub async fn reconcile_device<I: InventoryApi>(
    inventory: &I,
    ctx: &RunContext,
    site: &InventorySite,
    device: &Device,
) -> Result<DeviceOutcome, CoreError> {
    info!("Processing device {} at site {}...", device.name, site.name);
    debug!(
        "Device details: Model={}, MAC={}, IP={:?}, Serial={:?}",
        device.model, device.mac, device.ip, device.serial
    );

    let role = ctx.role_for(device);

    let Some(serial) = device.serial() else {
        warn!("Missing serial number for device {}. Skipping...", device.name);
        return Err(CoreError::MissingSerial {
            device: device.name.clone(),
        });
    };

    let vrf = ensure_vrf(inventory, site).await?;
    let device_type = ensure_device_type(inventory, ctx, site, device).await?;

    debug!(
        "Checking if device already exists: {} (serial: {serial})",
        device.name
    );
    if let Some(existing) = inventory.device_by_serial(site.id, serial).await?.into_first() {
        info!(
            "Device {} with serial {serial} already exists. Skipping...",
            device.name
        );
        return Ok(DeviceOutcome::AlreadyPresent { id: existing.id });
    }

    let Some(role) = ctx.capabilities.assign(role.id) else {
        error!(
            "Could not determine the syntax for the role. Skipping device {}, {serial}.",
            device.name
        );
        return Err(CoreError::RoleFieldUnavailable {
            device: device.name.clone(),
            serial: serial.to_owned(),
        });
    };

    let draft = DeviceDraft {
        name: device.name.clone(),
        device_type: device_type.id,
        tenant: ctx.tenant.id,
        site: site.id,
        serial: serial.to_owned(),
        role,
    };
    let created = create_device(inventory, draft, site).await?;

    let Some(ip) = device
        .ip
        .as_deref()
        .and_then(|raw| raw.trim().parse::<Ipv4Addr>().ok())
    else {
        warn!(
            "Invalid IP {} for device {}. Skipping...",
            device.ip.as_deref().unwrap_or("<none>"),
            device.name
        );
        return Err(CoreError::InvalidIp {
            device: device.name.clone(),
            ip: device.ip.clone(),
        });
    };

    let interface = ensure_interface(inventory, &created, &vrf, device, site).await?;

    let prefixes = inventory.prefixes_containing(IpAddr::V4(ip), vrf.id).await?;
    let Some(prefix) = prefixes.first() else {
        warn!(
            "No prefix found for IP {ip} for device {}. Skipping...",
            device.name
        );
        return Err(CoreError::NoPrefix {
            device: device.name.clone(),
            ip: ip.to_string(),
        });
    };
    let address = format!("{ip}/{}", prefix.prefix.prefix_len());

    let ip_address =
        ensure_ip_address(inventory, ctx, &vrf, &interface, &address, device, site).await?;

    inventory.set_primary_ip4(created.id, ip_address.id).await?;
    info!("Device {} with IP {address} added to NetBox.", device.name);

    Ok(DeviceOutcome::Synced {
        id: created.id,
        name: created.name,
        address,
    })
}

async fn ensure_vrf<I: InventoryApi>(
    inventory: &I,
    site: &InventorySite,
) -> Result<Vrf, CoreError> {
    let name = Vrf::name_for_site(&site.name);
    debug!("Checking for existing VRF: {name}");

    let found = inventory.vrf_by_name(&name).await.inspect_err(|e| {
        error!("Failed to get VRF {name} for site {}: {e}. Skipping...", site.name);
    })?;
    if let Some(vrf) = first_or_warn(found, || format!("VRFs with name {name}")) {
        return Ok(vrf);
    }

    debug!("VRF {name} not found, creating new VRF");
    let vrf = inventory.create_vrf(&name).await?;
    info!("VRF {name} with ID {} successfully added to NetBox.", vrf.id);
    Ok(vrf)
}

async fn ensure_device_type<I: InventoryApi>(
    inventory: &I,
    ctx: &RunContext,
    site: &InventorySite,
    device: &Device,
) -> Result<DeviceType, CoreError> {
    let manufacturer = &ctx.manufacturer;
    debug!(
        "Checking for existing device type: {} (manufacturer ID: {})",
        device.model, manufacturer.id
    );

    let found = inventory
        .device_type_by_model(manufacturer.id, &device.model)
        .await?;
    if let Some(device_type) =
        first_or_warn(found, || format!("device types for model {}", device.model))
    {
        return Ok(device_type);
    }

    let slug = slug::slugify(format!("{}-{}", manufacturer.name, device.model));
    let device_type = inventory
        .create_device_type(manufacturer.id, &device.model, &slug)
        .await
        .inspect_err(|e| {
            error!(
                "Failed to create device type for {} at site {}: {e}",
                device.name, site.name
            );
        })?;
    info!(
        "Device type {} with ID {} successfully added to NetBox.",
        device.model, device_type.id
    );

    // Templates only on first creation; a failure here leaves the type usable.
    for port in device.ports.iter().filter(|p| p.is_gigabit()) {
        match inventory
            .create_interface_template(device_type.id, &port.name, GIGABIT_TEMPLATE_TYPE)
            .await
        {
            Ok(id) => info!(
                "Interface template {} with ID {id} successfully added to NetBox.",
                port.name
            ),
            Err(e) => error!(
                "Failed to create interface template for {} at site {}: {e}",
                device.name, site.name
            ),
        }
    }

    Ok(device_type)
}

/// Create the device, retrying once under `<name>_<serial>` when the name
/// is already taken at the site.
async fn create_device<I: InventoryApi>(
    inventory: &I,
    mut draft: DeviceDraft,
    site: &InventorySite,
) -> Result<InventoryDevice, CoreError> {
    debug!("Creating device in NetBox with data: {draft:?}");

    let created = match inventory.create_device(&draft).await {
        Ok(created) => created,
        Err(e) if e.is_name_conflict() => {
            let renamed = format!("{}_{}", draft.name, draft.serial);
            warn!(
                "Device name {} already exists at site {}. Trying with name {renamed}.",
                draft.name, site.name
            );
            draft.name = renamed;
            match inventory.create_device(&draft).await {
                Ok(created) => created,
                Err(e) if e.is_name_conflict() => {
                    error!(
                        "Failed to create device {} serial {} at site {}: {e}",
                        draft.name, draft.serial, site.name
                    );
                    return Err(CoreError::NameConflict {
                        name: draft.name,
                        site: site.name.clone(),
                    });
                }
                Err(e) => return Err(log_device_failure(e, &draft, site)),
            }
        }
        Err(e) => return Err(log_device_failure(e, &draft, site)),
    };

    info!(
        "Device {} serial {} with ID {} successfully added to NetBox.",
        draft.name, draft.serial, created.id
    );
    Ok(created)
}

fn log_device_failure(e: CoreError, draft: &DeviceDraft, site: &InventorySite) -> CoreError {
    error!(
        "Failed to create device {} serial {} at site {}: {e}",
        draft.name, draft.serial, site.name
    );
    e
}

async fn ensure_interface<I: InventoryApi>(
    inventory: &I,
    created: &InventoryDevice,
    vrf: &Vrf,
    device: &Device,
    site: &InventorySite,
) -> Result<Interface, CoreError> {
    let found = inventory
        .interface_by_name(created.id, MANAGEMENT_INTERFACE)
        .await?;
    if let Some(interface) = first_or_warn(found, || {
        format!("interfaces {MANAGEMENT_INTERFACE} on device {}", created.id)
    }) {
        return Ok(interface);
    }

    let interface = inventory
        .create_interface(created.id, MANAGEMENT_INTERFACE, vrf.id)
        .await
        .inspect_err(|e| {
            error!(
                "Failed to create interface {MANAGEMENT_INTERFACE} for device {} at site {}: {e}",
                device.name, site.name
            );
        })?;
    info!(
        "Interface {MANAGEMENT_INTERFACE} for device {} with ID {} successfully added to NetBox.",
        device.name, interface.id
    );
    Ok(interface)
}

async fn ensure_ip_address<I: InventoryApi>(
    inventory: &I,
    ctx: &RunContext,
    vrf: &Vrf,
    interface: &Interface,
    address: &str,
    device: &Device,
    site: &InventorySite,
) -> Result<IpAddress, CoreError> {
    let found = inventory.ip_address(address, vrf.id, ctx.tenant.id).await?;
    if let Some(ip) =
        first_or_warn(found, || format!("IP addresses {address} in VRF {}", vrf.name))
    {
        return Ok(ip);
    }

    let draft = IpDraft {
        address: address.to_owned(),
        vrf: vrf.id,
        tenant: ctx.tenant.id,
        interface: interface.id,
    };
    let ip = inventory.create_ip_address(&draft).await.inspect_err(|e| {
        error!(
            "Failed to create IP address {address} for device {} at site {}: {e}",
            device.name, site.name
        );
    })?;
    info!("IP address {address} with ID {} successfully added to NetBox.", ip.id);
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn capabilities_prefer_role_over_device_role() {
        let both = DeviceCreateCapabilities::from_fields(&fields(&["name", "role", "device_role"]));
        assert_eq!(both.role_field(), Some(RoleField::Role));
        assert_eq!(both.assign(4), Some(RoleAssignment::Role(4)));

        let legacy = DeviceCreateCapabilities::from_fields(&fields(&["name", "device_role"]));
        assert_eq!(legacy.assign(4), Some(RoleAssignment::DeviceRole(4)));
    }

    #[test]
    fn capabilities_without_role_key_cannot_assign() {
        let none = DeviceCreateCapabilities::from_fields(&fields(&["name", "serial"]));
        assert_eq!(none.role_field(), None);
        assert_eq!(none.assign(4), None);
    }
}
