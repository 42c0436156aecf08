// ── Domain model ──
//
// Controller-side records (what UniFi reports) and inventory-side records
// (what NetBox holds). Both are plain data; conversion from the raw API
// types lives in `crate::convert`.

pub mod controller;
pub mod inventory;

pub use controller::{ControllerSite, Device, Port};
pub use inventory::{
    DeviceDraft, DeviceRole, DeviceType, Interface, InventoryDevice, InventorySite, IpAddress,
    IpDraft, Manufacturer, Prefix, RoleKind, Tenant, Vrf,
};
