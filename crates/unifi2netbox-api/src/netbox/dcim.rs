// NetBox DCIM endpoints
//
// Manufacturers, device roles, device types, interface templates,
// devices, interfaces, and sites.

use std::collections::BTreeSet;

use tracing::debug;

use super::client::NetboxClient;
use super::models::{
    Device, DeviceRole, DeviceType, Interface, InterfaceTemplate, Manufacturer, NewDevice,
    NewDeviceRole, NewDeviceType, NewInterface, NewInterfaceTemplate, NewManufacturer, PrimaryIp4,
    Site,
};
use crate::error::Error;

const MANUFACTURERS: &str = "dcim/manufacturers/";
const DEVICE_ROLES: &str = "dcim/device-roles/";
const DEVICE_TYPES: &str = "dcim/device-types/";
const INTERFACE_TEMPLATES: &str = "dcim/interface-templates/";
const DEVICES: &str = "dcim/devices/";
const INTERFACES: &str = "dcim/interfaces/";
const SITES: &str = "dcim/sites/";

impl NetboxClient {
    // ── Manufacturers ────────────────────────────────────────────────

    pub async fn manufacturers(
        &self,
        filters: &[(&str, String)],
    ) -> Result<Vec<Manufacturer>, Error> {
        self.list(MANUFACTURERS, filters).await
    }

    pub async fn create_manufacturer(&self, body: &NewManufacturer) -> Result<Manufacturer, Error> {
        self.create(MANUFACTURERS, body).await
    }

    // ── Device roles ─────────────────────────────────────────────────

    pub async fn device_roles(&self, filters: &[(&str, String)]) -> Result<Vec<DeviceRole>, Error> {
        self.list(DEVICE_ROLES, filters).await
    }

    pub async fn create_device_role(&self, body: &NewDeviceRole) -> Result<DeviceRole, Error> {
        self.create(DEVICE_ROLES, body).await
    }

    // ── Device types ─────────────────────────────────────────────────

    pub async fn device_types(&self, filters: &[(&str, String)]) -> Result<Vec<DeviceType>, Error> {
        self.list(DEVICE_TYPES, filters).await
    }

    pub async fn create_device_type(&self, body: &NewDeviceType) -> Result<DeviceType, Error> {
        self.create(DEVICE_TYPES, body).await
    }

    pub async fn create_interface_template(
        &self,
        body: &NewInterfaceTemplate,
    ) -> Result<InterfaceTemplate, Error> {
        self.create(INTERFACE_TEMPLATES, body).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn devices(&self, filters: &[(&str, String)]) -> Result<Vec<Device>, Error> {
        self.list(DEVICES, filters).await
    }

    pub async fn create_device(&self, body: &NewDevice) -> Result<Device, Error> {
        self.create(DEVICES, body).await
    }

    /// Point a device's `primary_ip4` at an existing IP address.
    pub async fn set_primary_ip4(&self, device_id: u64, ip_id: u64) -> Result<Device, Error> {
        debug!(device_id, ip_id, "setting primary IPv4");
        self.update(DEVICES, device_id, &PrimaryIp4 { primary_ip4: ip_id })
            .await
    }

    /// Writable fields of the device serializer on this NetBox version.
    pub async fn device_create_fields(&self) -> Result<BTreeSet<String>, Error> {
        self.postable_fields(DEVICES).await
    }

    // ── Interfaces ───────────────────────────────────────────────────

    pub async fn interfaces(&self, filters: &[(&str, String)]) -> Result<Vec<Interface>, Error> {
        self.list(INTERFACES, filters).await
    }

    pub async fn create_interface(&self, body: &NewInterface) -> Result<Interface, Error> {
        self.create(INTERFACES, body).await
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub async fn sites(&self) -> Result<Vec<Site>, Error> {
        self.list(SITES, &[]).await
    }
}
