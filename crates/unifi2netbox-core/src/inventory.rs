// ── Inventory collaborator ──
//
// `InventoryApi` is everything the reconciler needs from the system of
// record: get-by-filter returning a tri-state `Lookup`, create, partial
// update, and the device-creation schema. `NetboxClient` implements it
// over REST; tests substitute an in-memory fake.

use std::collections::BTreeSet;
use std::future::Future;
use std::net::IpAddr;

use unifi2netbox_api::NetboxClient;
use unifi2netbox_api::netbox::models::{
    NewDevice, NewDeviceRole, NewDeviceType, NewInterface, NewInterfaceTemplate, NewIpAddress,
    NewManufacturer, NewVrf,
};

use crate::convert;
use crate::error::CoreError;
use crate::lookup::Lookup;
use crate::model::{
    DeviceDraft, DeviceRole, DeviceType, Interface, InventoryDevice, InventorySite, IpAddress,
    IpDraft, Manufacturer, Prefix, Tenant, Vrf,
};

/// Interface type for the management SVI.
pub const VIRTUAL_INTERFACE_TYPE: &str = "virtual";
/// `assigned_object_type` for IPs bound to a device interface.
pub const INTERFACE_OBJECT_TYPE: &str = "dcim.interface";
/// Status given to created IP addresses.
pub const ACTIVE_STATUS: &str = "active";

/// Operations the reconciler performs against the system of record.
///
/// Implementations are shared by every worker of a run, so they must be
/// `Send + Sync` and every returned future must be `Send`.
pub trait InventoryApi: Send + Sync + 'static {
    // ── Run singletons ───────────────────────────────────────────────
    fn manufacturer_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Lookup<Manufacturer>, CoreError>> + Send;

    fn create_manufacturer(
        &self,
        name: &str,
        slug: &str,
    ) -> impl Future<Output = Result<Manufacturer, CoreError>> + Send;

    fn device_role_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Lookup<DeviceRole>, CoreError>> + Send;

    fn create_device_role(
        &self,
        name: &str,
        slug: &str,
    ) -> impl Future<Output = Result<DeviceRole, CoreError>> + Send;

    fn tenant_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Lookup<Tenant>, CoreError>> + Send;

    fn sites(&self) -> impl Future<Output = Result<Vec<InventorySite>, CoreError>> + Send;

    /// Field names accepted when creating a device.
    fn device_create_fields(
        &self,
    ) -> impl Future<Output = Result<BTreeSet<String>, CoreError>> + Send;

    // ── Per-device entities ──────────────────────────────────────────
    fn vrf_by_name(&self, name: &str)
    -> impl Future<Output = Result<Lookup<Vrf>, CoreError>> + Send;

    fn create_vrf(&self, name: &str) -> impl Future<Output = Result<Vrf, CoreError>> + Send;

    fn device_type_by_model(
        &self,
        manufacturer_id: u64,
        model: &str,
    ) -> impl Future<Output = Result<Lookup<DeviceType>, CoreError>> + Send;

    fn create_device_type(
        &self,
        manufacturer_id: u64,
        model: &str,
        slug: &str,
    ) -> impl Future<Output = Result<DeviceType, CoreError>> + Send;

    /// Returns the new template's id.
    fn create_interface_template(
        &self,
        device_type_id: u64,
        name: &str,
        kind: &str,
    ) -> impl Future<Output = Result<u64, CoreError>> + Send;

    fn device_by_serial(
        &self,
        site_id: u64,
        serial: &str,
    ) -> impl Future<Output = Result<Lookup<InventoryDevice>, CoreError>> + Send;

    fn create_device(
        &self,
        draft: &DeviceDraft,
    ) -> impl Future<Output = Result<InventoryDevice, CoreError>> + Send;

    /// Prefixes inside `vrf_id` containing `ip`, in inventory order.
    fn prefixes_containing(
        &self,
        ip: IpAddr,
        vrf_id: u64,
    ) -> impl Future<Output = Result<Vec<Prefix>, CoreError>> + Send;

    fn interface_by_name(
        &self,
        device_id: u64,
        name: &str,
    ) -> impl Future<Output = Result<Lookup<Interface>, CoreError>> + Send;

    /// Create an enabled virtual interface bound to a VRF.
    fn create_interface(
        &self,
        device_id: u64,
        name: &str,
        vrf_id: u64,
    ) -> impl Future<Output = Result<Interface, CoreError>> + Send;

    fn ip_address(
        &self,
        address: &str,
        vrf_id: u64,
        tenant_id: u64,
    ) -> impl Future<Output = Result<Lookup<IpAddress>, CoreError>> + Send;

    fn create_ip_address(
        &self,
        draft: &IpDraft,
    ) -> impl Future<Output = Result<IpAddress, CoreError>> + Send;

    fn set_primary_ip4(
        &self,
        device_id: u64,
        ip_id: u64,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── NetBox implementation ───────────────────────────────────────────

fn lookup<A, T: From<A>>(items: Vec<A>) -> Lookup<T> {
    Lookup::from_vec(items.into_iter().map(T::from).collect())
}

impl InventoryApi for NetboxClient {
    async fn manufacturer_by_slug(&self, slug: &str) -> Result<Lookup<Manufacturer>, CoreError> {
        Ok(lookup(self.manufacturers(&[("slug", slug.to_owned())]).await?))
    }

    async fn create_manufacturer(&self, name: &str, slug: &str) -> Result<Manufacturer, CoreError> {
        let body = NewManufacturer {
            name: name.to_owned(),
            slug: slug.to_owned(),
        };
        Ok(NetboxClient::create_manufacturer(self, &body).await?.into())
    }

    async fn device_role_by_slug(&self, slug: &str) -> Result<Lookup<DeviceRole>, CoreError> {
        Ok(lookup(self.device_roles(&[("slug", slug.to_owned())]).await?))
    }

    async fn create_device_role(&self, name: &str, slug: &str) -> Result<DeviceRole, CoreError> {
        let body = NewDeviceRole {
            name: name.to_owned(),
            slug: slug.to_owned(),
        };
        Ok(NetboxClient::create_device_role(self, &body).await?.into())
    }

    async fn tenant_by_name(&self, name: &str) -> Result<Lookup<Tenant>, CoreError> {
        Ok(lookup(self.tenants(&[("name", name.to_owned())]).await?))
    }

    async fn sites(&self) -> Result<Vec<InventorySite>, CoreError> {
        let sites = NetboxClient::sites(self).await?;
        Ok(sites.into_iter().map(InventorySite::from).collect())
    }

    async fn device_create_fields(&self) -> Result<BTreeSet<String>, CoreError> {
        Ok(NetboxClient::device_create_fields(self).await?)
    }

    async fn vrf_by_name(&self, name: &str) -> Result<Lookup<Vrf>, CoreError> {
        Ok(lookup(self.vrfs(&[("name", name.to_owned())]).await?))
    }

    async fn create_vrf(&self, name: &str) -> Result<Vrf, CoreError> {
        let body = NewVrf {
            name: name.to_owned(),
        };
        Ok(NetboxClient::create_vrf(self, &body).await?.into())
    }

    async fn device_type_by_model(
        &self,
        manufacturer_id: u64,
        model: &str,
    ) -> Result<Lookup<DeviceType>, CoreError> {
        let filters = [
            ("model", model.to_owned()),
            ("manufacturer_id", manufacturer_id.to_string()),
        ];
        Ok(lookup(self.device_types(&filters).await?))
    }

    async fn create_device_type(
        &self,
        manufacturer_id: u64,
        model: &str,
        slug: &str,
    ) -> Result<DeviceType, CoreError> {
        let body = NewDeviceType {
            manufacturer: manufacturer_id,
            model: model.to_owned(),
            slug: slug.to_owned(),
        };
        Ok(NetboxClient::create_device_type(self, &body).await?.into())
    }

    async fn create_interface_template(
        &self,
        device_type_id: u64,
        name: &str,
        kind: &str,
    ) -> Result<u64, CoreError> {
        let body = NewInterfaceTemplate {
            device_type: device_type_id,
            name: name.to_owned(),
            kind: kind.to_owned(),
        };
        Ok(NetboxClient::create_interface_template(self, &body).await?.id)
    }

    async fn device_by_serial(
        &self,
        site_id: u64,
        serial: &str,
    ) -> Result<Lookup<InventoryDevice>, CoreError> {
        let filters = [("site_id", site_id.to_string()), ("serial", serial.to_owned())];
        Ok(lookup(self.devices(&filters).await?))
    }

    async fn create_device(&self, draft: &DeviceDraft) -> Result<InventoryDevice, CoreError> {
        let body = NewDevice {
            name: draft.name.clone(),
            device_type: draft.device_type,
            tenant: draft.tenant,
            site: draft.site,
            serial: draft.serial.clone(),
            role: draft.role,
        };
        Ok(NetboxClient::create_device(self, &body).await?.into())
    }

    async fn prefixes_containing(&self, ip: IpAddr, vrf_id: u64) -> Result<Vec<Prefix>, CoreError> {
        let prefixes = NetboxClient::prefixes_containing(self, &ip.to_string(), vrf_id).await?;
        Ok(prefixes.into_iter().filter_map(convert::prefix).collect())
    }

    async fn interface_by_name(
        &self,
        device_id: u64,
        name: &str,
    ) -> Result<Lookup<Interface>, CoreError> {
        let filters = [("device_id", device_id.to_string()), ("name", name.to_owned())];
        Ok(lookup(self.interfaces(&filters).await?))
    }

    async fn create_interface(
        &self,
        device_id: u64,
        name: &str,
        vrf_id: u64,
    ) -> Result<Interface, CoreError> {
        let body = NewInterface {
            device: device_id,
            name: name.to_owned(),
            kind: VIRTUAL_INTERFACE_TYPE.to_owned(),
            enabled: true,
            vrf: vrf_id,
        };
        Ok(NetboxClient::create_interface(self, &body).await?.into())
    }

    async fn ip_address(
        &self,
        address: &str,
        vrf_id: u64,
        tenant_id: u64,
    ) -> Result<Lookup<IpAddress>, CoreError> {
        let filters = [
            ("address", address.to_owned()),
            ("vrf_id", vrf_id.to_string()),
            ("tenant_id", tenant_id.to_string()),
        ];
        Ok(lookup(self.ip_addresses(&filters).await?))
    }

    async fn create_ip_address(&self, draft: &IpDraft) -> Result<IpAddress, CoreError> {
        let body = NewIpAddress {
            address: draft.address.clone(),
            vrf: draft.vrf,
            tenant: draft.tenant,
            status: ACTIVE_STATUS.to_owned(),
            assigned_object_type: INTERFACE_OBJECT_TYPE.to_owned(),
            assigned_object_id: draft.interface,
        };
        Ok(NetboxClient::create_ip_address(self, &body).await?.into())
    }

    async fn set_primary_ip4(&self, device_id: u64, ip_id: u64) -> Result<(), CoreError> {
        NetboxClient::set_primary_ip4(self, device_id, ip_id).await?;
        Ok(())
    }
}
