// Shared fakes for the reconciliation tests: an in-memory NetBox that
// records every create call, and a scripted controller.
#![allow(clippy::unwrap_used, dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use url::Url;

use unifi2netbox_api::Error as ApiError;
use unifi2netbox_core::model::inventory::RoleAssignment;
use unifi2netbox_core::model::{
    ControllerSite, Device, DeviceDraft, DeviceRole, DeviceType, Interface, InventoryDevice,
    InventorySite, IpAddress, IpDraft, Manufacturer, Port, Prefix, Tenant, Vrf,
};
use unifi2netbox_core::{ControllerConnector, ControllerSession, CoreError, InventoryApi, Lookup};

// ── Inventory fake ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredDevice {
    pub device: InventoryDevice,
    pub site: u64,
    pub role: RoleAssignment,
}

#[derive(Debug, Clone)]
pub struct StoredInterface {
    pub interface: Interface,
    pub device: u64,
    pub vrf: u64,
}

#[derive(Debug, Clone)]
pub struct StoredIp {
    pub ip: IpAddress,
    pub vrf: u64,
    pub tenant: u64,
    pub interface: u64,
}

#[derive(Debug, Default)]
pub struct State {
    next_id: u64,
    pub manufacturers: Vec<Manufacturer>,
    pub roles: Vec<DeviceRole>,
    pub tenants: Vec<Tenant>,
    pub sites: Vec<InventorySite>,
    pub vrfs: Vec<Vrf>,
    pub device_types: Vec<(u64, DeviceType)>,
    pub templates: Vec<(u64, String, String)>,
    pub devices: Vec<StoredDevice>,
    pub prefixes: Vec<(u64, Prefix)>,
    pub interfaces: Vec<StoredInterface>,
    pub ips: Vec<StoredIp>,
    /// Every create call, by entity kind.
    pub creates: Vec<&'static str>,
    pub device_fields: BTreeSet<String>,
    /// Serials whose device creation fails with a server error.
    pub failing_serials: HashSet<String>,
    /// Models whose device-type creation fails with a server error.
    pub failing_models: HashSet<String>,
    /// Port names whose interface-template creation fails.
    pub failing_templates: HashSet<String>,
}

impl State {
    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct FakeInventory {
    state: Mutex<State>,
}

fn server_error(what: &str) -> CoreError {
    CoreError::Api(ApiError::Netbox {
        status: 500,
        body: format!("simulated failure creating {what}"),
    })
}

impl FakeInventory {
    /// NetBox with tenant "Acme", the given sites, and a 4.x device schema.
    pub fn with_sites(names: &[&str]) -> Self {
        let fake = Self::default();
        {
            let mut s = fake.state.lock().unwrap();
            let id = s.id();
            s.tenants.push(Tenant {
                id,
                name: "Acme".into(),
            });
            for name in names {
                let id = s.id();
                s.sites.push(InventorySite {
                    id,
                    name: (*name).into(),
                });
            }
            s.device_fields = ["name", "role", "serial", "site", "tenant", "device_type"]
                .into_iter()
                .map(String::from)
                .collect();
        }
        fake
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn site(&self, name: &str) -> InventorySite {
        self.state()
            .sites
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .unwrap()
    }

    pub fn vrf(&self, name: &str) -> Vrf {
        self.state()
            .vrfs
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .unwrap()
    }

    /// Add a VRF directly (not counted as a create).
    pub fn seed_vrf(&self, name: &str) -> Vrf {
        let mut s = self.state();
        let vrf = Vrf {
            id: s.id(),
            name: name.into(),
        };
        s.vrfs.push(vrf.clone());
        vrf
    }

    /// Add a prefix inside a VRF (not counted as a create).
    pub fn seed_prefix(&self, vrf_id: u64, cidr: &str) {
        let mut s = self.state();
        let id = s.id();
        s.prefixes.push((
            vrf_id,
            Prefix {
                id,
                prefix: cidr.parse().unwrap(),
            },
        ));
    }

    pub fn set_device_fields(&self, fields: &[&str]) {
        self.state().device_fields = fields.iter().map(|f| (*f).to_owned()).collect();
    }

    pub fn fail_device(&self, serial: &str) {
        self.state().failing_serials.insert(serial.to_owned());
    }

    pub fn fail_device_type(&self, model: &str) {
        self.state().failing_models.insert(model.to_owned());
    }

    pub fn fail_template(&self, port: &str) {
        self.state().failing_templates.insert(port.to_owned());
    }

    pub fn create_count(&self) -> usize {
        self.state().creates.len()
    }

    pub fn creates_of(&self, kind: &str) -> usize {
        self.state().creates.iter().filter(|k| **k == kind).count()
    }

    pub fn device_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .state()
            .devices
            .iter()
            .map(|d| d.device.name.clone())
            .collect();
        names.sort();
        names
    }
}

impl InventoryApi for FakeInventory {
    async fn manufacturer_by_slug(&self, slug: &str) -> Result<Lookup<Manufacturer>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.manufacturers.iter().filter(|m| m.slug == slug).cloned().collect(),
        ))
    }

    async fn create_manufacturer(&self, name: &str, slug: &str) -> Result<Manufacturer, CoreError> {
        let mut s = self.state();
        let m = Manufacturer {
            id: s.id(),
            name: name.into(),
            slug: slug.into(),
        };
        s.manufacturers.push(m.clone());
        s.creates.push("manufacturer");
        Ok(m)
    }

    async fn device_role_by_slug(&self, slug: &str) -> Result<Lookup<DeviceRole>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.roles.iter().filter(|r| r.slug == slug).cloned().collect(),
        ))
    }

    async fn create_device_role(&self, name: &str, slug: &str) -> Result<DeviceRole, CoreError> {
        let mut s = self.state();
        let r = DeviceRole {
            id: s.id(),
            name: name.into(),
            slug: slug.into(),
        };
        s.roles.push(r.clone());
        s.creates.push("device_role");
        Ok(r)
    }

    async fn tenant_by_name(&self, name: &str) -> Result<Lookup<Tenant>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.tenants.iter().filter(|t| t.name == name).cloned().collect(),
        ))
    }

    async fn sites(&self) -> Result<Vec<InventorySite>, CoreError> {
        Ok(self.state().sites.clone())
    }

    async fn device_create_fields(&self) -> Result<BTreeSet<String>, CoreError> {
        Ok(self.state().device_fields.clone())
    }

    async fn vrf_by_name(&self, name: &str) -> Result<Lookup<Vrf>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.vrfs.iter().filter(|v| v.name == name).cloned().collect(),
        ))
    }

    async fn create_vrf(&self, name: &str) -> Result<Vrf, CoreError> {
        let mut s = self.state();
        let v = Vrf {
            id: s.id(),
            name: name.into(),
        };
        s.vrfs.push(v.clone());
        s.creates.push("vrf");
        Ok(v)
    }

    async fn device_type_by_model(
        &self,
        manufacturer_id: u64,
        model: &str,
    ) -> Result<Lookup<DeviceType>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.device_types
                .iter()
                .filter(|(m, t)| *m == manufacturer_id && t.model == model)
                .map(|(_, t)| t.clone())
                .collect(),
        ))
    }

    async fn create_device_type(
        &self,
        manufacturer_id: u64,
        model: &str,
        _slug: &str,
    ) -> Result<DeviceType, CoreError> {
        let mut s = self.state();
        if s.failing_models.contains(model) {
            return Err(server_error("device type"));
        }
        let t = DeviceType {
            id: s.id(),
            model: model.into(),
        };
        s.device_types.push((manufacturer_id, t.clone()));
        s.creates.push("device_type");
        Ok(t)
    }

    async fn create_interface_template(
        &self,
        device_type_id: u64,
        name: &str,
        kind: &str,
    ) -> Result<u64, CoreError> {
        let mut s = self.state();
        if s.failing_templates.contains(name) {
            return Err(server_error("interface template"));
        }
        let id = s.id();
        s.templates.push((device_type_id, name.into(), kind.into()));
        s.creates.push("interface_template");
        Ok(id)
    }

    async fn device_by_serial(
        &self,
        site_id: u64,
        serial: &str,
    ) -> Result<Lookup<InventoryDevice>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.devices
                .iter()
                .filter(|d| d.site == site_id && d.device.serial == serial)
                .map(|d| d.device.clone())
                .collect(),
        ))
    }

    async fn create_device(&self, draft: &DeviceDraft) -> Result<InventoryDevice, CoreError> {
        let mut s = self.state();
        if s.failing_serials.contains(&draft.serial) {
            return Err(server_error("device"));
        }
        if s
            .devices
            .iter()
            .any(|d| d.site == draft.site && d.device.name == draft.name)
        {
            return Err(CoreError::Api(ApiError::Netbox {
                status: 400,
                body: r#"{"__all__":["Device name must be unique per site."]}"#.into(),
            }));
        }
        let device = InventoryDevice {
            id: s.id(),
            name: draft.name.clone(),
            serial: draft.serial.clone(),
            primary_ip4: None,
        };
        s.devices.push(StoredDevice {
            device: device.clone(),
            site: draft.site,
            role: draft.role,
        });
        s.creates.push("device");
        Ok(device)
    }

    async fn prefixes_containing(&self, ip: IpAddr, vrf_id: u64) -> Result<Vec<Prefix>, CoreError> {
        let s = self.state();
        Ok(s.prefixes
            .iter()
            .filter(|(vrf, p)| *vrf == vrf_id && p.prefix.contains(&ip))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn interface_by_name(
        &self,
        device_id: u64,
        name: &str,
    ) -> Result<Lookup<Interface>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.interfaces
                .iter()
                .filter(|i| i.device == device_id && i.interface.name == name)
                .map(|i| i.interface.clone())
                .collect(),
        ))
    }

    async fn create_interface(
        &self,
        device_id: u64,
        name: &str,
        vrf_id: u64,
    ) -> Result<Interface, CoreError> {
        let mut s = self.state();
        let interface = Interface {
            id: s.id(),
            name: name.into(),
        };
        s.interfaces.push(StoredInterface {
            interface: interface.clone(),
            device: device_id,
            vrf: vrf_id,
        });
        s.creates.push("interface");
        Ok(interface)
    }

    async fn ip_address(
        &self,
        address: &str,
        vrf_id: u64,
        tenant_id: u64,
    ) -> Result<Lookup<IpAddress>, CoreError> {
        let s = self.state();
        Ok(Lookup::from_vec(
            s.ips
                .iter()
                .filter(|i| i.ip.address == address && i.vrf == vrf_id && i.tenant == tenant_id)
                .map(|i| i.ip.clone())
                .collect(),
        ))
    }

    async fn create_ip_address(&self, draft: &IpDraft) -> Result<IpAddress, CoreError> {
        let mut s = self.state();
        let ip = IpAddress {
            id: s.id(),
            address: draft.address.clone(),
        };
        s.ips.push(StoredIp {
            ip: ip.clone(),
            vrf: draft.vrf,
            tenant: draft.tenant,
            interface: draft.interface,
        });
        s.creates.push("ip_address");
        Ok(ip)
    }

    async fn set_primary_ip4(&self, device_id: u64, ip_id: u64) -> Result<(), CoreError> {
        let mut s = self.state();
        let stored = s
            .devices
            .iter_mut()
            .find(|d| d.device.id == device_id)
            .ok_or_else(|| server_error("primary ip"))?;
        stored.device.primary_ip4 = Some(ip_id);
        Ok(())
    }
}

// ── Controller fake ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub name: String,
    pub devices: Vec<Device>,
    pub fail_listing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeController {
    pub sites: Vec<FakeSite>,
    pub fail_connect: bool,
}

#[derive(Debug, Default)]
pub struct FakeConnector {
    controllers: HashMap<String, Arc<FakeController>>,
}

impl FakeConnector {
    pub fn with(mut self, url: &Url, controller: FakeController) -> Self {
        self.controllers
            .insert(url.to_string(), Arc::new(controller));
        self
    }
}

pub struct FakeSession {
    controller: Arc<FakeController>,
}

impl ControllerConnector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self, url: &Url) -> Result<FakeSession, CoreError> {
        let unreachable = || CoreError::Controller {
            url: url.to_string(),
            source: ApiError::Authentication {
                message: "invalid credentials".into(),
            },
        };
        let controller = self.controllers.get(url.as_str()).ok_or_else(unreachable)?;
        if controller.fail_connect {
            return Err(unreachable());
        }
        Ok(FakeSession {
            controller: Arc::clone(controller),
        })
    }
}

impl ControllerSession for FakeSession {
    async fn list_sites(&self) -> Result<Vec<ControllerSite>, CoreError> {
        Ok(self
            .controller
            .sites
            .iter()
            .map(|s| ControllerSite {
                display_name: s.name.clone(),
                internal_name: s.name.to_lowercase(),
            })
            .collect())
    }

    async fn list_devices(&self, site: &ControllerSite) -> Result<Vec<Device>, CoreError> {
        let found = self
            .controller
            .sites
            .iter()
            .find(|s| s.name == site.display_name)
            .ok_or_else(|| CoreError::SiteNotFound {
                name: site.display_name.clone(),
            })?;
        if found.fail_listing {
            return Err(CoreError::Api(ApiError::LegacyApi {
                message: "api.err.NoSiteContext".into(),
            }));
        }
        Ok(found.devices.clone())
    }

    async fn close(&self) {}
}

// ── Builders ────────────────────────────────────────────────────────

pub fn device(name: &str, serial: &str, ip: &str) -> Device {
    Device {
        name: name.into(),
        model: "U6-Lite".into(),
        mac: format!("aa:bb:cc:{serial}"),
        ip: Some(ip.into()),
        serial: Some(serial.into()),
        is_access_point: Some("true".into()),
        ports: vec![Port {
            name: "Port 1".into(),
            media: Some("GE".into()),
        }],
    }
}

pub fn switch(name: &str, serial: &str, ip: &str) -> Device {
    Device {
        model: "USW-24".into(),
        is_access_point: Some("false".into()),
        ports: vec![
            Port {
                name: "Port 1".into(),
                media: Some("GE".into()),
            },
            Port {
                name: "Port 2".into(),
                media: Some("GE".into()),
            },
            Port {
                name: "SFP+ 1".into(),
                media: Some("SFP+".into()),
            },
        ],
        ..device(name, serial, ip)
    }
}

pub fn url(host: &str) -> Url {
    Url::parse(&format!("https://{host}:8443")).unwrap()
}
