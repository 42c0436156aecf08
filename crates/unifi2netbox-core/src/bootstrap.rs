// ── Run bootstrap ──
//
// Resolves (or creates) the singletons every device needs before any
// worker starts: manufacturer, tenant, both device roles, the NetBox site
// index, and the device-creation capabilities. Failures here abort the
// run.

use tracing::{debug, info};

use crate::error::CoreError;
use crate::inventory::InventoryApi;
use crate::model::{DeviceRole, Manufacturer};
use crate::reconcile::{DeviceCreateCapabilities, RunContext};
use crate::site_map::{SiteIndex, index_sites};

pub const MANUFACTURER_NAME: &str = "Ubiquity Networks";
pub const MANUFACTURER_SLUG: &str = "ubiquity";

/// Names from configuration that identify the run singletons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub tenant: String,
    pub wireless_role: String,
    pub lan_role: String,
}

/// Everything resolved before processing starts.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub context: RunContext,
    pub sites: SiteIndex,
}

pub async fn prepare_run<I: InventoryApi>(
    inventory: &I,
    settings: &RunSettings,
) -> Result<Bootstrap, CoreError> {
    let tenant = inventory
        .tenant_by_name(&settings.tenant)
        .await?
        .into_first()
        .ok_or_else(|| CoreError::Bootstrap {
            message: format!("tenant {} not found in NetBox", settings.tenant),
        })?;
    debug!(tenant = %tenant.name, id = tenant.id, "resolved tenant");

    let wireless_role = ensure_role(inventory, &settings.wireless_role, "Wireless").await?;
    let lan_role = ensure_role(inventory, &settings.lan_role, "LAN").await?;

    debug!("Fetching all NetBox sites");
    let sites = index_sites(inventory.sites().await?);
    debug!("Prepared {} NetBox sites for mapping", sites.len());

    let manufacturer = ensure_manufacturer(inventory).await?;

    let fields = inventory.device_create_fields().await?;
    debug!("Retrieved {} POST-able device fields", fields.len());
    let capabilities = DeviceCreateCapabilities::from_fields(&fields);
    debug!(role_field = ?capabilities.role_field(), "negotiated device create capabilities");

    Ok(Bootstrap {
        context: RunContext {
            manufacturer,
            tenant,
            wireless_role,
            lan_role,
            capabilities,
        },
        sites,
    })
}

async fn ensure_role<I: InventoryApi>(
    inventory: &I,
    name: &str,
    label: &str,
) -> Result<DeviceRole, CoreError> {
    let slug = slug::slugify(name);
    if let Some(role) = inventory.device_role_by_slug(&slug).await?.into_first() {
        return Ok(role);
    }
    let role = inventory.create_device_role(name, &slug).await?;
    info!("{label} role {name} with ID {} successfully added to NetBox.", role.id);
    Ok(role)
}

async fn ensure_manufacturer<I: InventoryApi>(inventory: &I) -> Result<Manufacturer, CoreError> {
    if let Some(found) = inventory
        .manufacturer_by_slug(MANUFACTURER_SLUG)
        .await?
        .into_first()
    {
        return Ok(found);
    }
    let created = inventory
        .create_manufacturer(MANUFACTURER_NAME, MANUFACTURER_SLUG)
        .await?;
    info!(
        "Ubiquity manufacturer with ID {} successfully added to NetBox.",
        created.id
    );
    Ok(created)
}
