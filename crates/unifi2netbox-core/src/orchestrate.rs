// ── Concurrency orchestrator ──
//
// Fans a run out over three bounded tiers: controllers → sites → devices.
// Each tier waits for every unit it queued and folds the outcomes into a
// `RunReport`; a failed unit is logged and recorded, never propagated.
// `run_flat` is the two-phase variant: gather every (site, device) pair
// first, then reconcile them all in one global device pool.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::bootstrap::Bootstrap;
use crate::controller::{ControllerConnector, ControllerSession};
use crate::error::CoreError;
use crate::inventory::InventoryApi;
use crate::model::{ControllerSite, Device, InventorySite};
use crate::pool::{CONTROLLER_WORKERS, DEVICE_WORKERS, SITE_WORKERS, UnitResult, WorkerPool};
use crate::reconcile::{DeviceOutcome, RunContext, reconcile_device};
use crate::site_map::{SiteIndex, SiteMapping, match_site};

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Controller,
    Site,
    Device,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Controller => "controller",
            Self::Site => "site",
            Self::Device => "device",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierStats {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TierStats {
    fn add(&mut self, other: Self) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub tier: Tier,
    pub unit: String,
    pub error: String,
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub controllers: TierStats,
    pub sites: TierStats,
    pub devices: TierStats,
    /// Devices created (with primary IP) during this run.
    pub synced: Vec<u64>,
    pub failures: Vec<UnitFailure>,
}

impl RunReport {
    pub fn stats(&self, tier: Tier) -> TierStats {
        match tier {
            Tier::Controller => self.controllers,
            Tier::Site => self.sites,
            Tier::Device => self.devices,
        }
    }

    fn stats_mut(&mut self, tier: Tier) -> &mut TierStats {
        match tier {
            Tier::Controller => &mut self.controllers,
            Tier::Site => &mut self.sites,
            Tier::Device => &mut self.devices,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Count one unit's outcome, returning its value on success.
    fn record<T>(&mut self, tier: Tier, outcome: UnitResult<T>) -> Option<T> {
        let UnitResult { unit, result } = outcome;
        match result {
            Ok(value) => {
                self.stats_mut(tier).processed += 1;
                Some(value)
            }
            Err(e) if e.is_skip() => {
                debug!("Skipped {unit}: {e}");
                self.stats_mut(tier).skipped += 1;
                None
            }
            Err(e) => {
                error!("Error processing {unit}: {e}");
                self.stats_mut(tier).failed += 1;
                self.failures.push(UnitFailure {
                    tier,
                    unit,
                    error: e.to_string(),
                });
                None
            }
        }
    }

    fn record_device(&mut self, outcome: UnitResult<DeviceOutcome>) {
        if let Some(DeviceOutcome::Synced { id, .. }) = self.record(Tier::Device, outcome) {
            self.synced.push(id);
        }
    }

    fn merge(&mut self, other: Self) {
        self.controllers.add(other.controllers);
        self.sites.add(other.sites);
        self.devices.add(other.devices);
        self.synced.extend(other.synced);
        self.failures.extend(other.failures);
    }

    /// One-line summary per tier.
    pub fn summary(&self) -> String {
        [Tier::Controller, Tier::Site, Tier::Device]
            .iter()
            .map(|&tier| {
                let s = self.stats(tier);
                format!(
                    "{tier}s: {} processed, {} skipped, {} failed",
                    s.processed, s.skipped, s.failed
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Orchestrator ────────────────────────────────────────────────────

/// Worker counts per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub controllers: usize,
    pub sites: usize,
    pub devices: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            controllers: CONTROLLER_WORKERS,
            sites: SITE_WORKERS,
            devices: DEVICE_WORKERS,
        }
    }
}

struct Shared<C, I> {
    connector: C,
    inventory: Arc<I>,
    context: Arc<RunContext>,
    sites: SiteIndex,
    mapping: SiteMapping,
    limits: PoolLimits,
}

/// Drives a reconciliation run across every configured controller.
pub struct Orchestrator<C, I> {
    shared: Arc<Shared<C, I>>,
}

impl<C: ControllerConnector, I: InventoryApi> Orchestrator<C, I> {
    pub fn new(
        connector: C,
        inventory: Arc<I>,
        bootstrap: Bootstrap,
        mapping: SiteMapping,
    ) -> Self {
        Self::with_limits(connector, inventory, bootstrap, mapping, PoolLimits::default())
    }

    pub fn with_limits(
        connector: C,
        inventory: Arc<I>,
        bootstrap: Bootstrap,
        mapping: SiteMapping,
        limits: PoolLimits,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                connector,
                inventory,
                context: Arc::new(bootstrap.context),
                sites: bootstrap.sites,
                mapping,
                limits,
            }),
        }
    }

    /// Three-tier run: controllers → sites → devices.
    pub async fn run(&self, urls: &[Url]) -> RunReport {
        let mut pool = WorkerPool::new(self.shared.limits.controllers);
        for url in urls {
            pool.spawn(
                format!("controller {url}"),
                process_controller(Arc::clone(&self.shared), url.clone()),
            );
        }

        let mut report = RunReport::default();
        for outcome in pool.join_all().await {
            if let Some(sub) = report.record(Tier::Controller, outcome) {
                report.merge(sub);
            }
        }
        info!("Run complete. {}", report.summary());
        report
    }

    /// Two-phase run: gather devices from every site of every controller,
    /// then reconcile them in one global device pool.
    pub async fn run_flat(&self, urls: &[Url]) -> RunReport {
        let mut pool = WorkerPool::new(self.shared.limits.controllers);
        for url in urls {
            pool.spawn(
                format!("controller {url}"),
                gather_controller(Arc::clone(&self.shared), url.clone()),
            );
        }

        let mut report = RunReport::default();
        let mut work = Vec::new();
        for outcome in pool.join_all().await {
            if let Some((sub, devices)) = report.record(Tier::Controller, outcome) {
                report.merge(sub);
                work.extend(devices);
            }
        }
        info!("Fetched {} devices. Starting device processing...", work.len());

        let mut devices = WorkerPool::new(self.shared.limits.devices);
        for (site, device) in work {
            spawn_device(&mut devices, &self.shared, site, device);
        }
        for outcome in devices.join_all().await {
            report.record_device(outcome);
        }
        info!("Run complete. {}", report.summary());
        report
    }
}

fn spawn_device<C, I: InventoryApi>(
    pool: &mut WorkerPool<DeviceOutcome>,
    shared: &Arc<Shared<C, I>>,
    site: Arc<InventorySite>,
    device: Device,
) {
    let inventory = Arc::clone(&shared.inventory);
    let context = Arc::clone(&shared.context);
    pool.spawn(
        format!("device {} at site {}", device.name, site.name),
        async move { reconcile_device(&*inventory, &context, &site, &device).await },
    );
}

/// Resolve a controller site to its NetBox site, or the skip error.
fn resolve_site<C, I>(
    shared: &Shared<C, I>,
    site: &ControllerSite,
) -> Result<Arc<InventorySite>, CoreError> {
    match match_site(&site.display_name, &shared.sites, &shared.mapping) {
        Some(found) => Ok(Arc::new(found.clone())),
        None => {
            warn!(
                "No match found for UniFi site: {}. Skipping...",
                site.display_name
            );
            Err(CoreError::SiteNotFound {
                name: site.display_name.clone(),
            })
        }
    }
}

async fn connect<C: ControllerConnector>(
    connector: &C,
    url: &Url,
) -> Result<(C::Session, Vec<ControllerSite>), CoreError> {
    info!("Processing controller {url}...");
    let session = connector.connect(url).await?;
    debug!("UniFi connection established to: {url}");

    match session.list_sites().await {
        Ok(sites) => {
            info!("Found {} sites for controller {url}", sites.len());
            Ok((session, sites))
        }
        Err(e) => {
            session.close().await;
            Err(e)
        }
    }
}

// ── Three-tier path ─────────────────────────────────────────────────

async fn process_controller<C: ControllerConnector, I: InventoryApi>(
    shared: Arc<Shared<C, I>>,
    url: Url,
) -> Result<RunReport, CoreError> {
    let (session, sites) = connect(&shared.connector, &url).await?;
    let session = Arc::new(session);

    let mut pool = WorkerPool::new(shared.limits.sites);
    for site in sites {
        pool.spawn(
            format!("site {}", site.display_name),
            process_site(Arc::clone(&shared), Arc::clone(&session), site),
        );
    }

    let mut report = RunReport::default();
    for outcome in pool.join_all().await {
        if let Some(sub) = report.record(Tier::Site, outcome) {
            report.merge(sub);
        }
    }
    session.close().await;
    Ok(report)
}

async fn process_site<C: ControllerConnector, I: InventoryApi>(
    shared: Arc<Shared<C, I>>,
    session: Arc<C::Session>,
    site: ControllerSite,
) -> Result<RunReport, CoreError> {
    info!("Processing site {}...", site.display_name);
    let inventory_site = resolve_site(&shared, &site)?;

    let devices = session.list_devices(&site).await?;
    debug!("Found {} devices for site {}", devices.len(), site.display_name);

    let mut pool = WorkerPool::new(shared.limits.devices);
    for device in devices {
        spawn_device(&mut pool, &shared, Arc::clone(&inventory_site), device);
    }

    let mut report = RunReport::default();
    for outcome in pool.join_all().await {
        report.record_device(outcome);
    }
    Ok(report)
}

// ── Flat path ───────────────────────────────────────────────────────

type SiteDevices = Vec<(Arc<InventorySite>, Device)>;

async fn gather_controller<C: ControllerConnector, I: InventoryApi>(
    shared: Arc<Shared<C, I>>,
    url: Url,
) -> Result<(RunReport, SiteDevices), CoreError> {
    let (session, sites) = connect(&shared.connector, &url).await?;
    let session = Arc::new(session);

    let mut pool = WorkerPool::new(shared.limits.sites);
    for site in sites {
        let shared = Arc::clone(&shared);
        let session = Arc::clone(&session);
        pool.spawn(format!("site {}", site.display_name), async move {
            let inventory_site = resolve_site(&shared, &site)?;
            info!("Fetching devices for site {}...", site.display_name);
            let devices = session.list_devices(&site).await?;
            debug!("Retrieved {} devices for site: {}", devices.len(), site.display_name);
            Ok(devices
                .into_iter()
                .map(|device| (Arc::clone(&inventory_site), device))
                .collect::<SiteDevices>())
        });
    }

    let mut report = RunReport::default();
    let mut gathered = Vec::new();
    for outcome in pool.join_all().await {
        if let Some(devices) = report.record(Tier::Site, outcome) {
            gathered.extend(devices);
        }
    }
    session.close().await;
    Ok((report, gathered))
}
