//! Reconciliation engine between UniFi controllers and NetBox.
//!
//! - **[`reconcile_device`]** upserts one controller device and its
//!   dependents (VRF, device type, interface, IP address) against an
//!   [`InventoryApi`], looking up before every create.
//!
//! - **[`Orchestrator`]** fans a run out over controllers, sites, and
//!   devices using bounded [`WorkerPool`]s, collecting every unit's
//!   outcome into a [`RunReport`] without letting one failure stop its
//!   siblings.
//!
//! - **[`prepare_run`]** resolves the run singletons (manufacturer,
//!   tenant, roles, NetBox sites, device-create capabilities) once,
//!   before any worker starts.
//!
//! - **[`SiteMapping`]** translates controller site names into NetBox
//!   site names.
//!
//! - **[`audit`]** recovers created-object ids from a sync's INFO log.

pub mod audit;
pub mod bootstrap;
pub mod controller;
pub mod convert;
pub mod error;
pub mod inventory;
pub mod lookup;
pub mod model;
pub mod orchestrate;
pub mod pool;
pub mod reconcile;
pub mod site_map;

// ── Primary re-exports ──────────────────────────────────────────────
pub use audit::{AuditIds, extract_success_ids};
pub use bootstrap::{Bootstrap, RunSettings, prepare_run};
pub use controller::{
    ControllerConnector, ControllerCredentials, ControllerSession, UnifiConnector, UnifiSession,
};
pub use error::CoreError;
pub use inventory::InventoryApi;
pub use lookup::Lookup;
pub use orchestrate::{Orchestrator, PoolLimits, RunReport, Tier, TierStats, UnitFailure};
pub use pool::{UnitResult, WorkerPool};
pub use reconcile::{
    DeviceCreateCapabilities, DeviceOutcome, RoleField, RunContext, reconcile_device,
};
pub use site_map::{SiteIndex, SiteMapping, index_sites, match_site};
