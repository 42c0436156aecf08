//! `sync` -- one reconciliation run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use unifi2netbox_api::{NetboxClient, TransportConfig};
use unifi2netbox_config::{Credentials, load_config, load_site_mapping};
use unifi2netbox_core::{Orchestrator, UnifiConnector, prepare_run};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::error::CliError;

/// Load settings, resolve the run singletons, then fan out over every
/// controller. Unit failures are logged and summarized, not returned.
pub async fn handle(args: &SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = load_config(&global.config)?;
    let credentials = Credentials::from_env()?;
    let urls = config.controller_urls()?;
    let netbox_url = config.netbox_url()?;
    let transport = TransportConfig::default();

    debug!("Connecting to NetBox at {netbox_url}");
    let netbox = Arc::new(NetboxClient::new(
        netbox_url.as_str(),
        &credentials.netbox_token,
        &transport,
    )?);

    let bootstrap = prepare_run(netbox.as_ref(), &config.run_settings()).await?;
    let mapping = load_site_mapping(&config, &global.config)?;
    let connector = UnifiConnector::new(credentials.controller_credentials(), transport);
    let orchestrator = Orchestrator::new(connector, netbox, bootstrap, mapping);

    info!("Processing {} controller(s)", urls.len());
    let report = if args.flat {
        orchestrator.run_flat(&urls).await
    } else {
        orchestrator.run(&urls).await
    };

    info!("{} device(s) added to NetBox", report.synced.len());
    if report.has_failures() {
        warn!(
            "{} unit(s) failed; details are in {}",
            report.failures.len(),
            global.log_dir.join("error.log").display()
        );
    }
    Ok(())
}
