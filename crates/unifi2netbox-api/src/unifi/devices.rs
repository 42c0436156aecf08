// UniFi device endpoints

use tracing::debug;

use crate::error::Error;
use crate::unifi::client::UnifiClient;
use crate::unifi::models::UnifiDevice;

impl UnifiClient {
    /// List all devices adopted at a site, with their port tables.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self, site: &str) -> Result<Vec<UnifiDevice>, Error> {
        let url = self.site_url(site, "stat/device")?;
        debug!(site, "listing devices");
        self.get(url).await
    }
}
