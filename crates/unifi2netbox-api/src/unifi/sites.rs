// UniFi site endpoints
//
// Site listing is controller-scoped (not site-scoped), using
// `/api/self/sites` rather than the usual `/api/s/{site}/...` pattern.

use tracing::debug;

use crate::error::Error;
use crate::unifi::client::UnifiClient;
use crate::unifi::models::UnifiSite;

impl UnifiClient {
    /// List all sites visible to the authenticated user.
    ///
    /// `GET /api/self/sites`
    pub async fn list_sites(&self) -> Result<Vec<UnifiSite>, Error> {
        let url = self.api_url("self/sites")?;
        debug!("listing sites");
        self.get(url).await
    }
}
