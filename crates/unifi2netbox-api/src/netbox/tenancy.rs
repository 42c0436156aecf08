// NetBox tenancy endpoints.

use super::client::NetboxClient;
use super::models::Tenant;
use crate::error::Error;

const TENANTS: &str = "tenancy/tenants/";

impl NetboxClient {
    pub async fn tenants(&self, filters: &[(&str, String)]) -> Result<Vec<Tenant>, Error> {
        self.list(TENANTS, filters).await
    }
}
