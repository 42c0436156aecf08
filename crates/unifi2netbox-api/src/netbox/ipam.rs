// NetBox IPAM endpoints: VRFs, prefixes, IP addresses.

use super::client::NetboxClient;
use super::models::{IpAddress, NewIpAddress, NewVrf, Prefix, Vrf};
use crate::error::Error;

const VRFS: &str = "ipam/vrfs/";
const PREFIXES: &str = "ipam/prefixes/";
const IP_ADDRESSES: &str = "ipam/ip-addresses/";

impl NetboxClient {
    pub async fn vrfs(&self, filters: &[(&str, String)]) -> Result<Vec<Vrf>, Error> {
        self.list(VRFS, filters).await
    }

    pub async fn create_vrf(&self, body: &NewVrf) -> Result<Vrf, Error> {
        self.create(VRFS, body).await
    }

    /// Prefixes inside `vrf_id` that contain `ip`.
    pub async fn prefixes_containing(&self, ip: &str, vrf_id: u64) -> Result<Vec<Prefix>, Error> {
        self.list(
            PREFIXES,
            &[("contains", ip.to_owned()), ("vrf_id", vrf_id.to_string())],
        )
        .await
    }

    pub async fn ip_addresses(&self, filters: &[(&str, String)]) -> Result<Vec<IpAddress>, Error> {
        self.list(IP_ADDRESSES, filters).await
    }

    pub async fn create_ip_address(&self, body: &NewIpAddress) -> Result<IpAddress, Error> {
        self.create(IP_ADDRESSES, body).await
    }
}
