// unifi2netbox-api: async clients for the UniFi controller and NetBox APIs

pub mod auth;
pub mod error;
pub mod netbox;
pub mod transport;
pub mod unifi;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use netbox::NetboxClient;
pub use transport::{TlsMode, TransportConfig};
pub use unifi::UnifiClient;
