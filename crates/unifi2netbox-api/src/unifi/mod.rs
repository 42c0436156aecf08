// UniFi controller client modules
//
// Hand-written client for the controller's legacy endpoints. Responses
// are wrapped in the standard `{ meta: { rc, msg }, data: [...] }`
// envelope, which the client strips before returning.

pub mod auth;
pub mod client;
pub mod devices;
pub mod models;
pub mod sites;

pub use client::UnifiClient;
