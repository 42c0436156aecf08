// NetBox REST client modules
//
// `client` owns transport mechanics (token auth, pagination, error
// mapping); `dcim`, `ipam`, and `tenancy` add typed endpoint methods.

pub mod client;
pub mod dcim;
pub mod ipam;
pub mod models;
pub mod tenancy;

pub use client::NetboxClient;
