// ── Core error types ──
//
// Per-unit failures of a reconciliation run. Each variant is terminal for
// the narrowest affected unit (one device, one site, or one controller);
// none of them abort sibling work. The `From<unifi2netbox_api::Error>` impl
// keeps the transport error intact so callers can still ask NetBox-specific
// questions of it (e.g. name conflicts).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Device skips ─────────────────────────────────────────────────
    #[error("Missing serial number for device {device}")]
    MissingSerial { device: String },

    #[error("Invalid IP {ip:?} for device {device}")]
    InvalidIp { device: String, ip: Option<String> },

    #[error("No prefix found for IP {ip} for device {device}")]
    NoPrefix { device: String, ip: String },

    // ── Device failures ──────────────────────────────────────────────
    #[error("Could not determine the role field for device creation (device {device}, serial {serial})")]
    RoleFieldUnavailable { device: String, serial: String },

    #[error("Device name {name} is still not unique at site {site}")]
    NameConflict { name: String, site: String },

    // ── Upstream errors ──────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] unifi2netbox_api::Error),

    #[error("Controller {url}: {source}")]
    Controller {
        url: String,
        #[source]
        source: unifi2netbox_api::Error,
    },

    #[error("Site {name} not found")]
    SiteNotFound { name: String },

    // ── Run-level ────────────────────────────────────────────────────
    #[error("Worker for {unit} panicked")]
    WorkerPanicked { unit: String },

    #[error("Bootstrap failed: {message}")]
    Bootstrap { message: String },
}

impl CoreError {
    /// `true` for outcomes that leave a unit intentionally untouched rather
    /// than broken.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::MissingSerial { .. }
                | Self::InvalidIp { .. }
                | Self::NoPrefix { .. }
                | Self::SiteNotFound { .. }
        )
    }

    /// `true` when NetBox rejected a device name as already taken at its site.
    pub fn is_name_conflict(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unique_name_conflict())
    }

    /// `true` if the controller session needs re-authentication.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Api(e) | Self::Controller { source: e, .. } => e.is_auth_expired(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> unifi2netbox_api::Error {
        unifi2netbox_api::Error::Netbox {
            status: 400,
            body: r#"{"__all__":["Device name must be unique per site."]}"#.into(),
        }
    }

    #[test]
    fn skips_are_distinguished_from_failures() {
        assert!(CoreError::MissingSerial { device: "ap".into() }.is_skip());
        assert!(
            CoreError::NoPrefix {
                device: "ap".into(),
                ip: "10.0.0.1".into()
            }
            .is_skip()
        );
        assert!(
            !CoreError::RoleFieldUnavailable {
                device: "ap".into(),
                serial: "S".into()
            }
            .is_skip()
        );
        assert!(!CoreError::from(conflict()).is_skip());
    }

    #[test]
    fn name_conflict_is_seen_through_api_wrapper() {
        assert!(CoreError::from(conflict()).is_name_conflict());
        assert!(
            !CoreError::NameConflict {
                name: "ap".into(),
                site: "HQ".into()
            }
            .is_name_conflict()
        );
    }
}
