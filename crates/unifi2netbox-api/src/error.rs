use thiserror::Error;

/// Marker NetBox puts in the 400 body when a device name collides at a site.
const UNIQUE_NAME_PER_SITE: &str = "must be unique per site";

/// Top-level error type for the `unifi2netbox-api` crate.
///
/// Covers every failure mode of both API surfaces: controller
/// authentication, transport, the UniFi legacy envelope, and NetBox REST.
/// `unifi2netbox-core` maps these into per-unit reconciliation errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The controller kept rejecting the generated TOTP code.
    #[error("Two-factor token rejected after {attempts} attempts")]
    TwoFactorRejected { attempts: u32 },

    /// The MFA secret is not valid base32.
    #[error("Invalid MFA secret: {0}")]
    InvalidMfaSecret(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── UniFi legacy API ────────────────────────────────────────────
    /// Error from the legacy API (parsed from the `{meta: {rc, msg}}` envelope).
    #[error("UniFi API error: {message}")]
    LegacyApi { message: String },

    // ── NetBox ──────────────────────────────────────────────────────
    /// Non-success response from NetBox. `body` keeps the validation payload.
    #[error("NetBox API error (HTTP {status}): {body}")]
    Netbox { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::LegacyApi { message } => {
                message.contains("LoginRequired") || message.contains("SessionExpired")
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` for NetBox's "Device name must be unique per site" rejection.
    pub fn is_unique_name_conflict(&self) -> bool {
        matches!(self, Self::Netbox { status: 400, body } if body.contains(UNIQUE_NAME_PER_SITE))
    }

    /// HTTP status code, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Netbox { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
