//! CLI error types with miette diagnostics.
//!
//! Only run-level problems land here. Per-device, per-site and
//! per-controller failures are reported by the orchestrator and never
//! change the exit code.

use miette::Diagnostic;
use thiserror::Error;

use unifi2netbox_config::ConfigError;
use unifi2netbox_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(unifi2netbox::no_config),
        help(
            "Create it (see config/config.yaml.example) or pass --config <PATH>.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Environment variable {name} is not set")]
    #[diagnostic(
        code(unifi2netbox::missing_env),
        help(
            "Export {name} or add it to a .env file in the working directory.\n\
             Required: UNIFI_USERNAME, UNIFI_PASSWORD, UNIFI_MFA_SECRET, NETBOX_TOKEN"
        )
    )]
    MissingEnv { name: String },

    #[error(transparent)]
    #[diagnostic(code(unifi2netbox::config))]
    Config(ConfigError),

    #[error("Cannot write logs to {path}")]
    #[diagnostic(
        code(unifi2netbox::log_dir),
        help("Check permissions, or choose another directory with --log-dir.")
    )]
    LogDir {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── NetBox / controller ──────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unifi2netbox::auth_failed),
        help("Verify NETBOX_TOKEN and the UniFi credentials, including UNIFI_MFA_SECRET.")
    )]
    AuthFailed { message: String },

    #[error("Could not reach {target}")]
    #[diagnostic(
        code(unifi2netbox::connection_failed),
        help("Check that the URL in the configuration is correct and reachable.")
    )]
    ConnectionFailed {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Run setup failed: {message}")]
    #[diagnostic(
        code(unifi2netbox::bootstrap),
        help("Check NETBOX.TENANT and NETBOX.ROLES against the objects in NetBox.")
    )]
    Bootstrap { message: String },

    #[error("NetBox API error: {0}")]
    #[diagnostic(code(unifi2netbox::api_error))]
    Api(unifi2netbox_api::Error),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error("Cannot read {path}")]
    #[diagnostic(code(unifi2netbox::io))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. }
            | Self::MissingEnv { .. }
            | Self::Config(_)
            | Self::LogDir { .. } => exit_code::CONFIG,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::MissingEnv { name } => Self::MissingEnv { name: name.into() },
            other => Self::Config(other),
        }
    }
}

impl From<unifi2netbox_api::Error> for CliError {
    fn from(err: unifi2netbox_api::Error) -> Self {
        use unifi2netbox_api::Error as ApiError;

        match err {
            ApiError::Authentication { .. }
            | ApiError::TwoFactorRejected { .. }
            | ApiError::InvalidMfaSecret(_)
            | ApiError::Netbox {
                status: 401 | 403, ..
            } => Self::AuthFailed {
                message: err.to_string(),
            },
            ApiError::Transport(e) => Self::ConnectionFailed {
                target: e
                    .url()
                    .map_or_else(|| "NetBox".to_owned(), ToString::to_string),
                source: Box::new(e),
            },
            ApiError::Tls(message) => Self::ConnectionFailed {
                target: "NetBox".into(),
                source: message.into(),
            },
            other => Self::Api(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),
            CoreError::Controller { source, .. } => source.into(),
            CoreError::Bootstrap { message } => Self::Bootstrap { message },
            other => Self::Bootstrap {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn config_problems_exit_with_two() {
        let missing: CliError = ConfigError::NotFound {
            path: PathBuf::from("config/config.yaml"),
        }
        .into();
        assert!(matches!(missing, CliError::NoConfig { .. }));
        assert_eq!(missing.exit_code(), exit_code::CONFIG);

        let env: CliError = ConfigError::MissingEnv {
            name: "NETBOX_TOKEN",
        }
        .into();
        assert_eq!(env.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn rejected_token_is_an_auth_failure() {
        let err: CliError = CoreError::Api(unifi2netbox_api::Error::Netbox {
            status: 403,
            body: "Invalid token".into(),
        })
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn bootstrap_failure_is_general() {
        let err: CliError = CoreError::Bootstrap {
            message: "tenant Acme not found".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(err.to_string(), "Run setup failed: tenant Acme not found");
    }
}
