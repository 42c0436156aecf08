//! Configuration for unifi2netbox.
//!
//! YAML settings (controller URLs, NetBox URL, tenant, role names, inline
//! site mappings), credentials from the environment, and the optional
//! `site_mapping.yaml` file layered under the inline mappings.

use std::fs;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format, Serialized, Yaml},
};
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use unifi2netbox_core::{ControllerCredentials, RunSettings, SiteMapping};

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
/// Mapping file name, looked up next to the config file.
pub const SITE_MAPPING_FILE: &str = "site_mapping.yaml";

const DEFAULT_SITE_MAPPING: &str = "\
# Site mapping configuration
# Format: unifi_site_name: netbox_site_name
\"Default\": \"Default\"
";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("environment variable {name} is missing or empty")]
    MissingEnv { name: &'static str },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── YAML config structs ─────────────────────────────────────────────

/// Top-level YAML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    #[serde(default)]
    pub unifi: UnifiSection,
    #[serde(default)]
    pub netbox: NetboxSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UnifiSection {
    /// Controller base URLs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: Vec<String>,

    /// Layer `site_mapping.yaml` under the inline mappings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub use_site_mapping: bool,

    /// Controller site name → NetBox site name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_mappings: IndexMap<String, String>,
}

/// A key present with no value (`SITE_MAPPINGS:` with every entry
/// commented out) reads as YAML null; treat it like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NetboxSection {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub roles: Roles,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Roles {
    #[serde(default)]
    pub wireless: String,
    #[serde(default)]
    pub lan: String,
}

impl Config {
    /// Check required keys and URL syntax.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unifi.urls.is_empty() {
            return Err(invalid("UNIFI.URLS", "at least one controller URL is required"));
        }
        self.controller_urls()?;
        self.netbox_url()?;

        for (field, value) in [
            ("NETBOX.TENANT", &self.netbox.tenant),
            ("NETBOX.ROLES.WIRELESS", &self.netbox.roles.wireless),
            ("NETBOX.ROLES.LAN", &self.netbox.roles.lan),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "value is required"));
            }
        }
        Ok(())
    }

    pub fn controller_urls(&self) -> Result<Vec<Url>, ConfigError> {
        self.unifi
            .urls
            .iter()
            .map(|raw| {
                Url::parse(raw).map_err(|e| invalid("UNIFI.URLS", format!("{raw}: {e}")))
            })
            .collect()
    }

    pub fn netbox_url(&self) -> Result<Url, ConfigError> {
        if self.netbox.url.trim().is_empty() {
            return Err(invalid("NETBOX.URL", "value is required"));
        }
        Url::parse(&self.netbox.url)
            .map_err(|e| invalid("NETBOX.URL", format!("{}: {e}", self.netbox.url)))
    }

    /// Names of the run singletons.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            tenant: self.netbox.tenant.clone(),
            wireless_role: self.netbox.roles.wireless.clone(),
            lan_role: self.netbox.roles.lan.clone(),
        }
    }
}

// ── Config loading ──────────────────────────────────────────────────

/// Load and validate the YAML config at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Loading configuration from {}", path.display());

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path))
        .extract()?;
    config.validate()?;
    Ok(config)
}

// ── Credentials ─────────────────────────────────────────────────────

pub const ENV_UNIFI_USERNAME: &str = "UNIFI_USERNAME";
pub const ENV_UNIFI_PASSWORD: &str = "UNIFI_PASSWORD";
pub const ENV_UNIFI_MFA_SECRET: &str = "UNIFI_MFA_SECRET";
pub const ENV_NETBOX_TOKEN: &str = "NETBOX_TOKEN";

/// Secrets for both systems. Never read from the config file.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub unifi_username: String,
    pub unifi_password: SecretString,
    pub unifi_mfa_secret: SecretString,
    pub netbox_token: SecretString,
}

impl Credentials {
    /// Read credentials from the process environment, after loading a
    /// `.env` file from the working directory if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv { name })
        };

        Ok(Self {
            unifi_username: require(ENV_UNIFI_USERNAME)?,
            unifi_password: SecretString::from(require(ENV_UNIFI_PASSWORD)?),
            unifi_mfa_secret: SecretString::from(require(ENV_UNIFI_MFA_SECRET)?),
            netbox_token: SecretString::from(require(ENV_NETBOX_TOKEN)?),
        })
    }

    pub fn controller_credentials(&self) -> ControllerCredentials {
        ControllerCredentials {
            username: self.unifi_username.clone(),
            password: SecretString::from(self.unifi_password.expose_secret().to_owned()),
            mfa_secret: SecretString::from(self.unifi_mfa_secret.expose_secret().to_owned()),
        }
    }
}

// ── Site mapping file ───────────────────────────────────────────────

/// `site_mapping.yaml` in the same directory as the config file.
pub fn site_mapping_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(SITE_MAPPING_FILE)
}

/// Build the run's site mapping: inline entries, plus the mapping file
/// when `USE_SITE_MAPPING` is set.
///
/// A missing mapping file is created with a single `Default` entry. A
/// malformed one is logged and contributes nothing.
pub fn load_site_mapping(config: &Config, config_path: &Path) -> Result<SiteMapping, ConfigError> {
    let inline = config.unifi.site_mappings.clone();
    debug!("Loaded {} site mappings from config.yaml", inline.len());

    if !config.unifi.use_site_mapping {
        return Ok(SiteMapping::layered(inline, None));
    }

    let path = site_mapping_path(config_path);
    debug!("Loading site mapping from file: {}", path.display());
    if !path.exists() {
        warn!(
            "Site mapping file not found at {}. Creating a default one.",
            path.display()
        );
        write_default_mapping(&path)?;
    }

    let file = read_mapping_file(&path)?;
    Ok(SiteMapping::layered(inline, Some(file)))
}

fn write_default_mapping(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_SITE_MAPPING)?;
    Ok(())
}

fn read_mapping_file(path: &Path) -> Result<IndexMap<String, String>, ConfigError> {
    let text = fs::read_to_string(path)?;
    match serde_yaml::from_str::<Option<IndexMap<String, String>>>(&text) {
        Ok(entries) => {
            let entries = entries.unwrap_or_default();
            debug!("Loaded {} mappings from {SITE_MAPPING_FILE}", entries.len());
            Ok(entries)
        }
        Err(e) => {
            error!("Error loading site mapping file: {e}");
            Ok(IndexMap::new())
        }
    }
}
