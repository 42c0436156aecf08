// ── Controller collaborator ──
//
// `ControllerConnector` authenticates against one controller URL and
// yields a `ControllerSession` that lists sites and devices. The UniFi
// implementation re-authenticates once when the session cookie expires
// mid-run.

use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, warn};
use url::Url;

use unifi2netbox_api::{TransportConfig, UnifiClient};

use crate::error::CoreError;
use crate::model::{ControllerSite, Device};

/// Opens authenticated sessions to controllers.
pub trait ControllerConnector: Send + Sync + 'static {
    type Session: ControllerSession;

    fn connect(&self, url: &Url) -> impl Future<Output = Result<Self::Session, CoreError>> + Send;
}

/// An authenticated handle to one controller.
pub trait ControllerSession: Send + Sync + 'static {
    fn list_sites(&self) -> impl Future<Output = Result<Vec<ControllerSite>, CoreError>> + Send;

    fn list_devices(
        &self,
        site: &ControllerSite,
    ) -> impl Future<Output = Result<Vec<Device>, CoreError>> + Send;

    /// End the session. Failures are logged, not returned.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

// ── UniFi implementation ────────────────────────────────────────────

/// Login credentials shared by every configured controller.
#[derive(Debug, Clone)]
pub struct ControllerCredentials {
    pub username: String,
    pub password: SecretString,
    pub mfa_secret: SecretString,
}

pub struct UnifiConnector {
    credentials: Arc<ControllerCredentials>,
    transport: TransportConfig,
}

impl UnifiConnector {
    pub fn new(credentials: ControllerCredentials, transport: TransportConfig) -> Self {
        Self {
            credentials: Arc::new(credentials),
            transport,
        }
    }
}

impl ControllerConnector for UnifiConnector {
    type Session = UnifiSession;

    async fn connect(&self, url: &Url) -> Result<UnifiSession, CoreError> {
        let wrap = |source| CoreError::Controller {
            url: url.to_string(),
            source,
        };

        let platform = UnifiClient::detect_platform(url, &self.transport)
            .await
            .map_err(wrap)?;
        debug!(controller = %url, ?platform, "detected controller platform");

        let client = UnifiClient::new(url.clone(), platform, &self.transport).map_err(wrap)?;
        let session = UnifiSession {
            client,
            credentials: Arc::clone(&self.credentials),
        };
        session.login().await?;
        Ok(session)
    }
}

pub struct UnifiSession {
    client: UnifiClient,
    credentials: Arc<ControllerCredentials>,
}

impl UnifiSession {
    async fn login(&self) -> Result<(), CoreError> {
        let creds = &self.credentials;
        self.client
            .login(&creds.username, &creds.password, &creds.mfa_secret)
            .await
            .map_err(|e| self.wrap(e))
    }

    fn wrap(&self, source: unifi2netbox_api::Error) -> CoreError {
        CoreError::Controller {
            url: self.client.base_url().to_string(),
            source,
        }
    }

    /// Run `op`; on an expired session, log in again and retry once.
    async fn with_reauth<T, F, Fut>(&self, op: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, unifi2netbox_api::Error>> + Send,
        T: Send,
    {
        match op().await {
            Err(e) if e.is_auth_expired() => {
                warn!(
                    controller = %self.client.base_url(),
                    error = %e,
                    "session expired, re-authenticating"
                );
                self.login().await?;
                op().await.map_err(|e| self.wrap(e))
            }
            other => other.map_err(|e| self.wrap(e)),
        }
    }
}

impl ControllerSession for UnifiSession {
    async fn list_sites(&self) -> Result<Vec<ControllerSite>, CoreError> {
        let sites = self.with_reauth(|| self.client.list_sites()).await?;
        Ok(sites.into_iter().map(ControllerSite::from).collect())
    }

    async fn list_devices(&self, site: &ControllerSite) -> Result<Vec<Device>, CoreError> {
        let devices = self
            .with_reauth(|| self.client.list_devices(&site.internal_name))
            .await?;
        Ok(devices.into_iter().map(Device::from).collect())
    }

    async fn close(&self) {
        if let Err(e) = self.client.logout().await {
            warn!(controller = %self.client.base_url(), error = %e, "logout failed");
        }
    }
}
