// UniFi controller authentication
//
// Cookie-based session login with a TOTP second factor, plus controller
// platform detection. The login endpoint sets a session cookie in the
// client's jar; subsequent requests use that cookie automatically.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::unifi::client::{UnifiClient, preview};
use crate::unifi::models::Meta;

/// Login attempts before giving up (covers both transport and 2FA retries).
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

const INVALID_2FA_TOKEN: &str = "api.err.Invalid2FAToken";
const INVALID_CREDENTIALS: &str = "api.err.Invalid";

#[derive(serde::Deserialize)]
struct LoginReply {
    meta: Meta,
}

/// Build the RFC 6238 generator the controller expects (SHA-1, 6 digits, 30s).
fn totp_generator(mfa_secret: &SecretString) -> Result<TOTP, Error> {
    let encoded = mfa_secret
        .expose_secret()
        .replace(' ', "")
        .to_ascii_uppercase();
    let bytes = Secret::Encoded(encoded)
        .to_bytes()
        .map_err(|e| Error::InvalidMfaSecret(format!("{e:?}")))?;
    Ok(TOTP::new_unchecked(Algorithm::SHA1, 6, 1, 30, bytes))
}

fn clock_error(e: std::time::SystemTimeError) -> Error {
    Error::Authentication {
        message: format!("system clock error while generating TOTP: {e}"),
    }
}

impl UnifiClient {
    /// Authenticate with username, password, and the current TOTP code.
    ///
    /// A rejected 2FA token waits for the next TOTP window and retries;
    /// transport failures retry immediately. Both share
    /// [`MAX_LOGIN_ATTEMPTS`].
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
        mfa_secret: &SecretString,
    ) -> Result<(), Error> {
        let totp = totp_generator(mfa_secret)?;
        let url = self.base_url().join(self.platform().login_path())?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(attempt, max = MAX_LOGIN_ATTEMPTS, "logging in at {}", url);

            let token = totp.generate_current().map_err(clock_error)?;
            let body = json!({
                "username": username,
                "password": password.expose_secret(),
                "ubic_2fa_token": token,
            });

            let resp = match self.http().post(url.clone()).json(&body).send().await {
                Ok(resp) => resp,
                Err(e) if attempt < MAX_LOGIN_ATTEMPTS => {
                    warn!(error = %e, attempt, "login request failed, retrying");
                    continue;
                }
                Err(e) => return Err(Error::Transport(e)),
            };

            let status = resp.status();
            let text = resp.text().await?;
            let meta = serde_json::from_str::<LoginReply>(&text)
                .ok()
                .map(|reply| reply.meta);

            match meta {
                Some(meta) if meta.rc == "ok" => {
                    info!("Logged in successfully to {}", self.base_url());
                    return Ok(());
                }
                Some(meta) if meta.msg.as_deref() == Some(INVALID_2FA_TOKEN) => {
                    if attempt >= MAX_LOGIN_ATTEMPTS {
                        return Err(Error::TwoFactorRejected { attempts: attempt });
                    }
                    let wait = totp.ttl().map_err(clock_error)?;
                    warn!("Invalid 2FA token detected. Next token available in {wait}s.");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                Some(meta) if meta.msg.as_deref() == Some(INVALID_CREDENTIALS) => {
                    return Err(Error::Authentication {
                        message: "invalid credentials".into(),
                    });
                }
                Some(meta) => {
                    return Err(Error::Authentication {
                        message: meta.msg.unwrap_or_else(|| format!("rc={}", meta.rc)),
                    });
                }
                // UniFi OS answers a successful login with the user object, not an envelope.
                None if status.is_success() => {
                    info!("Logged in successfully to {}", self.base_url());
                    return Ok(());
                }
                None => {
                    return Err(Error::Authentication {
                        message: format!("login failed (HTTP {status}): {}", preview(&text)),
                    });
                }
            }
        }
    }

    /// End the current session.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.base_url().join(self.platform().logout_path())?;
        debug!("logging out at {}", url);
        let _resp = self.http().post(url).send().await?;
        Ok(())
    }

    /// Auto-detect the controller platform by probing login endpoints.
    ///
    /// UniFi OS answers `/api/auth/login` with anything but 404 (even
    /// 401/405); standalone controllers don't have that path at all.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;

        let unifi_os_url = base_url.join(ControllerPlatform::UnifiOs.login_path())?;
        debug!("probing UniFi OS at {}", unifi_os_url);

        if let Ok(resp) = http.get(unifi_os_url).send().await {
            if resp.status() != reqwest::StatusCode::NOT_FOUND {
                debug!("detected UniFi OS platform");
                return Ok(ControllerPlatform::UnifiOs);
            }
        }

        let standalone_url = base_url.join(ControllerPlatform::ClassicController.login_path())?;
        debug!("probing standalone at {}", standalone_url);

        match http.get(standalone_url).send().await {
            Ok(_) => {
                debug!("detected standalone (classic) controller");
                Ok(ControllerPlatform::ClassicController)
            }
            Err(e) => Err(Error::Transport(e)),
        }
    }
}
