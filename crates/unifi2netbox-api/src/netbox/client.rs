// Hand-crafted async HTTP client for the NetBox REST API.
//
// Base path: /api/
// Auth: `Authorization: Token <token>` header

use std::collections::BTreeSet;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::Page;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Async client for the NetBox REST API.
///
/// Cheap to share behind an `Arc`: the inner `reqwest::Client` pools
/// connections across every concurrent caller.
pub struct NetboxClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NetboxClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects `Authorization: Token <token>` as a default header.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends in `/api/` so relative joins land there.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        Ok(url)
    }

    /// The normalized `/api/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an endpoint path (e.g. `"dcim/devices/"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Generic verbs ────────────────────────────────────────────────

    /// List every object matching `filters`, following `next` links.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let url = self.url(path)?;
        debug!("GET {url} filters={filters:?}");

        let resp = self.http.get(url).query(filters).send().await?;
        let mut page: Page<T> = handle_response(resp).await?;
        let mut results = std::mem::take(&mut page.results);

        while let Some(next) = page.next.take() {
            debug!("GET {next}");
            let resp = self.http.get(next.as_str()).send().await?;
            page = handle_response(resp).await?;
            results.append(&mut page.results);
        }

        Ok(results)
    }

    /// Create one object.
    pub async fn create<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    /// Partially update one object by id.
    pub async fn update<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        id: u64,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&format!("{path}{id}/"))?;
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        handle_response(resp).await
    }

    /// Field names accepted on `POST` to an endpoint.
    ///
    /// Read from the `actions.POST` map of an `OPTIONS` response, which is
    /// how NetBox advertises its writable serializer fields per version.
    pub async fn postable_fields(&self, path: &str) -> Result<BTreeSet<String>, Error> {
        let url = self.url(path)?;
        debug!("OPTIONS {url}");

        let resp = self.http.request(reqwest::Method::OPTIONS, url).send().await?;
        let schema: serde_json::Value = handle_response(resp).await?;
        let fields: BTreeSet<String> = schema
            .pointer("/actions/POST")
            .and_then(serde_json::Value::as_object)
            .map(|post| post.keys().cloned().collect())
            .unwrap_or_default();

        debug!(count = fields.len(), "retrieved POST-able fields");
        Ok(fields)
    }
}

/// Map non-success statuses to `Error::Netbox`, keeping the body so callers
/// can inspect validation messages.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Netbox {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
