// Admin API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, HTTP Basic auth, and
// `{ success, ... }` envelope unwrapping. Endpoint groups (lists,
// blocklists, statistics, network) live in sibling files as inherent
// methods so this module stays focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::admin::models::ActionReply;
use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// The envelope every appliance response shares.
///
/// The payload fields sit next to `success`, so they are captured with
/// `flatten` and decoded into the caller's type afterwards.
#[derive(serde::Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: serde_json::Map<String, serde_json::Value>,
}

/// Raw HTTP client for the appliance's JSON API.
///
/// The admin service and the network dashboard speak the same envelope and
/// auth scheme, so one client type serves both; point a second instance at
/// the dashboard's base URL when it runs on a separate port.
///
/// Credentials are cached for the lifetime of the client and attached to
/// every request. A 401 surfaces as [`Error::Authentication`]; clearing and
/// re-prompting is the session layer's job.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: RwLock<Option<Credentials>>,
}

impl AdminClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the service root, e.g. `http://192.168.1.2:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            credentials: RwLock::new(None),
        }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Credential cache ─────────────────────────────────────────────

    /// Cache credentials for subsequent requests.
    pub fn set_credentials(&self, credentials: Credentials) {
        debug!(username = credentials.username(), "caching credentials");
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }

    /// Drop the cached credentials.
    pub fn clear_credentials(&self) {
        debug!("clearing cached credentials");
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(creds) => creds.apply(builder),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an absolute API path such as `/api/blacklist/7`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Path of one record under `root`, optionally followed by an action
    /// segment: `/api/blocklists/3/toggle`.
    ///
    /// Ids come from user input, so anything that is not a plain
    /// alphanumeric token is refused before a request is built. The id is
    /// still pushed as a single encoded segment.
    pub(crate) fn item_path(
        root: &str,
        id: &impl std::fmt::Display,
        action: Option<&str>,
    ) -> Result<String, Error> {
        let id = id.to_string();
        let plain = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(Error::InvalidId { id });
        }

        let mut scratch = Url::parse("http://appliance.invalid")?;
        scratch
            .path_segments_mut()
            .map_err(|()| Error::InvalidId { id: id.clone() })?
            .extend(root.split('/').filter(|s| !s.is_empty()))
            .push(&id)
            .extend(action);
        Ok(scratch.path().to_owned())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.get_query(path, &[]).await
    }

    /// Send a GET request with query parameters and unwrap the envelope.
    pub(crate) async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} {query:?}");

        let builder = self.apply_auth(self.http.get(url).query(query));
        let resp = builder.send().await.map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let builder = self.apply_auth(self.http.post(url).json(body));
        let resp = builder.send().await.map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Send a body-less POST (actions such as toggle or cleanup).
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} {query:?}");

        let builder = self.apply_auth(self.http.post(url).query(query));
        let resp = builder.send().await.map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Send a PUT request with a JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let builder = self.apply_auth(self.http.put(url).json(body));
        let resp = builder.send().await.map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete(&self, path: &str) -> Result<ActionReply, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let builder = self.apply_auth(self.http.delete(url));
        let resp = builder.send().await.map_err(Error::Transport)?;

        self.parse_envelope(resp).await
    }

    /// Check `success` before trusting the payload.
    ///
    /// The appliance reports failures as `{success:false, error}`, often
    /// with a 4xx/5xx status. That message wins over the bare status so the
    /// user sees what the backend said. A 401 is always an auth failure,
    /// whatever the body.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "invalid or missing credentials".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(status = status.as_u16(), bytes = body.len(), "response body received");

        let envelope = match serde_json::from_str::<Envelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                let preview = &body[..floor_char_boundary(&body, 200)];
                return Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                });
            }
            Err(_) => {
                return Err(Error::Http {
                    status: status.as_u16(),
                    path,
                    body,
                });
            }
        };

        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "request rejected by appliance");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_value(serde_json::Value::Object(envelope.payload)).map_err(|e| {
            Error::Deserialization {
                message: e.to_string(),
                body,
            }
        })
    }
}

/// Largest index `<= max` that sits on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
