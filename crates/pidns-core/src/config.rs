// ── Runtime connection configuration ──
//
// Describes how to reach the appliance. Carries credential data and
// connection tuning but never touches disk; the CLI builds a
// `SessionConfig` from its profile and hands it in.

use std::sync::Arc;
use std::time::Duration;

use pidns_api::{AdminClient, Credentials, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Default auto-refresh period for dashboard-style pages.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for talking to one appliance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Admin API base URL (e.g. `http://192.168.1.2:8080`).
    pub url: Url,
    /// Network dashboard base URL when it runs as a separate service.
    pub dashboard_url: Option<Url>,
    /// Pre-seeded credentials. `None` means prompt on the first 401.
    pub credentials: Option<Credentials>,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub refresh_interval: Duration,
}

impl SessionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            dashboard_url: None,
            credentials: None,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// Build the admin API client, seeded with any configured credentials.
    pub fn admin_client(&self) -> Result<Arc<AdminClient>, CoreError> {
        self.client_for(self.url.clone())
    }

    /// Build the dashboard client; falls back to the admin URL.
    pub fn dashboard_client(&self) -> Result<Arc<AdminClient>, CoreError> {
        self.client_for(self.dashboard_url.clone().unwrap_or_else(|| self.url.clone()))
    }

    fn client_for(&self, url: Url) -> Result<Arc<AdminClient>, CoreError> {
        let client = AdminClient::new(url, &self.transport())?;
        if let Some(creds) = &self.credentials {
            client.set_credentials(creds.clone());
        }
        Ok(Arc::new(client))
    }
}
