// Network dashboard endpoints
//
// Served by the dashboard service, which may listen on a different port
// than the admin API. Construct a separate `AdminClient` for it when so.

use serde::Deserialize;

use crate::admin::client::AdminClient;
use crate::admin::models::{Device, NetworkStats};
use crate::error::Error;

#[derive(Deserialize)]
struct DevicesPayload {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Deserialize)]
struct StatsPayload {
    #[serde(default)]
    stats: NetworkStats,
}

/// Result of `GET /api/refresh`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeaseRefresh {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_devices: u64,
}

impl AdminClient {
    /// Current DHCP leases.
    ///
    /// `GET /api/devices`
    pub async fn devices(&self) -> Result<Vec<Device>, Error> {
        let payload: DevicesPayload = self.get("/api/devices").await?;
        Ok(payload.devices)
    }

    /// `GET /api/stats`
    pub async fn network_stats(&self) -> Result<NetworkStats, Error> {
        let payload: StatsPayload = self.get("/api/stats").await?;
        Ok(payload.stats)
    }

    /// Drop the dashboard's lease cache and re-read it.
    ///
    /// `GET /api/refresh`
    pub async fn refresh_leases(&self) -> Result<LeaseRefresh, Error> {
        self.get("/api/refresh").await
    }
}
