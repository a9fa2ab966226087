// ── Network dashboard ──
//
// Devices and summary counters are fetched together on every refresh.
// Either call failing means nothing is rendered from that round.

use chrono::{DateTime, Utc};
use pidns_api::models::{Device, NetworkStats};
use tracing::{debug, warn};

use crate::format::format_time;
use crate::refresh::Refreshable;
use crate::session::AdminSession;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load network data. Please try again.";
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required to access the dashboard";
pub const NO_DEVICES_MESSAGE: &str = "No devices currently connected";

/// One row of the device list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeviceRow {
    pub name: String,
    pub mac: String,
    pub ip: String,
    pub vendor: String,
    pub connected: String,
    pub active: bool,
}

impl DeviceRow {
    pub fn status(&self) -> &'static str {
        if self.active { "Active" } else { "Inactive" }
    }
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d
                .hostname
                .clone()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "Unknown".into()),
            mac: d.mac.clone(),
            ip: d.ip.clone(),
            vendor: d.vendor.clone(),
            connected: d.duration.clone(),
            active: d.is_active(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum NetworkStatus {
    #[strum(serialize = "Active")]
    Active,
    #[strum(serialize = "No devices")]
    NoDevices,
}

/// What the device area currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    /// Nothing loaded yet.
    Loading,
    Error(String),
    Devices(Vec<DeviceRow>),
    Empty,
}

impl DashboardView {
    /// The single message shown in place of a device list, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Loading => Some("Loading devices..."),
            Self::Error(msg) => Some(msg),
            Self::Empty => Some(NO_DEVICES_MESSAGE),
            Self::Devices(_) => None,
        }
    }
}

pub struct NetworkDashboard {
    session: AdminSession,
    view: DashboardView,
    stats: Option<NetworkStats>,
    last_update: Option<DateTime<Utc>>,
}

impl NetworkDashboard {
    pub fn new(session: AdminSession) -> Self {
        Self {
            session,
            view: DashboardView::Loading,
            stats: None,
            last_update: None,
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn stats(&self) -> Option<&NetworkStats> {
        self.stats.as_ref()
    }

    pub fn network_status(&self) -> Option<NetworkStatus> {
        self.stats.as_ref().map(|s| {
            if s.total_devices > 0 {
                NetworkStatus::Active
            } else {
                NetworkStatus::NoDevices
            }
        })
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_update_label(&self) -> Option<String> {
        self.last_update
            .map(|t| format!("Last updated: {}", format_time(t)))
    }

    /// Fetch devices and stats concurrently and render both, or neither.
    ///
    /// A 401 from either call prompts for credentials once and leaves the
    /// view untouched when new ones are supplied. The user refreshes again
    /// to retry.
    pub async fn refresh(&mut self) -> bool {
        let _loading = self.session.loading();
        let client = self.session.client();
        let (devices, stats) = tokio::join!(client.devices(), client.network_stats());

        let (devices, stats) = match (devices, stats) {
            (Ok(devices), Ok(stats)) => (devices, stats),
            (devices, stats) => {
                let errors: Vec<pidns_api::Error> =
                    [devices.err(), stats.err()].into_iter().flatten().collect();
                for e in &errors {
                    warn!(error = %e, "dashboard fetch failed");
                }
                if errors.iter().any(pidns_api::Error::is_auth_expired) {
                    if !self.session.reauthenticate() {
                        self.view = DashboardView::Error(AUTH_REQUIRED_MESSAGE.into());
                    }
                } else {
                    self.view = DashboardView::Error(LOAD_FAILED_MESSAGE.into());
                }
                return false;
            }
        };

        debug!(
            devices = devices.len(),
            active = stats.active_devices,
            "dashboard refreshed"
        );
        self.stats = Some(stats);
        self.view = if devices.is_empty() {
            DashboardView::Empty
        } else {
            DashboardView::Devices(devices.iter().map(DeviceRow::from).collect())
        };
        self.last_update = Some(Utc::now());
        true
    }

    /// Ask the dashboard service to re-read its lease file, then refresh.
    pub async fn reload_leases(&mut self) -> bool {
        let reloaded = self
            .session
            .request(self.session.client().refresh_leases())
            .await;
        let Some(reloaded) = reloaded else {
            return false;
        };
        debug!(total = reloaded.total_devices, "lease cache reloaded");
        self.refresh().await
    }
}

impl Refreshable for NetworkDashboard {
    async fn refresh(&mut self) {
        NetworkDashboard::refresh(self).await;
    }
}
