//! Network dashboard command handlers.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use pidns_core::models::NetworkStats;
use pidns_core::network::{DashboardView, DeviceRow};
use pidns_core::{AutoRefresh, CaptureMethod, NetworkDashboard, Refreshable, ScreenshotFlow};
use serde::Serialize;
use tabled::Tabled;

use crate::capture::{RenderCapture, ScreenCapture};
use crate::cli::{DevicesArgs, DevicesCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Ctx;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

fn device_row(d: &DeviceRow) -> DeviceTableRow {
    DeviceTableRow {
        name: d.name.clone(),
        ip: d.ip.clone(),
        mac: d.mac.clone(),
        vendor: d.vendor.clone(),
        connected: d.connected.clone(),
        status: d.status(),
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    status: Option<String>,
    stats: Option<&'a NetworkStats>,
    devices: &'a [DeviceRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

// ── Rendering ───────────────────────────────────────────────────────

fn summary(dashboard: &NetworkDashboard) -> String {
    let mut out = String::new();
    if let Some(stats) = dashboard.stats() {
        let _ = writeln!(out, "Devices:  {}", stats.total_devices);
        let _ = writeln!(out, "Active:   {}", stats.active_devices);
        if !stats.vendor_distribution.is_empty() {
            let vendors = stats
                .vendor_distribution
                .iter()
                .map(|(vendor, count)| format!("{vendor} ({count})"))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "Vendors:  {vendors}");
        }
    }
    if let Some(status) = dashboard.network_status() {
        let _ = writeln!(out, "Network:  {status}");
    }
    if let Some(label) = dashboard.last_update_label() {
        let _ = writeln!(out, "{label}");
    }
    out
}

fn render(format: OutputFormat, dashboard: &NetworkDashboard) -> Result<String, CliError> {
    let view = dashboard.view();
    let devices: &[DeviceRow] = match view {
        DashboardView::Devices(rows) => rows,
        _ => &[],
    };
    match format {
        OutputFormat::Table => {
            let body = match view {
                DashboardView::Devices(rows) => {
                    output::render_table(&rows.iter().map(device_row).collect::<Vec<_>>())
                }
                other => other.message().unwrap_or_default().to_owned(),
            };
            Ok(format!("{}\n{body}", summary(dashboard)))
        }
        OutputFormat::Plain => Ok(devices
            .iter()
            .map(|d| d.mac.as_str())
            .collect::<Vec<_>>()
            .join("\n")),
        format => {
            let snapshot = Snapshot {
                status: dashboard.network_status().map(|s| s.to_string()),
                stats: dashboard.stats(),
                devices,
                message: view.message(),
            };
            output::render_single(format, &snapshot, |_| String::new(), |_| String::new())
        }
    }
}

/// Re-renders the dashboard after every timed refresh.
struct LiveDashboard {
    dashboard: NetworkDashboard,
    format: OutputFormat,
    quiet: bool,
}

impl LiveDashboard {
    fn show(&self) {
        match render(self.format, &self.dashboard) {
            Ok(out) => output::print_output(&out, self.quiet),
            Err(e) => tracing::warn!(error = %e, "dashboard render failed"),
        }
    }
}

impl Refreshable for LiveDashboard {
    async fn refresh(&mut self) {
        self.dashboard.refresh().await;
        self.show();
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx<'_>, args: DevicesArgs) -> Result<(), CliError> {
    let mut dashboard = NetworkDashboard::new(ctx.dashboard_session()?);

    match args.command {
        Some(DevicesCommand::Reload) => {
            let reloaded = dashboard.reload_leases().await;
            ctx.finish(reloaded, "reload")?;
            ctx.print(&render(ctx.global.output, &dashboard)?);
            Ok(())
        }

        Some(DevicesCommand::Screenshot { out }) => {
            dashboard.refresh().await;
            screenshot(ctx, &dashboard, &out)
        }

        None if args.watch => {
            let period = args
                .interval
                .map_or(ctx.config.refresh_interval, Duration::from_secs);
            watch(ctx, dashboard, period).await
        }

        None => {
            let refreshed = dashboard.refresh().await;
            ctx.print(&render(ctx.global.output, &dashboard)?);
            ctx.finish(refreshed, "refresh")
        }
    }
}

async fn watch(
    ctx: &Ctx<'_>,
    dashboard: NetworkDashboard,
    period: Duration,
) -> Result<(), CliError> {
    if period.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least one second".into(),
        });
    }

    let mut live = LiveDashboard {
        dashboard,
        format: ctx.global.output,
        quiet: ctx.global.quiet,
    };
    live.dashboard.refresh().await;
    live.show();

    let (timer, handle) = AutoRefresh::new(period);
    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    tracing::debug!(period_secs = period.as_secs(), "watching devices");
    timer.run(&mut live).await;
    drop(handle);
    Ok(())
}

fn screenshot(ctx: &Ctx<'_>, dashboard: &NetworkDashboard, out: &Path) -> Result<(), CliError> {
    let rendered = match dashboard.view() {
        DashboardView::Devices(_) | DashboardView::Empty => {
            Some(render(OutputFormat::Table, dashboard)?)
        }
        DashboardView::Loading | DashboardView::Error(_) => None,
    };
    let methods: Vec<Box<dyn CaptureMethod>> =
        vec![Box::new(RenderCapture::new(rendered)), Box::new(ScreenCapture)];
    let mut flow = ScreenshotFlow::new(methods);
    let captured = flow.capture(ctx.shell.as_ref());
    ctx.finish(captured, "screenshot")?;
    let path = flow.download(out)?;
    ctx.print(&path.display().to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_row_carries_status() {
        let row = DeviceRow {
            name: "laptop".into(),
            mac: "aa:bb:cc:dd:ee:ff".into(),
            ip: "192.168.1.20".into(),
            vendor: "Apple".into(),
            connected: "5m".into(),
            active: true,
        };
        let table = device_row(&row);
        assert_eq!(table.status, "Active");
        assert_eq!(table.ip, "192.168.1.20");
    }
}
