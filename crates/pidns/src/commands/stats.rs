//! Statistics command handlers.

use pidns_core::models::{
    BlockListPerformance, ClientCount, DailySummary, DomainCount, QueryRecord,
};
use pidns_core::statistics::{
    CountRow, HealthView, OverviewView, PerformanceRow, QueryRow, SummaryRow, performance_view,
    summary_view,
};
use pidns_core::{ExportFormat, Shell, StatisticsViewer, Tab};
use tabled::Tabled;

use crate::chart::TextChart;
use crate::cli::{OutputFormat, StatsArgs, StatsCommand, StatsExportFormat};
use crate::error::CliError;
use crate::output;

use super::Ctx;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct QueryTableRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Client")]
    client_ip: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Block List")]
    block_list: String,
}

fn query_row(r: &QueryRow) -> QueryTableRow {
    QueryTableRow {
        time: r.time.clone(),
        domain: r.domain.clone(),
        client_ip: r.client_ip.clone(),
        status: r.status,
        block_list: r.block_list.clone(),
    }
}

#[derive(Tabled)]
struct DomainTableRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Queries")]
    count: String,
}

#[derive(Tabled)]
struct ClientTableRow {
    #[tabled(rename = "Client")]
    client_ip: String,
    #[tabled(rename = "Queries")]
    count: String,
}

#[derive(Tabled)]
struct PerformanceTableRow {
    #[tabled(rename = "Block List")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Blocked")]
    blocked: String,
}

fn performance_row(r: &PerformanceRow) -> PerformanceTableRow {
    PerformanceTableRow {
        name: r.name.clone(),
        category: r.category.clone(),
        blocked: r.blocked.clone(),
    }
}

#[derive(Tabled)]
struct SummaryTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Queries")]
    total: String,
    #[tabled(rename = "Blocked")]
    blocked: String,
    #[tabled(rename = "Rate")]
    block_rate: String,
    #[tabled(rename = "Clients")]
    clients: String,
}

fn summary_row(r: &SummaryRow) -> SummaryTableRow {
    SummaryTableRow {
        date: r.date.clone(),
        total: r.total.clone(),
        blocked: r.blocked.clone(),
        block_rate: r.block_rate.clone(),
        clients: r.clients.clone(),
    }
}

fn health_detail(v: &HealthView) -> String {
    [
        format!("Queries stored:   {}", v.queries),
        format!("Daily summaries:  {}", v.summaries),
        format!("Oldest query:     {}", v.oldest),
        format!("Newest query:     {}", v.newest),
        format!("Database size:    {}", v.size),
    ]
    .join("\n")
}

fn overview_detail(v: &OverviewView) -> String {
    [
        format!("Period:          {}", v.period),
        format!("Total queries:   {}", v.total_queries),
        format!("Blocked queries: {}", v.blocked_queries),
        format!("Block rate:      {}", v.block_rate),
        format!("Unique domains:  {}", v.unique_domains),
        format!("Unique clients:  {}", v.unique_clients),
        format!("Block lists:     {}", v.active_blocklists),
        format!("dnsmasq:         {}", v.dnsmasq_status),
    ]
    .join("\n")
}

impl From<StatsExportFormat> for ExportFormat {
    fn from(f: StatsExportFormat) -> Self {
        match f {
            StatsExportFormat::Json => Self::Json,
            StatsExportFormat::Csv => Self::Csv,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(ctx: &Ctx<'_>, args: StatsArgs) -> Result<(), CliError> {
    let mut viewer =
        StatisticsViewer::new(ctx.admin_session()?, TextChart::default()).with_period(args.period);

    match args.command {
        StatsCommand::Overview => {
            let loaded = viewer.switch_tab(Tab::Overview).await;
            ctx.finish(loaded, "overview")?;
            let (Some(stats), Some(view)) = (viewer.overview(), viewer.overview_view()) else {
                return Ok(());
            };
            let out = output::render_single(
                ctx.global.output,
                stats,
                |_| overview_detail(&view),
                |s| s.total_queries.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Queries {
            blocked_only,
            page,
            page_size,
        } => {
            viewer.controls_mut().blocked_only = blocked_only;
            let loaded = viewer.set_page_size(page_size).await;
            ctx.finish(loaded, "queries")?;
            while viewer.pagination().page < page {
                if !viewer.next_page().await {
                    break;
                }
            }
            let out = output::render_view(
                ctx.global.output,
                viewer.queries(),
                &viewer.queries_view(),
                query_row,
                |q: &QueryRecord| q.domain.clone(),
            )?;
            ctx.print(&out);
            if ctx.global.output == OutputFormat::Table {
                ctx.shell.info(&viewer.pagination().page_info());
            }
            Ok(())
        }

        StatsCommand::Domains {
            limit,
            blocked_only,
        } => {
            {
                let controls = viewer.controls_mut();
                controls.domain_limit = limit;
                controls.domains_blocked_only = blocked_only;
            }
            let loaded = viewer.switch_tab(Tab::Domains).await;
            ctx.finish(loaded, "domains")?;
            let out = output::render_view(
                ctx.global.output,
                viewer.domains(),
                &viewer.domains_view(),
                |r: &CountRow| DomainTableRow {
                    domain: r.label.clone(),
                    count: r.count.clone(),
                },
                |d: &DomainCount| d.domain.clone(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Clients { limit } => {
            viewer.controls_mut().client_limit = limit;
            let loaded = viewer.switch_tab(Tab::Clients).await;
            ctx.finish(loaded, "clients")?;
            let out = output::render_view(
                ctx.global.output,
                viewer.clients(),
                &viewer.clients_view(),
                |r: &CountRow| ClientTableRow {
                    client_ip: r.label.clone(),
                    count: r.count.clone(),
                },
                |c: &ClientCount| c.client_ip.clone(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Hourly { hours } => {
            viewer.controls_mut().hours = hours;
            let loaded = viewer.switch_tab(Tab::Hourly).await;
            ctx.finish(loaded, "hourly")?;
            let out = output::render_single(
                ctx.global.output,
                viewer.hourly(),
                |_| {
                    viewer
                        .chart()
                        .rendered()
                        .map_or_else(|| "No hourly data".to_owned(), str::to_owned)
                },
                |buckets| {
                    buckets
                        .iter()
                        .map(|b| format!("{}\t{}", b.hour.to_rfc3339(), b.total_queries))
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Performance => {
            let Some(rows) = viewer.performance(args.period).await else {
                return ctx.finish(false, "performance");
            };
            let out = output::render_view(
                ctx.global.output,
                &rows,
                &performance_view(&rows),
                performance_row,
                |p: &BlockListPerformance| p.name.clone(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Summary { days } => {
            let Some(rows) = viewer.summary(days).await else {
                return ctx.finish(false, "summary");
            };
            let out = output::render_view(
                ctx.global.output,
                &rows,
                &summary_view(&rows),
                summary_row,
                |d: &DailySummary| d.date.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Health => {
            let Some(health) = viewer.health().await else {
                return ctx.finish(false, "health");
            };
            let view = HealthView::from(&health);
            let out = output::render_single(
                ctx.global.output,
                &health,
                |_| health_detail(&view),
                |h| h.query_count.to_string(),
            )?;
            ctx.print(&out);
            Ok(())
        }

        StatsCommand::Export { format, days, dir } => {
            let Some(path) = viewer.export(format.into(), days, &dir).await else {
                return ctx.finish(false, "export");
            };
            ctx.print(&path.display().to_string());
            Ok(())
        }

        StatsCommand::Clear { days } => {
            let cleared = viewer.clear(days).await;
            ctx.finish(cleared, "clear")
        }
    }
}
