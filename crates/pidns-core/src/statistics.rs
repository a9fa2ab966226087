// ── Statistics page ──
//
// Five tabs, one active at a time. Switching a tab or changing one of its
// controls loads that tab alone. Every load is stamped with a per-tab
// ticket; a response that arrives after a newer load for the same tab was
// issued is dropped instead of overwriting the view.

use std::path::{Path, PathBuf};

use pidns_api::models::{
    BlockListPerformance, ClientCount, DailySummary, DomainCount, HourlyBucket, OverviewStats,
    QueryPage, QueryRecord, StatisticsExport, StatisticsHealth,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::export::{ExportFormat, export_to_file};
use crate::format::{format_date, format_hour, format_number};
use crate::refresh::Refreshable;
use crate::seq::{Sequencer, Ticket};
use crate::session::AdminSession;
use crate::ui::TableView;

pub const DEFAULT_PERIOD_DAYS: u32 = 7;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_TOP_LIMIT: u32 = 20;
pub const DEFAULT_HOURS: u32 = 24;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Tab {
    #[default]
    Overview,
    Queries,
    Domains,
    Clients,
    Hourly,
}

// ── Pagination ──────────────────────────────────────────────────────

/// Query-log paging state. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u32,
    /// Row count reported by the last successful load.
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

impl Pagination {
    fn size(self) -> u64 {
        u64::from(self.page_size.max(1))
    }

    pub fn total_pages(self) -> u64 {
        self.total.div_ceil(self.size())
    }

    pub fn has_next(self) -> bool {
        self.page * self.size() < self.total
    }

    pub fn has_prev(self) -> bool {
        self.page > 1
    }

    pub fn offset(self) -> u64 {
        self.page.saturating_sub(1) * self.size()
    }

    /// Change the page size and go back to the first page.
    pub fn set_page_size(&mut self, size: u32) {
        self.page_size = size.max(1);
        self.page = 1;
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn page_info(self) -> String {
        format!("Page {} of {}", self.page, self.total_pages())
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Per-tab controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabControls {
    pub blocked_only: bool,
    pub domain_limit: u32,
    pub domains_blocked_only: bool,
    pub client_limit: u32,
    pub hours: u32,
}

impl Default for TabControls {
    fn default() -> Self {
        Self {
            blocked_only: false,
            domain_limit: DEFAULT_TOP_LIMIT,
            domains_blocked_only: false,
            client_limit: DEFAULT_TOP_LIMIT,
            hours: DEFAULT_HOURS,
        }
    }
}

/// Parameters of one tab load, captured when the load is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabQuery {
    Overview { days: u32 },
    Queries { limit: u32, offset: u64, blocked_only: bool },
    Domains { limit: u32, blocked_only: bool, days: u32 },
    Clients { limit: u32, days: u32 },
    Hourly { hours: u32 },
}

impl TabQuery {
    pub fn tab(&self) -> Tab {
        match self {
            Self::Overview { .. } => Tab::Overview,
            Self::Queries { .. } => Tab::Queries,
            Self::Domains { .. } => Tab::Domains,
            Self::Clients { .. } => Tab::Clients,
            Self::Hourly { .. } => Tab::Hourly,
        }
    }
}

/// A response for one tab.
#[derive(Debug, Clone, PartialEq)]
pub enum TabData {
    Overview(OverviewStats),
    Queries(QueryPage),
    Domains(Vec<DomainCount>),
    Clients(Vec<ClientCount>),
    Hourly(Vec<HourlyBucket>),
}

impl TabData {
    pub fn tab(&self) -> Tab {
        match self {
            Self::Overview(_) => Tab::Overview,
            Self::Queries(_) => Tab::Queries,
            Self::Domains(_) => Tab::Domains,
            Self::Clients(_) => Tab::Clients,
            Self::Hourly(_) => Tab::Hourly,
        }
    }
}

/// An issued but not yet applied load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: Ticket<Tab>,
    pub query: TabQuery,
}

/// Run one tab query through the session.
pub async fn fetch(session: &AdminSession, query: &TabQuery) -> Option<TabData> {
    let client = session.client();
    match *query {
        TabQuery::Overview { days } => session
            .request(client.overview(days))
            .await
            .map(TabData::Overview),
        TabQuery::Queries {
            limit,
            offset,
            blocked_only,
        } => session
            .request(client.recent_queries(limit, offset, blocked_only))
            .await
            .map(TabData::Queries),
        TabQuery::Domains {
            limit,
            blocked_only,
            days,
        } => session
            .request(client.top_domains(limit, blocked_only, days))
            .await
            .map(TabData::Domains),
        TabQuery::Clients { limit, days } => session
            .request(client.top_clients(limit, days))
            .await
            .map(TabData::Clients),
        TabQuery::Hourly { hours } => session
            .request(client.hourly(hours))
            .await
            .map(TabData::Hourly),
    }
}

// ── Chart ───────────────────────────────────────────────────────────

/// Handle to a drawn chart, used to dispose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<u64>,
}

/// Line chart of hourly query volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyChart {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl HourlyChart {
    pub fn from_buckets(buckets: &[HourlyBucket]) -> Self {
        Self {
            labels: buckets.iter().map(|b| format_hour(b.hour)).collect(),
            series: vec![
                ChartSeries {
                    label: "Total Queries".into(),
                    values: buckets.iter().map(|b| b.total_queries).collect(),
                },
                ChartSeries {
                    label: "Blocked Queries".into(),
                    values: buckets.iter().map(|b| b.blocked_queries).collect(),
                },
            ],
        }
    }
}

/// Whatever actually draws charts.
pub trait ChartRenderer: Send {
    fn draw(&mut self, chart: &HourlyChart) -> ChartId;
    fn dispose(&mut self, id: ChartId);
}

// ── Views ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewView {
    pub total_queries: String,
    pub blocked_queries: String,
    pub block_rate: String,
    pub unique_domains: String,
    pub unique_clients: String,
    pub active_blocklists: String,
    pub dnsmasq_status: String,
    pub period: String,
}

impl From<&OverviewStats> for OverviewView {
    fn from(s: &OverviewStats) -> Self {
        Self {
            total_queries: format_number(s.total_queries),
            blocked_queries: format_number(s.blocked_queries),
            block_rate: format!("{}%", s.block_percentage),
            unique_domains: format_number(s.unique_domains),
            unique_clients: format_number(s.unique_clients),
            active_blocklists: s.active_blocklists.to_string(),
            dnsmasq_status: s.dnsmasq_status.clone(),
            period: format!("{} days", s.period_days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRow {
    pub time: String,
    pub domain: String,
    pub client_ip: String,
    pub status: &'static str,
    pub block_list: String,
}

impl From<&QueryRecord> for QueryRow {
    fn from(q: &QueryRecord) -> Self {
        Self {
            time: q.timestamp.map_or_else(|| "-".into(), format_date),
            domain: q.domain.clone(),
            client_ip: q.client_ip.clone(),
            status: if q.blocked { "Blocked" } else { "Allowed" },
            block_list: q
                .block_list_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "-".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub label: String,
    pub count: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceRow {
    pub name: String,
    pub category: String,
    pub blocked: String,
}

impl From<&BlockListPerformance> for PerformanceRow {
    fn from(p: &BlockListPerformance) -> Self {
        Self {
            name: p.name.clone(),
            category: p.category.clone(),
            blocked: format_number(p.blocked_count),
        }
    }
}

/// Table form of a performance report.
pub fn performance_view(rows: &[BlockListPerformance]) -> TableView<PerformanceRow> {
    TableView::from_rows(
        rows.iter().map(PerformanceRow::from).collect(),
        "No block list activity found",
    )
}

/// One day of the rollup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub date: String,
    pub total: String,
    pub blocked: String,
    pub block_rate: String,
    pub clients: String,
}

impl From<&DailySummary> for SummaryRow {
    fn from(d: &DailySummary) -> Self {
        Self {
            date: d.date.to_string(),
            total: format_number(d.total_queries),
            blocked: format_number(d.blocked_queries),
            block_rate: format!("{}%", d.block_percentage),
            clients: d.unique_clients.to_string(),
        }
    }
}

pub fn summary_view(rows: &[DailySummary]) -> TableView<SummaryRow> {
    TableView::from_rows(
        rows.iter().map(SummaryRow::from).collect(),
        "No daily summaries recorded yet",
    )
}

/// Display strings for the storage health report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthView {
    pub queries: String,
    pub summaries: String,
    pub oldest: String,
    pub newest: String,
    pub size: String,
}

impl From<&StatisticsHealth> for HealthView {
    fn from(h: &StatisticsHealth) -> Self {
        let stamp = |t: Option<_>| t.map_or_else(|| "-".to_owned(), format_date);
        Self {
            queries: format_number(h.query_count),
            summaries: format_number(h.summary_count),
            oldest: stamp(h.oldest_query),
            newest: stamp(h.newest_query),
            size: format!("{:.2} MB", h.database_size_mb),
        }
    }
}

// ── Controller ──────────────────────────────────────────────────────

pub struct StatisticsViewer<C: ChartRenderer> {
    session: AdminSession,
    chart: C,
    chart_id: Option<ChartId>,
    tab: Tab,
    period_days: u32,
    controls: TabControls,
    pagination: Pagination,
    seq: Sequencer<Tab>,
    overview: Option<OverviewStats>,
    queries: Option<Vec<QueryRecord>>,
    domains: Option<Vec<DomainCount>>,
    clients: Option<Vec<ClientCount>>,
    hourly: Option<Vec<HourlyBucket>>,
}

impl<C: ChartRenderer> StatisticsViewer<C> {
    pub fn new(session: AdminSession, chart: C) -> Self {
        Self {
            session,
            chart,
            chart_id: None,
            tab: Tab::default(),
            period_days: DEFAULT_PERIOD_DAYS,
            controls: TabControls::default(),
            pagination: Pagination::default(),
            seq: Sequencer::new(),
            overview: None,
            queries: None,
            domains: None,
            clients: None,
            hourly: None,
        }
    }

    /// Start with a different day window.
    pub fn with_period(mut self, days: u32) -> Self {
        self.period_days = days;
        self
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn period_days(&self) -> u32 {
        self.period_days
    }

    pub fn controls(&self) -> &TabControls {
        &self.controls
    }

    /// Adjust controls without reloading. The next load picks them up.
    pub fn controls_mut(&mut self) -> &mut TabControls {
        &mut self.controls
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn overview(&self) -> Option<&OverviewStats> {
        self.overview.as_ref()
    }

    pub fn queries(&self) -> &[QueryRecord] {
        self.queries.as_deref().unwrap_or_default()
    }

    pub fn domains(&self) -> &[DomainCount] {
        self.domains.as_deref().unwrap_or_default()
    }

    pub fn clients(&self) -> &[ClientCount] {
        self.clients.as_deref().unwrap_or_default()
    }

    /// Capture the current parameters for `tab` and issue a ticket.
    pub fn prepare(&mut self, tab: Tab) -> LoadRequest {
        let c = self.controls;
        let days = self.period_days;
        let query = match tab {
            Tab::Overview => TabQuery::Overview { days },
            Tab::Queries => TabQuery::Queries {
                limit: self.pagination.page_size,
                offset: self.pagination.offset(),
                blocked_only: c.blocked_only,
            },
            Tab::Domains => TabQuery::Domains {
                limit: c.domain_limit,
                blocked_only: c.domains_blocked_only,
                days,
            },
            Tab::Clients => TabQuery::Clients {
                limit: c.client_limit,
                days,
            },
            Tab::Hourly => TabQuery::Hourly { hours: c.hours },
        };
        LoadRequest {
            ticket: self.seq.issue(tab),
            query,
        }
    }

    /// Store a response unless a newer load for its tab has been issued.
    pub fn apply(&mut self, ticket: Ticket<Tab>, data: TabData) -> bool {
        if ticket.key() != data.tab() || !self.seq.is_current(&ticket) {
            debug!(tab = %data.tab(), "discarding stale statistics response");
            return false;
        }
        match data {
            TabData::Overview(stats) => self.overview = Some(stats),
            TabData::Queries(page) => {
                self.pagination.total = page.total;
                self.queries = Some(page.queries);
            }
            TabData::Domains(domains) => self.domains = Some(domains),
            TabData::Clients(clients) => self.clients = Some(clients),
            TabData::Hourly(buckets) => {
                self.redraw_chart(&buckets);
                self.hourly = Some(buckets);
            }
        }
        true
    }

    fn redraw_chart(&mut self, buckets: &[HourlyBucket]) {
        if let Some(previous) = self.chart_id.take() {
            self.chart.dispose(previous);
        }
        self.chart_id = Some(self.chart.draw(&HourlyChart::from_buckets(buckets)));
    }

    async fn load_tab(&mut self, tab: Tab) -> bool {
        let request = self.prepare(tab);
        let data = {
            let _loading = self.session.loading();
            fetch(&self.session, &request.query).await
        };
        match data {
            Some(data) => self.apply(request.ticket, data),
            None => false,
        }
    }

    /// Reload whichever tab is active.
    pub async fn load_current(&mut self) -> bool {
        self.load_tab(self.tab).await
    }

    pub async fn switch_tab(&mut self, tab: Tab) -> bool {
        self.tab = tab;
        self.load_current().await
    }

    /// Change the day window and reload the active tab.
    pub async fn set_period(&mut self, days: u32) -> bool {
        self.period_days = days;
        self.load_current().await
    }

    pub async fn set_blocked_only(&mut self, blocked_only: bool) -> bool {
        self.controls.blocked_only = blocked_only;
        self.load_tab(Tab::Queries).await
    }

    pub async fn set_page_size(&mut self, size: u32) -> bool {
        self.pagination.set_page_size(size);
        self.load_tab(Tab::Queries).await
    }

    pub async fn next_page(&mut self) -> bool {
        self.pagination.next() && self.load_tab(Tab::Queries).await
    }

    pub async fn previous_page(&mut self) -> bool {
        self.pagination.prev() && self.load_tab(Tab::Queries).await
    }

    pub async fn set_domain_limit(&mut self, limit: u32) -> bool {
        self.controls.domain_limit = limit;
        self.load_tab(Tab::Domains).await
    }

    pub async fn set_domains_blocked_only(&mut self, blocked_only: bool) -> bool {
        self.controls.domains_blocked_only = blocked_only;
        self.load_tab(Tab::Domains).await
    }

    pub async fn set_client_limit(&mut self, limit: u32) -> bool {
        self.controls.client_limit = limit;
        self.load_tab(Tab::Clients).await
    }

    pub async fn set_hours(&mut self, hours: u32) -> bool {
        self.controls.hours = hours;
        self.load_tab(Tab::Hourly).await
    }

    // ── Rendering ──

    pub fn overview_view(&self) -> Option<OverviewView> {
        self.overview.as_ref().map(OverviewView::from)
    }

    pub fn queries_view(&self) -> TableView<QueryRow> {
        let rows = self
            .queries
            .iter()
            .flatten()
            .map(QueryRow::from)
            .collect();
        TableView::from_rows(rows, "No queries found")
    }

    pub fn domains_view(&self) -> TableView<CountRow> {
        let rows = self
            .domains
            .iter()
            .flatten()
            .map(|d| CountRow {
                label: d.domain.clone(),
                count: format_number(d.count),
            })
            .collect();
        TableView::from_rows(rows, "No domains found")
    }

    pub fn clients_view(&self) -> TableView<CountRow> {
        let rows = self
            .clients
            .iter()
            .flatten()
            .map(|c| CountRow {
                label: c.client_ip.clone(),
                count: format_number(c.count),
            })
            .collect();
        TableView::from_rows(rows, "No clients found")
    }

    pub fn hourly(&self) -> &[HourlyBucket] {
        self.hourly.as_deref().unwrap_or_default()
    }

    // ── Other reads and history actions ──

    /// Blocked-query counts per block list over `days`.
    pub async fn performance(&self, days: u32) -> Option<Vec<BlockListPerformance>> {
        let _loading = self.session.loading();
        self.session
            .request(self.session.client().blocklist_performance(days))
            .await
    }

    /// Daily rollups over the last `days`, newest first.
    pub async fn summary(&self, days: u32) -> Option<Vec<DailySummary>> {
        let _loading = self.session.loading();
        self.session
            .request(self.session.client().daily_summary(days))
            .await
    }

    /// Row counts, time span and on-disk size of the statistics store.
    pub async fn health(&self) -> Option<StatisticsHealth> {
        let _loading = self.session.loading();
        self.session
            .request(self.session.client().statistics_health())
            .await
    }

    /// Download stored history to `dir/statistics.{ext}` after confirmation.
    pub async fn export(&self, format: ExportFormat, days: u32, dir: &Path) -> Option<PathBuf> {
        let prompt = format!(
            "Export the last {days} days of statistics as {}?",
            format.as_ref().to_uppercase()
        );
        if !self.session.shell().confirm(&prompt) {
            return None;
        }
        let payload = {
            let _loading = self.session.loading();
            self.session
                .request(
                    self.session
                        .client()
                        .export_statistics(format.as_ref(), days),
                )
                .await?
        };
        let data = match payload {
            StatisticsExport::Csv(doc) => Value::String(doc),
            StatisticsExport::Records(records) => Value::Array(records),
        };
        match export_to_file(dir, "statistics", format, &data) {
            Ok(path) => {
                self.session
                    .shell()
                    .success("Statistics exported successfully");
                Some(path)
            }
            Err(e) => {
                self.session.report(&e);
                None
            }
        }
    }

    /// Delete stored history (all of it, or rows older than `days`) after
    /// confirmation, then reload the active tab.
    pub async fn clear(&mut self, days: Option<u32>) -> bool {
        let prompt = match days {
            Some(d) => format!("Clear statistics older than {d} days?"),
            None => "Clear all statistics? This cannot be undone.".to_owned(),
        };
        if !self.session.shell().confirm(&prompt) {
            return false;
        }
        let result = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().clear_statistics(days))
                .await
        };
        let Some(result) = result else {
            return false;
        };
        info!(
            deleted_queries = result.deleted_queries,
            deleted_summary = result.deleted_summary,
            "statistics cleared"
        );
        let message = result
            .message
            .unwrap_or_else(|| format!("Cleared {} queries", result.deleted_queries));
        self.session.shell().success(&message);
        self.load_current().await;
        true
    }
}

impl<C: ChartRenderer> Drop for StatisticsViewer<C> {
    fn drop(&mut self) {
        if let Some(id) = self.chart_id.take() {
            self.chart.dispose(id);
        }
    }
}

impl<C: ChartRenderer> Refreshable for StatisticsViewer<C> {
    async fn refresh(&mut self) {
        self.load_current().await;
    }
}
