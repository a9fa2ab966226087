// Query statistics endpoints
//
// All read endpoints are GETs parameterized by query string; the only
// mutation is `clear`, which takes its window as a query parameter too.

use serde::Deserialize;

use crate::admin::client::AdminClient;
use crate::admin::models::{
    BlockListPerformance, ClearResult, ClientCount, DailySummary, DomainCount, HourlyBucket,
    OverviewStats, QueryPage, StatisticsExport, StatisticsHealth,
};
use crate::error::Error;

const ROOT: &str = "/api/statistics";

#[derive(Deserialize)]
struct OverviewPayload {
    statistics: OverviewStats,
}

#[derive(Deserialize)]
struct DomainsPayload {
    #[serde(default)]
    domains: Vec<DomainCount>,
}

#[derive(Deserialize)]
struct ClientsPayload {
    #[serde(default)]
    clients: Vec<ClientCount>,
}

#[derive(Deserialize)]
struct PerformancePayload {
    #[serde(default)]
    blocklists: Vec<BlockListPerformance>,
}

#[derive(Deserialize)]
struct HourlyPayload {
    #[serde(default)]
    hourly_stats: Vec<HourlyBucket>,
}

#[derive(Deserialize)]
struct SummaryPayload {
    #[serde(default)]
    summary: Vec<DailySummary>,
}

#[derive(Deserialize)]
struct HealthPayload {
    health: StatisticsHealth,
}

#[derive(Deserialize)]
struct ExportPayload {
    data: StatisticsExport,
}

fn flag(value: bool) -> String {
    value.to_string()
}

impl AdminClient {
    /// `GET /api/statistics/overview?days=N`
    pub async fn overview(&self, days: u32) -> Result<OverviewStats, Error> {
        let payload: OverviewPayload = self
            .get_query(&format!("{ROOT}/overview"), &[("days", days.to_string())])
            .await?;
        Ok(payload.statistics)
    }

    /// Daily rollups, newest day first.
    ///
    /// `GET /api/statistics/summary?days=N`
    pub async fn daily_summary(&self, days: u32) -> Result<Vec<DailySummary>, Error> {
        let payload: SummaryPayload = self
            .get_query(&format!("{ROOT}/summary"), &[("days", days.to_string())])
            .await?;
        Ok(payload.summary)
    }

    /// `GET /api/statistics/health`
    pub async fn statistics_health(&self) -> Result<StatisticsHealth, Error> {
        let payload: HealthPayload = self.get(&format!("{ROOT}/health")).await?;
        Ok(payload.health)
    }

    /// One page of the query log, newest first.
    ///
    /// `GET /api/statistics/recent-queries?limit&offset&blocked_only`
    pub async fn recent_queries(
        &self,
        limit: u32,
        offset: u64,
        blocked_only: bool,
    ) -> Result<QueryPage, Error> {
        self.get_query(
            &format!("{ROOT}/recent-queries"),
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("blocked_only", flag(blocked_only)),
            ],
        )
        .await
    }

    /// `GET /api/statistics/top-domains?limit&blocked_only&days`
    pub async fn top_domains(
        &self,
        limit: u32,
        blocked_only: bool,
        days: u32,
    ) -> Result<Vec<DomainCount>, Error> {
        let payload: DomainsPayload = self
            .get_query(
                &format!("{ROOT}/top-domains"),
                &[
                    ("limit", limit.to_string()),
                    ("blocked_only", flag(blocked_only)),
                    ("days", days.to_string()),
                ],
            )
            .await?;
        Ok(payload.domains)
    }

    /// `GET /api/statistics/top-clients?limit&days`
    pub async fn top_clients(&self, limit: u32, days: u32) -> Result<Vec<ClientCount>, Error> {
        let payload: ClientsPayload = self
            .get_query(
                &format!("{ROOT}/top-clients"),
                &[("limit", limit.to_string()), ("days", days.to_string())],
            )
            .await?;
        Ok(payload.clients)
    }

    /// `GET /api/statistics/hourly?hours=N`
    pub async fn hourly(&self, hours: u32) -> Result<Vec<HourlyBucket>, Error> {
        let payload: HourlyPayload = self
            .get_query(&format!("{ROOT}/hourly"), &[("hours", hours.to_string())])
            .await?;
        Ok(payload.hourly_stats)
    }

    /// Blocked-query counts per block list.
    ///
    /// `GET /api/statistics/blocklist-performance?days=N`
    pub async fn blocklist_performance(
        &self,
        days: u32,
    ) -> Result<Vec<BlockListPerformance>, Error> {
        let payload: PerformancePayload = self
            .get_query(
                &format!("{ROOT}/blocklist-performance"),
                &[("days", days.to_string())],
            )
            .await?;
        Ok(payload.blocklists)
    }

    /// `GET /api/statistics/export?format&days`
    ///
    /// `format` is `"json"` or `"csv"`; the appliance renders CSV itself.
    pub async fn export_statistics(
        &self,
        format: &str,
        days: u32,
    ) -> Result<StatisticsExport, Error> {
        let payload: ExportPayload = self
            .get_query(
                &format!("{ROOT}/export"),
                &[("format", format.to_owned()), ("days", days.to_string())],
            )
            .await?;
        Ok(payload.data)
    }

    /// Delete stored history, all of it or only rows older than `days`.
    ///
    /// `POST /api/statistics/clear[?days=N]`
    pub async fn clear_statistics(&self, days: Option<u32>) -> Result<ClearResult, Error> {
        let query: Vec<(&str, String)> = days
            .map(|d| ("days", d.to_string()))
            .into_iter()
            .collect();
        self.post_empty(&format!("{ROOT}/clear"), &query).await
    }
}
