// Admin API response types
//
// Wire shapes returned inside the `{ success, ... }` envelope. The appliance
// writes naive ISO-8601 timestamps (UTC, no offset), so all timestamp fields
// go through `lenient_time`, which also accepts RFC 3339.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Identifiers ─────────────────────────────────────────────────────

/// Record identifier as sent by the appliance.
///
/// The backend emits integers, but ids also arrive as strings from user
/// input and from older exports. Both forms are accepted and compared
/// loosely via [`RecordId::loosely_matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Compare against a user-supplied id, tolerating string/number mismatches.
    ///
    /// Text ids compare exactly. A numeric id also matches input that reads
    /// as the same number: `42` matches `"42"` and `" 42 "`.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn loosely_matches(&self, other: &str) -> bool {
        match self {
            Self::Text(mine) => mine == other,
            Self::Number(n) => {
                let other = other.trim();
                !other.is_empty()
                    && other
                        .parse::<f64>()
                        .is_ok_and(|b| (*n as f64 - b).abs() < f64::EPSILON)
            }
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        s.parse().map_or_else(|_| Self::Text(s.to_owned()), Self::Number)
    }
}

// ── Domain entries (blacklist / whitelist) ──────────────────────────

/// A domain-level allow/deny rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEntry {
    pub id: RecordId,
    pub domain: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "lenient_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_time")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_time")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DomainEntry {
    /// An entry is expired once its expiry lies strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires < now)
    }
}

/// One line of a batch import request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportItem {
    pub domain: String,
    pub category: String,
}

/// Added / skipped / errored counts from `POST /api/{list}/batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchImportResult {
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Counters from `GET /api/{list}/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStatistics {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub expired: u64,
    /// Active entries per category.
    #[serde(default)]
    pub categories: BTreeMap<String, u64>,
}

// ── Block-list subscriptions ────────────────────────────────────────

/// A remotely sourced block list the appliance subscribes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockList {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub entry_count: u64,
    #[serde(default, with = "lenient_time")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A catalog entry merged against the subscriptions already in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredefinedBlockList {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub in_database: bool,
    #[serde(default)]
    pub database_id: Option<RecordId>,
    #[serde(default)]
    pub database_enabled: Option<bool>,
    #[serde(default, with = "lenient_time")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub entry_count: u64,
}

/// Fields accepted by `POST /api/blocklists`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlockList {
    pub name: String,
    pub url: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Enabled lists and domains in one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub domains: u64,
}

/// Counters from `GET /api/blocklists/statistics`; only enabled lists
/// contribute domains and categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockListStatistics {
    #[serde(default)]
    pub total_blocklists: u64,
    #[serde(default)]
    pub enabled_blocklists: u64,
    #[serde(default)]
    pub total_domains: u64,
    #[serde(default, with = "lenient_time")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category_stats: BTreeMap<String, CategoryTotals>,
}

/// Partial update for `PUT /api/blocklists/{id}`; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockListUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// ── Statistics ──────────────────────────────────────────────────────

/// One DNS query from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, with = "lenient_time")]
    pub timestamp: Option<DateTime<Utc>>,
    pub domain: String,
    #[serde(default)]
    pub client_ip: String,
    #[serde(default)]
    pub query_type: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub block_list_id: Option<RecordId>,
    #[serde(default)]
    pub block_list_name: Option<String>,
}

/// One page of the query log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub queries: Vec<QueryRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Aggregate counters for the overview tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    #[serde(default)]
    pub total_queries: u64,
    #[serde(default)]
    pub blocked_queries: u64,
    #[serde(default)]
    pub block_percentage: f64,
    #[serde(default)]
    pub unique_domains: u64,
    #[serde(default)]
    pub unique_clients: u64,
    #[serde(default)]
    pub active_blocklists: u64,
    #[serde(default)]
    pub dnsmasq_status: String,
    #[serde(default)]
    pub period_days: u32,
}

/// Query counts for one clock hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    #[serde(with = "lenient_time::required")]
    pub hour: DateTime<Utc>,
    #[serde(default)]
    pub total_queries: u64,
    #[serde(default)]
    pub blocked_queries: u64,
    #[serde(default)]
    pub block_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCount {
    pub client_ip: String,
    pub count: u64,
}

/// Blocked-query totals attributed to one block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockListPerformance {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub blocked_count: u64,
}

/// Payload of `GET /api/statistics/export`.
///
/// JSON exports carry an array of query records; CSV exports carry the
/// finished document as one string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatisticsExport {
    Csv(String),
    Records(Vec<Value>),
}

/// One day of rolled-up totals from `GET /api/statistics/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub date: NaiveDate,
    #[serde(default)]
    pub total_queries: u64,
    #[serde(default)]
    pub blocked_queries: u64,
    #[serde(default)]
    pub unique_clients: u64,
    #[serde(default)]
    pub block_percentage: f64,
    #[serde(default)]
    pub top_blocked_domains: Vec<Value>,
}

/// Storage counters from `GET /api/statistics/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsHealth {
    #[serde(default)]
    pub query_count: u64,
    #[serde(default)]
    pub summary_count: u64,
    #[serde(default, with = "lenient_time")]
    pub oldest_query: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_time")]
    pub newest_query: Option<DateTime<Utc>>,
    #[serde(default)]
    pub database_size_bytes: u64,
    #[serde(default)]
    pub database_size_mb: f64,
}

/// Deleted-row counts from `POST /api/statistics/clear`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_queries: u64,
    #[serde(default)]
    pub deleted_summary: u64,
}

// ── Network dashboard ───────────────────────────────────────────────

/// A DHCP lease seen by the network dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub hostname: Option<String>,
    pub mac: String,
    pub ip: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub duration_seconds: u64,
}

impl Device {
    /// Seconds of lease age under which a device counts as active.
    pub const ACTIVE_WINDOW_SECS: u64 = 3600;

    pub fn is_active(&self) -> bool {
        self.duration_seconds < Self::ACTIVE_WINDOW_SECS
    }
}

/// Summary counters from `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    #[serde(default)]
    pub total_devices: u64,
    #[serde(default)]
    pub active_devices: u64,
    #[serde(default)]
    pub vendor_distribution: BTreeMap<String, u64>,
}

// ── Generic mutation reply ──────────────────────────────────────────

/// The `message` most mutations return alongside `success: true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionReply {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_owned())
    }
}

// ── Timestamp handling ──────────────────────────────────────────────

/// Serde adapter for optional timestamps that may lack an offset.
pub mod lenient_time {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parse RFC 3339, or a naive ISO-8601 datetime interpreted as UTC.
    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
        }
    }

    /// Same rules for a timestamp that must be present.
    pub mod required {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &DateTime<Utc>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<DateTime<Utc>, D::Error> {
            let raw = String::deserialize(deserializer)?;
            super::parse(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
        }
    }
}
