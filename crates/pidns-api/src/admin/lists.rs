// Blacklist / whitelist endpoints
//
// Both lists expose the same resource shape under different roots, so
// every method takes a `ListKind` instead of being written twice.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::admin::client::AdminClient;
use crate::admin::models::{
    ActionReply, BatchImportResult, DomainEntry, ImportItem, ListStatistics, RecordId,
};
use crate::error::Error;

/// Which domain list an operation targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Blacklist,
    Whitelist,
}

impl ListKind {
    /// Resource root, e.g. `/api/blacklist`.
    pub fn root(self) -> &'static str {
        match self {
            Self::Blacklist => "/api/blacklist",
            Self::Whitelist => "/api/whitelist",
        }
    }
}

#[derive(Deserialize)]
struct EntriesPayload {
    #[serde(default)]
    entries: Vec<DomainEntry>,
}

#[derive(Deserialize)]
struct EntryPayload {
    entry: DomainEntry,
}

#[derive(Deserialize)]
struct BatchPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: BatchImportResult,
}

#[derive(Deserialize)]
struct CategoriesPayload {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Deserialize)]
struct StatisticsPayload {
    #[serde(default)]
    statistics: ListStatistics,
}

#[derive(Deserialize)]
struct CheckPayload {
    #[serde(default)]
    results: BTreeMap<String, bool>,
}

impl AdminClient {
    /// List every entry, expired ones included.
    ///
    /// `GET /api/{list}?include_expired=true`
    pub async fn list_entries(&self, kind: ListKind) -> Result<Vec<DomainEntry>, Error> {
        let payload: EntriesPayload = self
            .get_query(kind.root(), &[("include_expired", "true".into())])
            .await?;
        debug!(%kind, count = payload.entries.len(), "loaded entries");
        Ok(payload.entries)
    }

    /// `GET /api/{list}/{id}`
    pub async fn get_entry(&self, kind: ListKind, id: &RecordId) -> Result<DomainEntry, Error> {
        let payload: EntryPayload = self.get(&Self::item_path(kind.root(), id, None)?).await?;
        Ok(payload.entry)
    }

    /// Create an entry from a serialized form body.
    ///
    /// `POST /api/{list}`
    pub async fn create_entry(
        &self,
        kind: ListKind,
        body: &Map<String, Value>,
    ) -> Result<ActionReply, Error> {
        self.post(kind.root(), body).await
    }

    /// `PUT /api/{list}/{id}`
    pub async fn update_entry(
        &self,
        kind: ListKind,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<ActionReply, Error> {
        self.put(&Self::item_path(kind.root(), &id, None)?, body)
            .await
    }

    /// `DELETE /api/{list}/{id}`
    pub async fn delete_entry(&self, kind: ListKind, id: &str) -> Result<ActionReply, Error> {
        self.delete(&Self::item_path(kind.root(), &id, None)?).await
    }

    /// Bulk-add domains under one category.
    ///
    /// Returns the server's message alongside the added/skipped/error counts.
    ///
    /// `POST /api/{list}/batch`
    pub async fn import_entries(
        &self,
        kind: ListKind,
        entries: &[ImportItem],
        category: &str,
    ) -> Result<(ActionReply, BatchImportResult), Error> {
        let body = json!({ "entries": entries, "category": category });
        let payload: BatchPayload = self.post(&format!("{}/batch", kind.root()), &body).await?;
        debug!(
            %kind,
            added = payload.result.added,
            skipped = payload.result.skipped,
            "batch import finished"
        );
        Ok((ActionReply { message: payload.message }, payload.result))
    }

    /// `GET /api/{list}/export`
    pub async fn export_entries(&self, kind: ListKind) -> Result<Vec<DomainEntry>, Error> {
        let payload: EntriesPayload = self.get(&format!("{}/export", kind.root())).await?;
        Ok(payload.entries)
    }

    /// Remove every expired entry on the appliance.
    ///
    /// `POST /api/{list}/cleanup`
    pub async fn cleanup_expired(&self, kind: ListKind) -> Result<ActionReply, Error> {
        self.post_empty(&format!("{}/cleanup", kind.root()), &[])
            .await
    }

    /// Ask whether each domain currently has an active entry on the list.
    ///
    /// `POST /api/{list}/check`
    pub async fn check_domains(
        &self,
        kind: ListKind,
        domains: &[String],
    ) -> Result<BTreeMap<String, bool>, Error> {
        let body = json!({ "domains": domains });
        let payload: CheckPayload = self.post(&format!("{}/check", kind.root()), &body).await?;
        Ok(payload.results)
    }

    /// `GET /api/{list}/categories`
    pub async fn list_categories(&self, kind: ListKind) -> Result<Vec<String>, Error> {
        let payload: CategoriesPayload = self.get(&format!("{}/categories", kind.root())).await?;
        Ok(payload.categories)
    }

    /// Entry counts for the list: total, active, expired, per category.
    ///
    /// `GET /api/{list}/statistics`
    pub async fn list_statistics(&self, kind: ListKind) -> Result<ListStatistics, Error> {
        let payload: StatisticsPayload = self.get(&format!("{}/statistics", kind.root())).await?;
        Ok(payload.statistics)
    }
}
