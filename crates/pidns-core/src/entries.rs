// ── Blacklist / whitelist page ──
//
// One controller serves both domain lists. It caches the full collection,
// filters it locally, and re-fetches after every mutation. The cache is
// only ever replaced by a successful load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use pidns_api::ListKind;
use pidns_api::models::{BatchImportResult, DomainEntry, ImportItem, ListStatistics, RecordId};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::export::{ExportFormat, export_to_file};
use crate::form::{FormData, serialize_form};
use crate::format::format_date;
use crate::refresh::Refreshable;
use crate::session::AdminSession;
use crate::ui::{Dialog, Modal, TableView};

/// Lines shown in the import preview before the "... and N more" line.
pub const IMPORT_PREVIEW_LIMIT: usize = 10;

/// Error messages shown inline in the import summary.
const IMPORT_ERRORS_SHOWN: usize = 3;

/// Category preselected in the add and import dialogs.
pub const DEFAULT_CATEGORY: &str = "custom";

// ── Filters ─────────────────────────────────────────────────────────

/// Expiry-based status filter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    Any,
    Active,
    Expired,
}

/// Filter state for the entry table. Every field narrows independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilters {
    pub category: Option<String>,
    pub status: StatusFilter,
    /// Lower-cased substring matched against domain and notes.
    pub search: String,
}

impl EntryFilters {
    pub fn matches(&self, entry: &DomainEntry, now: DateTime<Utc>) -> bool {
        if let Some(category) = &self.category {
            if entry.category != *category {
                return false;
            }
        }
        let status_ok = match self.status {
            StatusFilter::Any => true,
            StatusFilter::Active => !entry.is_expired(now),
            StatusFilter::Expired => entry.is_expired(now),
        };
        if !status_ok {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        entry.domain.to_lowercase().contains(&self.search)
            || entry
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&self.search))
    }
}

// ── Dialog state ────────────────────────────────────────────────────

/// Add/edit dialog contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    /// Set when editing an existing entry.
    pub id: Option<String>,
    pub domain: String,
    pub category: String,
    /// Local date-time in `YYYY-MM-DDTHH:MM` form; blank for no expiry.
    pub expires_at: String,
    pub notes: String,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            id: None,
            domain: String::new(),
            category: DEFAULT_CATEGORY.to_owned(),
            expires_at: String::new(),
            notes: String::new(),
        }
    }
}

impl Dialog for EntryForm {
    const FIELDS: &'static [&'static str] = &["domain", "category", "expires_at", "notes"];
}

impl EntryForm {
    /// Pre-fill the dialog from an existing entry.
    pub fn from_entry(entry: &DomainEntry) -> Self {
        Self {
            id: Some(entry.id.to_string()),
            domain: entry.domain.clone(),
            category: entry.category.clone(),
            expires_at: entry
                .expires_at
                .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }

    /// The fields as the dialog would submit them. `id` is always present,
    /// empty when creating.
    pub fn to_form_data(&self) -> FormData {
        FormData::new()
            .with("id", self.id.clone().unwrap_or_default())
            .with("domain", self.domain.clone())
            .with("category", self.category.clone())
            .with("expires_at", self.expires_at.clone())
            .with("notes", self.notes.clone())
    }
}

/// Import dialog contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDraft {
    /// Newline-delimited domains, pasted or read from a file.
    pub data: String,
    pub category: String,
}

impl Default for ImportDraft {
    fn default() -> Self {
        Self {
            data: String::new(),
            category: DEFAULT_CATEGORY.to_owned(),
        }
    }
}

impl Dialog for ImportDraft {
    const FIELDS: &'static [&'static str] = &["data", "category"];
}

// ── Rendering ───────────────────────────────────────────────────────

/// One row of the entry table, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub id: String,
    pub domain: String,
    pub category: String,
    pub created: String,
    pub expires: String,
    pub status: &'static str,
    pub notes: String,
}

impl EntryRow {
    fn new(entry: &DomainEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: entry.id.to_string(),
            domain: entry.domain.clone(),
            category: entry.category.clone(),
            created: entry.created_at.map_or_else(|| "Unknown".into(), format_date),
            expires: entry.expires_at.map_or_else(|| "Never".into(), format_date),
            status: if entry.is_expired(now) { "Expired" } else { "Active" },
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }
}

// ── Import helpers ──────────────────────────────────────────────────

/// Split pasted text into import items: one per non-blank line, trimmed
/// and lower-cased, all tagged with `category`.
pub fn parse_import(text: &str, category: &str) -> Vec<ImportItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ImportItem {
            domain: line.to_lowercase(),
            category: category.to_owned(),
        })
        .collect()
}

/// Preview lines for the import dialog.
pub fn import_preview(text: &str) -> Vec<String> {
    let items = parse_import(text, "");
    if items.is_empty() {
        return vec!["No entries to preview".into()];
    }
    let mut lines: Vec<String> = items
        .iter()
        .take(IMPORT_PREVIEW_LIMIT)
        .map(|i| i.domain.clone())
        .collect();
    if items.len() > IMPORT_PREVIEW_LIMIT {
        lines.push(format!("... and {} more", items.len() - IMPORT_PREVIEW_LIMIT));
    }
    lines
}

/// Follow-up message for a batch that was not a clean success.
///
/// `None` when nothing was skipped and nothing errored.
pub fn import_summary(result: &BatchImportResult) -> Option<String> {
    if result.skipped == 0 && result.errors.is_empty() {
        return None;
    }
    let mut message = format!("Imported {} entries", result.added);
    if result.skipped > 0 {
        message.push_str(&format!(", skipped {}", result.skipped));
    }
    if !result.errors.is_empty() {
        let shown: Vec<&str> = result
            .errors
            .iter()
            .take(IMPORT_ERRORS_SHOWN)
            .map(String::as_str)
            .collect();
        message.push_str(&format!(", errors: {}", shown.join(", ")));
        if result.errors.len() > IMPORT_ERRORS_SHOWN {
            message.push_str(&format!(
                " and {} more",
                result.errors.len() - IMPORT_ERRORS_SHOWN
            ));
        }
    }
    Some(message)
}

// ── Expiry normalization ────────────────────────────────────────────

/// Parse an expiry typed into the dialog.
///
/// Accepts RFC 3339, or a local `YYYY-MM-DDTHH:MM[:SS]` value.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Rewrite `expires_at` in a serialized form to a canonical UTC timestamp,
/// or drop the key when it is blank.
fn normalize_expiry(body: &mut Map<String, Value>) -> Result<(), CoreError> {
    let raw = match body.get("expires_at") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(_) => {
            body.remove("expires_at");
            return Ok(());
        }
        None => return Ok(()),
    };
    let expires = parse_expiry(&raw)
        .ok_or_else(|| CoreError::validation(format!("Invalid expiration date: {raw}")))?;
    body.insert(
        "expires_at".into(),
        Value::String(expires.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Ok(())
}

fn list_title(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Blacklist => "Blacklist",
        ListKind::Whitelist => "Whitelist",
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Page controller for one domain list.
pub struct EntryListManager {
    kind: ListKind,
    session: AdminSession,
    entries: Vec<DomainEntry>,
    filters: EntryFilters,
    entry_modal: Modal<EntryForm>,
    import_modal: Modal<ImportDraft>,
}

impl EntryListManager {
    pub fn new(kind: ListKind, session: AdminSession) -> Self {
        Self {
            kind,
            session,
            entries: Vec::new(),
            filters: EntryFilters::default(),
            entry_modal: Modal::default(),
            import_modal: Modal::default(),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// The cached collection as last fetched.
    pub fn entries(&self) -> &[DomainEntry] {
        &self.entries
    }

    pub fn filters(&self) -> &EntryFilters {
        &self.filters
    }

    pub fn entry_modal(&self) -> &Modal<EntryForm> {
        &self.entry_modal
    }

    pub fn import_modal(&self) -> &Modal<ImportDraft> {
        &self.import_modal
    }

    /// Replace the cache with the appliance's current list.
    ///
    /// Returns `false` (already reported) when the fetch failed; the
    /// previous cache is kept.
    pub async fn load(&mut self) -> bool {
        let _loading = self.session.loading();
        let fetched = self
            .session
            .request(self.session.client().list_entries(self.kind))
            .await;
        let Some(entries) = fetched else {
            return false;
        };
        debug!(kind = %self.kind, count = entries.len(), "entry cache replaced");
        self.entries = entries;
        true
    }

    // ── Filtering ──

    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<&DomainEntry> {
        self.entries
            .iter()
            .filter(|e| self.filters.matches(e, now))
            .collect()
    }

    pub fn render(&self, now: DateTime<Utc>) -> TableView<EntryRow> {
        if self.entries.is_empty() {
            return TableView::Placeholder(format!("No {} entries found", self.kind));
        }
        let rows = self
            .filtered(now)
            .into_iter()
            .map(|e| EntryRow::new(e, now))
            .collect();
        TableView::from_rows(rows, "No entries match the current filters")
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.filters.category = category.filter(|c| !c.is_empty());
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filters.status = status;
    }

    pub fn set_search(&mut self, search: &str) {
        self.filters.search = search.to_lowercase();
    }

    // ── Add / edit ──

    pub fn open_create(&mut self) {
        self.entry_modal.open(EntryForm::default());
    }

    /// Open the edit dialog for a cached entry.
    ///
    /// `id` is compared loosely, so `"42"` finds an entry whose id is the
    /// number 42. Unknown ids are reported without touching the network.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id.loosely_matches(id)) else {
            self.session.shell().error("Entry not found");
            return false;
        };
        self.entry_modal.open(EntryForm::from_entry(entry));
        true
    }

    pub fn entry_form_mut(&mut self) -> Option<&mut EntryForm> {
        self.entry_modal.content_mut()
    }

    pub fn close_entry_modal(&mut self) {
        self.entry_modal.close();
    }

    /// Submit the add/edit dialog.
    pub async fn save(&mut self) -> bool {
        let Some(form) = self.entry_modal.content() else {
            return false;
        };
        let mut body = serialize_form(&form.to_form_data());
        let id = body
            .remove("id")
            .and_then(|v| v.as_str().map(|s| s.trim().to_owned()))
            .filter(|s| !s.is_empty());
        if let Err(e) = normalize_expiry(&mut body) {
            self.session.report(&e);
            return false;
        }

        let reply = {
            let _loading = self.session.loading();
            let client = self.session.client();
            match id.as_deref() {
                Some(id) => {
                    self.session
                        .request(client.update_entry(self.kind, id, &body))
                        .await
                }
                None => self.session.request(client.create_entry(self.kind, &body)).await,
            }
        };
        let Some(reply) = reply else {
            return false;
        };

        info!(kind = %self.kind, id = ?id, "entry saved");
        self.session.shell().success(&reply.message_or("Entry saved"));
        self.entry_modal.close();
        self.load().await;
        true
    }

    /// Delete one entry after confirmation.
    pub async fn delete(&mut self, id: &str) -> bool {
        let prompt = format!("Are you sure you want to delete this {} entry?", self.kind);
        if !self.session.shell().confirm(&prompt) {
            return false;
        }
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().delete_entry(self.kind, id))
                .await
        };
        let Some(reply) = reply else {
            return false;
        };
        self.session.shell().success(&reply.message_or("Entry deleted"));
        self.load().await;
        true
    }

    // ── Import ──

    pub fn open_import(&mut self) {
        self.import_modal.open(ImportDraft::default());
    }

    pub fn import_draft_mut(&mut self) -> Option<&mut ImportDraft> {
        self.import_modal.content_mut()
    }

    pub fn close_import_modal(&mut self) {
        self.import_modal.close();
    }

    /// Preview of whatever the import dialog currently holds.
    pub fn current_import_preview(&self) -> Vec<String> {
        import_preview(self.import_modal.content().map_or("", |d| d.data.as_str()))
    }

    /// Read an uploaded file into the import dialog, opening it if needed.
    pub fn load_import_file(&mut self, path: &Path) -> bool {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                if !self.import_modal.is_open() {
                    self.open_import();
                }
                if let Some(draft) = self.import_modal.content_mut() {
                    draft.data = text;
                }
                true
            }
            Err(e) => {
                self.session.report(&CoreError::Io(e));
                false
            }
        }
    }

    /// Submit the import dialog as one batch.
    ///
    /// Returns the appliance's counts when the batch was accepted.
    pub async fn import(&mut self) -> Option<BatchImportResult> {
        let (items, category) = match self.import_modal.content() {
            Some(draft) if !draft.data.trim().is_empty() => (
                parse_import(&draft.data, &draft.category),
                draft.category.clone(),
            ),
            _ => {
                self.session.shell().error("No entries to import");
                return None;
            }
        };

        let outcome = {
            let _loading = self.session.loading();
            self.session
                .request(
                    self.session
                        .client()
                        .import_entries(self.kind, &items, &category),
                )
                .await
        };
        let (reply, result) = outcome?;

        self.session.shell().success(&reply.message_or("Import completed"));
        self.import_modal.close();
        self.load().await;
        if let Some(summary) = import_summary(&result) {
            self.session.shell().info(&summary);
        }
        Some(result)
    }

    // ── Export / cleanup / check ──

    /// Download the full list to `dir/{kind}.json`.
    pub async fn export(&mut self, dir: &Path) -> Option<PathBuf> {
        let entries = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().export_entries(self.kind))
                .await?
        };
        let written = serde_json::to_value(&entries)
            .map_err(|e| CoreError::Internal(format!("JSON encoding failed: {e}")))
            .and_then(|data| export_to_file(dir, self.kind.as_ref(), ExportFormat::Json, &data));
        match written {
            Ok(path) => {
                self.session
                    .shell()
                    .success(&format!("{} exported successfully", list_title(self.kind)));
                Some(path)
            }
            Err(e) => {
                self.session.report(&e);
                None
            }
        }
    }

    /// Remove every expired entry after confirmation.
    pub async fn cleanup_expired(&mut self) -> bool {
        let prompt = format!(
            "Are you sure you want to remove all expired {} entries?",
            self.kind
        );
        if !self.session.shell().confirm(&prompt) {
            return false;
        }
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().cleanup_expired(self.kind))
                .await
        };
        let Some(reply) = reply else {
            return false;
        };
        self.session
            .shell()
            .success(&reply.message_or("Expired entries removed"));
        self.load().await;
        true
    }

    /// Ask the appliance which of `domains` this list currently covers.
    pub async fn check_domains(&self, domains: &[String]) -> Option<BTreeMap<String, bool>> {
        self.session
            .request(self.session.client().check_domains(self.kind, domains))
            .await
    }

    /// Fetch one entry straight from the appliance.
    pub async fn fetch_entry(&self, id: &str) -> Option<DomainEntry> {
        let id = RecordId::from(id);
        self.session
            .request(self.session.client().get_entry(self.kind, &id))
            .await
    }

    /// Categories the appliance offers for this list.
    pub async fn categories(&self) -> Option<Vec<String>> {
        self.session
            .request(self.session.client().list_categories(self.kind))
            .await
    }

    /// Total, active and expired counts, plus active entries per category.
    pub async fn statistics(&self) -> Option<ListStatistics> {
        let _loading = self.session.loading();
        self.session
            .request(self.session.client().list_statistics(self.kind))
            .await
    }

    /// Find a cached entry by id.
    pub fn find(&self, id: &RecordId) -> Option<&DomainEntry> {
        self.entries.iter().find(|e| e.id == *id)
    }
}

impl Refreshable for EntryListManager {
    async fn refresh(&mut self) {
        self.load().await;
    }
}
