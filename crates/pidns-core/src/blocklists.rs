// ── Block-list subscription page ──
//
// Same shape as the entry page: a cached collection, local filters, and a
// full re-fetch after each mutation. The "needs update" badge is purely
// presentational and never gates an action.

use chrono::{DateTime, Duration, Utc};
use pidns_api::models::{
    BlockList, BlockListStatistics, BlockListUpdate, NewBlockList, PredefinedBlockList, RecordId,
};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::format::{format_number, format_relative_time};
use crate::refresh::Refreshable;
use crate::session::AdminSession;
use crate::ui::{Dialog, Modal, TableView};

/// Age after which a subscription is flagged for update.
pub const STALE_AFTER_HOURS: i64 = 24;

/// Whether a subscription has never been fetched or was last fetched more
/// than a day ago.
pub fn needs_update(list: &BlockList, now: DateTime<Utc>) -> bool {
    list.last_updated
        .is_none_or(|updated| now - updated > Duration::hours(STALE_AFTER_HOURS))
}

// ── Filters ─────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EnabledFilter {
    #[default]
    Any,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilters {
    pub category: Option<String>,
    pub status: EnabledFilter,
}

impl SubscriptionFilters {
    pub fn matches(&self, list: &BlockList) -> bool {
        if let Some(category) = &self.category {
            if list.category != *category {
                return false;
            }
        }
        let wanted = match self.status {
            EnabledFilter::Any => return true,
            EnabledFilter::Enabled => true,
            EnabledFilter::Disabled => false,
        };
        list.enabled == wanted
    }
}

// ── Cards ───────────────────────────────────────────────────────────

/// Display form of one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionCard {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub category: String,
    pub entries: String,
    pub last_updated: String,
    pub update_status: &'static str,
    pub description: String,
    pub toggle_label: &'static str,
}

impl SubscriptionCard {
    fn new(list: &BlockList, now: DateTime<Utc>) -> Self {
        Self {
            id: list.id.to_string(),
            name: list.name.clone(),
            enabled: list.enabled,
            category: list.category.clone(),
            entries: format_number(list.entry_count),
            last_updated: list
                .last_updated
                .map_or_else(|| "Never".into(), |t| format_relative_time(t, now)),
            update_status: if needs_update(list, now) {
                "Needs Update"
            } else {
                "Up to Date"
            },
            description: list
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No description".into()),
            toggle_label: if list.enabled { "Disable" } else { "Enable" },
        }
    }
}

/// What the catalog offers for one predefined list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    Add,
    InDatabase { enabled: bool },
}

impl std::fmt::Display for CatalogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => f.write_str("Add to Database"),
            Self::InDatabase { enabled } => write!(
                f,
                "Already in database ({})",
                if *enabled { "enabled" } else { "disabled" }
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCard {
    pub name: String,
    pub category: String,
    pub url: String,
    pub description: String,
    pub action: CatalogAction,
}

impl From<&PredefinedBlockList> for CatalogCard {
    fn from(list: &PredefinedBlockList) -> Self {
        Self {
            name: list.name.clone(),
            category: list.category.clone(),
            url: list.url.clone(),
            description: format!("Predefined {} block list", list.category),
            action: if list.in_database {
                CatalogAction::InDatabase {
                    enabled: list.database_enabled.unwrap_or(false),
                }
            } else {
                CatalogAction::Add
            },
        }
    }
}

/// Contents of the predefined-catalog dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub cards: TableView<CatalogCard>,
}

impl Dialog for Catalog {
    const FIELDS: &'static [&'static str] = &[];
}

// ── Add dialog ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionForm {
    pub name: String,
    pub url: String,
    pub category: String,
    pub description: String,
}

impl Dialog for SubscriptionForm {
    const FIELDS: &'static [&'static str] = &["name", "url", "category", "description"];
}

impl SubscriptionForm {
    fn to_request(&self) -> Result<NewBlockList, CoreError> {
        let name = self.name.trim();
        let url = self.url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(CoreError::validation("Name and URL are required"));
        }
        let description = self.description.trim();
        Ok(NewBlockList {
            name: name.to_owned(),
            url: url.to_owned(),
            category: self.category.trim().to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
        })
    }
}

// ── Controller ──────────────────────────────────────────────────────

pub struct SubscriptionManager {
    session: AdminSession,
    lists: Vec<BlockList>,
    filters: SubscriptionFilters,
    add_modal: Modal<SubscriptionForm>,
    catalog_modal: Modal<Catalog>,
}

impl SubscriptionManager {
    pub fn new(session: AdminSession) -> Self {
        Self {
            session,
            lists: Vec::new(),
            filters: SubscriptionFilters::default(),
            add_modal: Modal::default(),
            catalog_modal: Modal::default(),
        }
    }

    pub fn lists(&self) -> &[BlockList] {
        &self.lists
    }

    pub fn filters(&self) -> &SubscriptionFilters {
        &self.filters
    }

    pub fn add_modal(&self) -> &Modal<SubscriptionForm> {
        &self.add_modal
    }

    pub fn catalog_modal(&self) -> &Modal<Catalog> {
        &self.catalog_modal
    }

    pub async fn load(&mut self) -> bool {
        let _loading = self.session.loading();
        let fetched = self
            .session
            .request(self.session.client().list_blocklists())
            .await;
        let Some(lists) = fetched else {
            return false;
        };
        debug!(count = lists.len(), "subscription cache replaced");
        self.lists = lists;
        true
    }

    pub fn filtered(&self) -> Vec<&BlockList> {
        self.lists
            .iter()
            .filter(|l| self.filters.matches(l))
            .collect()
    }

    pub fn render(&self, now: DateTime<Utc>) -> TableView<SubscriptionCard> {
        if self.lists.is_empty() {
            return TableView::Placeholder("No block lists found".into());
        }
        let cards = self
            .filtered()
            .into_iter()
            .map(|l| SubscriptionCard::new(l, now))
            .collect();
        TableView::from_rows(cards, "No block lists match the current filters")
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.filters.category = category.filter(|c| !c.is_empty());
    }

    pub fn set_status_filter(&mut self, status: EnabledFilter) {
        self.filters.status = status;
    }

    // ── Adding ──

    pub fn open_add(&mut self) {
        self.add_modal.open(SubscriptionForm::default());
    }

    pub fn add_form_mut(&mut self) -> Option<&mut SubscriptionForm> {
        self.add_modal.content_mut()
    }

    pub fn close_add_modal(&mut self) {
        self.add_modal.close();
    }

    /// Submit the manual add dialog.
    pub async fn add(&mut self) -> bool {
        let Some(form) = self.add_modal.content() else {
            return false;
        };
        let request = match form.to_request() {
            Ok(r) => r,
            Err(e) => {
                self.session.report(&e);
                return false;
            }
        };
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().create_blocklist(&request))
                .await
        };
        let Some(reply) = reply else {
            return false;
        };
        info!(name = %request.name, "subscription added");
        self.session.shell().success(&reply.message_or("Block list added"));
        self.add_modal.close();
        self.load().await;
        true
    }

    /// Load the predefined catalog into its dialog.
    pub async fn show_catalog(&mut self) -> bool {
        let fetched = self
            .session
            .request(self.session.client().predefined_blocklists())
            .await;
        let Some(catalog) = fetched else {
            return false;
        };
        let cards = catalog.iter().map(CatalogCard::from).collect();
        self.catalog_modal.open(Catalog {
            cards: TableView::from_rows(cards, "No predefined block lists available"),
        });
        true
    }

    pub fn close_catalog(&mut self) {
        self.catalog_modal.close();
    }

    /// Subscribe to a catalog entry, then refresh both the catalog and the
    /// subscription list.
    pub async fn add_predefined(&mut self, url: &str) -> bool {
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().add_predefined_blocklist(url))
                .await
        };
        let Some(reply) = reply else {
            return false;
        };
        info!(%url, "predefined subscription added");
        self.session
            .shell()
            .success(&reply.message_or("Block list added"));
        if self.catalog_modal.is_open() {
            self.show_catalog().await;
        }
        self.load().await;
        true
    }

    // ── Per-list actions ──

    /// Fetch one subscription straight from the appliance.
    pub async fn fetch(&self, id: &str) -> Option<BlockList> {
        let id = RecordId::from(id);
        self.session
            .request(self.session.client().get_blocklist(&id))
            .await
    }

    /// Change the name, category, description or enabled flag of one
    /// subscription. Fields left `None` keep their current value.
    pub async fn edit(&mut self, id: &str, update: &BlockListUpdate) -> bool {
        if *update == BlockListUpdate::default() {
            self.session.report(&CoreError::validation("Nothing to change"));
            return false;
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.session.report(&CoreError::validation("Name cannot be empty"));
            return false;
        }
        let id = RecordId::from(id);
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().update_blocklist_settings(&id, update))
                .await
        };
        self.finish(reply.map(|r| r.message_or("Block list updated")))
            .await
    }

    pub async fn toggle(&mut self, id: &str) -> bool {
        let id = RecordId::from(id);
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().toggle_blocklist(&id))
                .await
        };
        self.finish(reply.map(|r| r.message_or("Block list toggled")))
            .await
    }

    /// Re-download one subscription.
    pub async fn update(&mut self, id: &str) -> bool {
        let id = RecordId::from(id);
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().update_blocklist(&id))
                .await
        };
        self.finish(reply.map(|r| r.message_or("Block list updated")))
            .await
    }

    /// Re-download every enabled subscription after confirmation.
    pub async fn update_all(&mut self) -> bool {
        if !self
            .session
            .shell()
            .confirm("Update all enabled block lists? This may take a few minutes.")
        {
            return false;
        }
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().update_all_blocklists())
                .await
        };
        if let Some(r) = &reply {
            info!(updated = r.updated_count, "update-all finished");
        }
        self.finish(reply.map(|r| {
            r.message
                .unwrap_or_else(|| format!("Updated {} block lists", r.updated_count))
        }))
        .await
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        if !self
            .session
            .shell()
            .confirm("Are you sure you want to delete this block list?")
        {
            return false;
        }
        let id = RecordId::from(id);
        let reply = {
            let _loading = self.session.loading();
            self.session
                .request(self.session.client().delete_blocklist(&id))
                .await
        };
        self.finish(reply.map(|r| r.message_or("Block list deleted")))
            .await
    }

    /// Categories offered for new subscriptions.
    pub async fn categories(&self) -> Option<Vec<String>> {
        self.session
            .request(self.session.client().blocklist_categories())
            .await
    }

    /// Subscription and domain totals over the enabled lists.
    pub async fn statistics(&self) -> Option<BlockListStatistics> {
        let _loading = self.session.loading();
        self.session
            .request(self.session.client().blocklist_statistics())
            .await
    }

    async fn finish(&mut self, message: Option<String>) -> bool {
        let Some(message) = message else {
            return false;
        };
        self.session.shell().success(&message);
        self.load().await;
        true
    }
}

impl Refreshable for SubscriptionManager {
    async fn refresh(&mut self) {
        self.load().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(id: i64, category: &str, enabled: bool) -> BlockList {
        BlockList {
            id: RecordId::Number(id),
            name: format!("list-{id}"),
            category: category.into(),
            url: format!("https://lists.example/{id}.txt"),
            enabled,
            entry_count: 1_500,
            last_updated: None,
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn status_filter_uses_enabled_flag() {
        let lists = [list(1, "ads", true), list(2, "ads", false), list(3, "malware", true)];
        let enabled = SubscriptionFilters {
            status: EnabledFilter::Enabled,
            ..SubscriptionFilters::default()
        };
        let disabled_ads = SubscriptionFilters {
            category: Some("ads".into()),
            status: EnabledFilter::Disabled,
        };
        let picked: Vec<String> = lists
            .iter()
            .filter(|l| enabled.matches(l))
            .map(|l| l.name.clone())
            .collect();
        assert_eq!(picked, vec!["list-1", "list-3"]);
        assert!(disabled_ads.matches(&lists[1]));
        assert!(!disabled_ads.matches(&lists[0]));
    }

    #[test]
    fn needs_update_after_a_day_or_never() {
        let now = Utc::now();
        let mut l = list(1, "ads", true);
        assert!(needs_update(&l, now));
        l.last_updated = Some(now - Duration::hours(23));
        assert!(!needs_update(&l, now));
        l.last_updated = Some(now - Duration::hours(25));
        assert!(needs_update(&l, now));
    }

    #[test]
    fn card_labels() {
        let now = Utc::now();
        let card = SubscriptionCard::new(&list(9, "ads", true), now);
        assert_eq!(card.entries, "1.5K");
        assert_eq!(card.last_updated, "Never");
        assert_eq!(card.update_status, "Needs Update");
        assert_eq!(card.description, "No description");
        assert_eq!(card.toggle_label, "Disable");
    }

    #[test]
    fn catalog_action_labels() {
        assert_eq!(CatalogAction::Add.to_string(), "Add to Database");
        assert_eq!(
            CatalogAction::InDatabase { enabled: false }.to_string(),
            "Already in database (disabled)"
        );
    }

    #[test]
    fn add_form_requires_name_and_url() {
        let form = SubscriptionForm {
            name: "  ".into(),
            url: "https://x".into(),
            ..SubscriptionForm::default()
        };
        assert!(matches!(
            form.to_request(),
            Err(CoreError::ValidationFailed { .. })
        ));
    }
}
