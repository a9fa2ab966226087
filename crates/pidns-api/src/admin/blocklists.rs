// Block-list subscription endpoints

use serde::Deserialize;
use serde_json::json;

use crate::admin::client::AdminClient;
use crate::admin::models::{
    ActionReply, BlockList, BlockListStatistics, BlockListUpdate, NewBlockList,
    PredefinedBlockList, RecordId,
};
use crate::error::Error;

const ROOT: &str = "/api/blocklists";

#[derive(Deserialize)]
struct BlockListsPayload {
    #[serde(default)]
    blocklists: Vec<BlockList>,
}

#[derive(Deserialize)]
struct BlockListPayload {
    blocklist: BlockList,
}

#[derive(Deserialize)]
struct PredefinedPayload {
    #[serde(default)]
    predefined_blocklists: Vec<PredefinedBlockList>,
}

#[derive(Deserialize)]
struct CategoriesPayload {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Deserialize)]
struct StatisticsPayload {
    #[serde(default)]
    statistics: BlockListStatistics,
}

/// Result of `POST /api/blocklists/update-all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateAllReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_count: u64,
}

impl AdminClient {
    /// `GET /api/blocklists`
    pub async fn list_blocklists(&self) -> Result<Vec<BlockList>, Error> {
        let payload: BlockListsPayload = self.get(ROOT).await?;
        Ok(payload.blocklists)
    }

    /// `GET /api/blocklists/{id}`
    pub async fn get_blocklist(&self, id: &RecordId) -> Result<BlockList, Error> {
        let payload: BlockListPayload = self.get(&Self::item_path(ROOT, id, None)?).await?;
        Ok(payload.blocklist)
    }

    /// Subscribe to a block list by URL.
    ///
    /// `POST /api/blocklists`
    pub async fn create_blocklist(&self, list: &NewBlockList) -> Result<ActionReply, Error> {
        self.post(ROOT, list).await
    }

    /// Change name, category, description or enabled flag.
    ///
    /// `PUT /api/blocklists/{id}`
    pub async fn update_blocklist_settings(
        &self,
        id: &RecordId,
        update: &BlockListUpdate,
    ) -> Result<ActionReply, Error> {
        self.put(&Self::item_path(ROOT, id, None)?, update).await
    }

    /// `DELETE /api/blocklists/{id}`
    pub async fn delete_blocklist(&self, id: &RecordId) -> Result<ActionReply, Error> {
        self.delete(&Self::item_path(ROOT, id, None)?).await
    }

    /// Flip the enabled flag.
    ///
    /// `POST /api/blocklists/{id}/toggle`
    pub async fn toggle_blocklist(&self, id: &RecordId) -> Result<ActionReply, Error> {
        self.post_empty(&Self::item_path(ROOT, id, Some("toggle"))?, &[])
            .await
    }

    /// Re-download one list's contents from its source URL.
    ///
    /// `POST /api/blocklists/{id}/update`
    pub async fn update_blocklist(&self, id: &RecordId) -> Result<ActionReply, Error> {
        self.post_empty(&Self::item_path(ROOT, id, Some("update"))?, &[])
            .await
    }

    /// `POST /api/blocklists/update-all`
    pub async fn update_all_blocklists(&self) -> Result<UpdateAllReply, Error> {
        self.post_empty(&format!("{ROOT}/update-all"), &[]).await
    }

    /// The built-in catalog, annotated with what is already subscribed.
    ///
    /// `GET /api/blocklists/predefined`
    pub async fn predefined_blocklists(&self) -> Result<Vec<PredefinedBlockList>, Error> {
        let payload: PredefinedPayload = self.get(&format!("{ROOT}/predefined")).await?;
        Ok(payload.predefined_blocklists)
    }

    /// `POST /api/blocklists/predefined`
    pub async fn add_predefined_blocklist(&self, url: &str) -> Result<ActionReply, Error> {
        self.post(&format!("{ROOT}/predefined"), &json!({ "url": url }))
            .await
    }

    /// `GET /api/blocklists/categories`
    pub async fn blocklist_categories(&self) -> Result<Vec<String>, Error> {
        let payload: CategoriesPayload = self.get(&format!("{ROOT}/categories")).await?;
        Ok(payload.categories)
    }

    /// `GET /api/blocklists/statistics`
    pub async fn blocklist_statistics(&self) -> Result<BlockListStatistics, Error> {
        let payload: StatisticsPayload = self.get(&format!("{ROOT}/statistics")).await?;
        Ok(payload.statistics)
    }
}
