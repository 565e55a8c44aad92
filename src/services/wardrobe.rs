use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    db::WardrobeStore,
    error::{AppError, AppResult},
    models::{ClothingItem, ClothingUpdate, ItemFilter, ItemId, NewClothingItem, WardrobeStats},
};

/// Days without wear after which an item counts as forgotten
pub const FORGOTTEN_AFTER_DAYS: i64 = 30;

/// Most forgotten items surfaced at once
pub const FORGOTTEN_LIMIT: u32 = 5;

fn not_found(id: ItemId) -> AppError {
    AppError::NotFound(format!("Clothing item {} not found", id))
}

/// Wardrobe maintenance: adding, editing and flagging clothes
#[derive(Clone)]
pub struct WardrobeService {
    store: Arc<dyn WardrobeStore>,
}

impl WardrobeService {
    pub fn new(store: Arc<dyn WardrobeStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &ItemFilter) -> AppResult<Vec<ClothingItem>> {
        self.store.list_items(filter).await
    }

    pub async fn get(&self, id: ItemId) -> AppResult<ClothingItem> {
        self.store.get_item(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn add(&self, item: NewClothingItem) -> AppResult<ClothingItem> {
        let item = self.store.insert_item(item.normalized()?).await?;
        tracing::info!(item_id = item.id, category = %item.category, "Clothing item added");
        Ok(item)
    }

    pub async fn update(&self, id: ItemId, update: ClothingUpdate) -> AppResult<ClothingItem> {
        let update = update.normalized()?;
        self.store
            .update_item(id, &update)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Removes an item; logged outfits keep pointing at it
    pub async fn delete(&self, id: ItemId) -> AppResult<()> {
        if !self.store.delete_item(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(item_id = id, "Clothing item deleted");
        Ok(())
    }

    /// Returns whether the item is now in the laundry
    pub async fn toggle_laundry(&self, id: ItemId) -> AppResult<bool> {
        self.store
            .toggle_laundry(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Returns whether the item is now a favorite
    pub async fn toggle_favorite(&self, id: ItemId) -> AppResult<bool> {
        self.store
            .toggle_favorite(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn stats(&self) -> AppResult<WardrobeStats> {
        self.store.wardrobe_stats().await
    }

    /// Wearable items nobody has reached for in a month, least worn first
    pub async fn forgotten(&self) -> AppResult<Vec<ClothingItem>> {
        self.forgotten_at(Utc::now()).await
    }

    pub async fn forgotten_at(&self, now: DateTime<Utc>) -> AppResult<Vec<ClothingItem>> {
        let cutoff = now - Duration::days(FORGOTTEN_AFTER_DAYS);
        self.store.forgotten_items(cutoff, FORGOTTEN_LIMIT).await
    }

    /// Empties the wardrobe and the outfit history
    pub async fn clear_all(&self) -> AppResult<()> {
        self.store.clear_wardrobe().await?;
        tracing::warn!("Wardrobe and outfit history cleared");
        Ok(())
    }
}
