use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        ClothingItem, ClothingUpdate, HistoryEntry, ItemFilter, ItemId, LoggedOutfit,
        NewClothingItem, NewRating, OutfitId, OutfitLogEntry, PreferenceAdjustment,
        PreferenceWeight, RatingStats, WardrobeStats,
    },
};

/// Clothing items and the outfit history
///
/// Wear counters are written only by [`WardrobeStore::log_outfit`], which must
/// insert the history row and bump every referenced item in one atomic unit.
#[async_trait::async_trait]
pub trait WardrobeStore: Send + Sync {
    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<ClothingItem>>;

    async fn get_item(&self, id: ItemId) -> AppResult<Option<ClothingItem>>;

    async fn insert_item(&self, item: NewClothingItem) -> AppResult<ClothingItem>;

    /// Returns `None` when the item does not exist
    async fn update_item(
        &self,
        id: ItemId,
        update: &ClothingUpdate,
    ) -> AppResult<Option<ClothingItem>>;

    /// Returns whether an item was deleted
    async fn delete_item(&self, id: ItemId) -> AppResult<bool>;

    /// Flips the laundry flag, returning the new value
    async fn toggle_laundry(&self, id: ItemId) -> AppResult<Option<bool>>;

    /// Flips the favorite flag, returning the new value
    async fn toggle_favorite(&self, id: ItemId) -> AppResult<Option<bool>>;

    /// Records a worn outfit and increments the wear count of each referenced item
    async fn log_outfit(&self, entry: &OutfitLogEntry) -> AppResult<OutfitId>;

    async fn get_outfit(&self, id: OutfitId) -> AppResult<Option<LoggedOutfit>>;

    /// Most recent outfits first, slots resolved against the current wardrobe
    async fn outfit_history(&self, limit: u32) -> AppResult<Vec<HistoryEntry>>;

    async fn wardrobe_stats(&self) -> AppResult<WardrobeStats>;

    /// Items out of the laundry that were never worn or last worn before
    /// `worn_before`, least worn first
    async fn forgotten_items(
        &self,
        worn_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ClothingItem>>;

    /// Deletes every item and the whole outfit history; ratings and weights stay
    async fn clear_wardrobe(&self) -> AppResult<()>;
}

/// Learned preference weights and the rating log
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Appends a rating and applies its weight adjustments all-or-nothing
    ///
    /// Each adjustment is a read-add-clamp-write on one key; an unseen key
    /// starts from the baseline weight.
    async fn record_rating(
        &self,
        rating: &NewRating,
        adjustments: &[PreferenceAdjustment],
    ) -> AppResult<()>;

    async fn list_weights(&self) -> AppResult<Vec<PreferenceWeight>>;

    /// Deletes every learned weight, keeping the ratings
    async fn clear_weights(&self) -> AppResult<()>;

    async fn rating_stats(&self) -> AppResult<RatingStats>;
}

/// Rounds to one decimal the way averages are reported
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
