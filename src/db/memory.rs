use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{round_one_decimal, ProfileStore, WardrobeStore};
use crate::{
    error::AppResult,
    models::{
        ClothingItem, ClothingUpdate, HistoryEntry, HistorySlot, ItemFilter, ItemId,
        LoggedOutfit, NewClothingItem, NewRating, OutfitId, OutfitLogEntry, OutfitRating,
        PreferenceAdjustment, PreferenceKey, PreferenceWeight, RatingStats, WardrobeStats,
    },
};

/// In-process tables behind a single lock
///
/// Every operation holds the write lock for its whole duration, so multi-row
/// updates (outfit logging, rating with adjustments) are all-or-nothing.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    clothes: BTreeMap<ItemId, ClothingItem>,
    outfits: BTreeMap<OutfitId, LoggedOutfit>,
    ratings: Vec<OutfitRating>,
    weights: HashMap<PreferenceKey, PreferenceWeight>,
    next_item_id: ItemId,
    next_outfit_id: OutfitId,
    next_rating_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[async_trait::async_trait]
impl WardrobeStore for MemoryStore {
    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<ClothingItem>> {
        let tables = self.inner.read().await;
        let mut items: Vec<ClothingItem> = tables
            .clothes
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn get_item(&self, id: ItemId) -> AppResult<Option<ClothingItem>> {
        Ok(self.inner.read().await.clothes.get(&id).cloned())
    }

    async fn insert_item(&self, item: NewClothingItem) -> AppResult<ClothingItem> {
        let mut tables = self.inner.write().await;
        let id = next_id(&mut tables.next_item_id);
        let stored = ClothingItem {
            id,
            image_path: item.image_path,
            category: item.category,
            color_primary: item.color_primary,
            color_secondary: item.color_secondary,
            pattern: item.pattern,
            formality: item.formality,
            season_weight: item.season_weight,
            open_toe: item.open_toe,
            times_worn: 0,
            last_worn: None,
            in_laundry: false,
            favorite: false,
            created_at: Utc::now(),
        };
        tables.clothes.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_item(
        &self,
        id: ItemId,
        update: &ClothingUpdate,
    ) -> AppResult<Option<ClothingItem>> {
        let mut tables = self.inner.write().await;
        Ok(tables.clothes.get_mut(&id).map(|item| {
            update.apply(item);
            item.clone()
        }))
    }

    async fn delete_item(&self, id: ItemId) -> AppResult<bool> {
        Ok(self.inner.write().await.clothes.remove(&id).is_some())
    }

    async fn toggle_laundry(&self, id: ItemId) -> AppResult<Option<bool>> {
        let mut tables = self.inner.write().await;
        Ok(tables.clothes.get_mut(&id).map(|item| {
            item.in_laundry = !item.in_laundry;
            item.in_laundry
        }))
    }

    async fn toggle_favorite(&self, id: ItemId) -> AppResult<Option<bool>> {
        let mut tables = self.inner.write().await;
        Ok(tables.clothes.get_mut(&id).map(|item| {
            item.favorite = !item.favorite;
            item.favorite
        }))
    }

    async fn log_outfit(&self, entry: &OutfitLogEntry) -> AppResult<OutfitId> {
        let mut tables = self.inner.write().await;
        let id = next_id(&mut tables.next_outfit_id);
        let now = Utc::now();

        tables.outfits.insert(
            id,
            LoggedOutfit {
                id,
                slots: entry.slots,
                occasion: entry.occasion.clone(),
                weather_temp: entry.weather.as_ref().map(|w| w.temp),
                weather_condition: entry.weather.as_ref().map(|w| w.condition.clone()),
                worn_at: now,
            },
        );

        // Dangling ids are kept in the history row but have nothing to bump
        for item_id in entry.slots.item_ids() {
            if let Some(item) = tables.clothes.get_mut(&item_id) {
                item.times_worn += 1;
                item.last_worn = Some(now);
            }
        }

        Ok(id)
    }

    async fn get_outfit(&self, id: OutfitId) -> AppResult<Option<LoggedOutfit>> {
        Ok(self.inner.read().await.outfits.get(&id).cloned())
    }

    async fn outfit_history(&self, limit: u32) -> AppResult<Vec<HistoryEntry>> {
        let tables = self.inner.read().await;
        let mut outfits: Vec<&LoggedOutfit> = tables.outfits.values().collect();
        outfits.sort_by(|a, b| b.worn_at.cmp(&a.worn_at).then(b.id.cmp(&a.id)));

        let resolve = |id: Option<ItemId>| {
            id.map(|id| HistorySlot::resolve(id, tables.clothes.get(&id)))
        };

        Ok(outfits
            .into_iter()
            .take(limit as usize)
            .map(|outfit| HistoryEntry {
                id: outfit.id,
                occasion: outfit.occasion.clone(),
                weather_temp: outfit.weather_temp,
                weather_condition: outfit.weather_condition.clone(),
                worn_at: outfit.worn_at,
                top: resolve(outfit.slots.top_id),
                bottom: resolve(outfit.slots.bottom_id),
                shoes: resolve(outfit.slots.shoes_id),
                dress: resolve(outfit.slots.dress_id),
                outerwear: resolve(outfit.slots.outerwear_id),
            })
            .collect())
    }

    async fn wardrobe_stats(&self) -> AppResult<WardrobeStats> {
        let tables = self.inner.read().await;
        let mut stats = WardrobeStats {
            total_outfits: tables.outfits.len() as u64,
            ..Default::default()
        };

        for item in tables.clothes.values() {
            stats.total += 1;
            *stats.by_category.entry(item.category).or_insert(0) += 1;
            stats.in_laundry += u64::from(item.in_laundry);
            stats.favorites += u64::from(item.favorite);
            stats.never_worn += u64::from(item.times_worn == 0);
        }

        Ok(stats)
    }

    async fn forgotten_items(
        &self,
        worn_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ClothingItem>> {
        let tables = self.inner.read().await;
        let mut items: Vec<ClothingItem> = tables
            .clothes
            .values()
            .filter(|item| !item.in_laundry && item.last_worn.map_or(true, |t| t < worn_before))
            .cloned()
            .collect();

        items.sort_by_key(|item| item.times_worn);
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn clear_wardrobe(&self) -> AppResult<()> {
        let mut tables = self.inner.write().await;
        tables.clothes.clear();
        tables.outfits.clear();
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryStore {
    async fn record_rating(
        &self,
        rating: &NewRating,
        adjustments: &[PreferenceAdjustment],
    ) -> AppResult<()> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();

        let id = next_id(&mut tables.next_rating_id);
        tables.ratings.push(OutfitRating {
            id,
            outfit_id: rating.outfit_id,
            rating: rating.rating,
            feedback: rating.feedback.clone(),
            created_at: now,
        });

        for adjustment in adjustments {
            let current = tables.weights.get(&adjustment.key).map(|w| w.weight);
            tables.weights.insert(
                adjustment.key.clone(),
                PreferenceWeight {
                    key: adjustment.key.clone(),
                    weight: adjustment.applied_to(current),
                    updated_at: now,
                },
            );
        }

        Ok(())
    }

    async fn list_weights(&self) -> AppResult<Vec<PreferenceWeight>> {
        let tables = self.inner.read().await;
        let mut weights: Vec<PreferenceWeight> = tables.weights.values().cloned().collect();
        weights.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(weights)
    }

    async fn clear_weights(&self) -> AppResult<()> {
        self.inner.write().await.weights.clear();
        Ok(())
    }

    async fn rating_stats(&self) -> AppResult<RatingStats> {
        let tables = self.inner.read().await;
        let total = tables.ratings.len() as u64;

        let mut distribution = BTreeMap::new();
        let mut sum = 0u64;
        for rating in &tables.ratings {
            *distribution.entry(rating.rating).or_insert(0) += 1;
            sum += u64::from(rating.rating);
        }

        let average_rating = if total == 0 {
            0.0
        } else {
            round_one_decimal(sum as f64 / total as f64)
        };

        Ok(RatingStats {
            total_ratings: total,
            average_rating,
            distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Formality, Pattern, PreferenceType, SeasonWeight, Weather};

    fn new_item(category: Category, image_path: &str) -> NewClothingItem {
        NewClothingItem {
            image_path: image_path.to_string(),
            category,
            color_primary: Some("#000000".to_string()),
            color_secondary: None,
            pattern: Pattern::Solid,
            formality: Formality::Casual,
            season_weight: SeasonWeight::Medium,
            open_toe: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_excluding_laundry() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();
        let jeans = store.insert_item(new_item(Category::Bottom, "jeans.jpg")).await.unwrap();
        assert_ne!(shirt.id, jeans.id);

        assert_eq!(store.toggle_laundry(jeans.id).await.unwrap(), Some(true));

        let wearable = store.list_items(&ItemFilter::wearable()).await.unwrap();
        assert_eq!(wearable.len(), 1);
        assert_eq!(wearable[0].id, shirt.id);

        let all = store.list_items(&ItemFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_missing_item() {
        let store = MemoryStore::new();
        assert_eq!(store.toggle_favorite(99).await.unwrap(), None);
        assert_eq!(store.toggle_laundry(99).await.unwrap(), None);
        assert!(!store.delete_item(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_log_outfit_increments_wear_counts() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();
        let jeans = store.insert_item(new_item(Category::Bottom, "jeans.jpg")).await.unwrap();

        let entry = OutfitLogEntry {
            slots: crate::models::OutfitSlots {
                top_id: Some(shirt.id),
                bottom_id: Some(jeans.id),
                ..Default::default()
            },
            occasion: "casual".to_string(),
            weather: Some(Weather::new(25.0, "Clear")),
        };

        store.log_outfit(&entry).await.unwrap();
        let id = store.log_outfit(&entry).await.unwrap();

        let shirt = store.get_item(shirt.id).await.unwrap().unwrap();
        assert_eq!(shirt.times_worn, 2);
        assert!(shirt.last_worn.is_some());

        let logged = store.get_outfit(id).await.unwrap().unwrap();
        assert_eq!(logged.weather_temp, Some(25.0));
        assert_eq!(logged.slots.top_id, Some(shirt.id));
    }

    #[tokio::test]
    async fn test_log_outfit_counts_each_slot() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();

        let entry = OutfitLogEntry {
            slots: crate::models::OutfitSlots {
                top_id: Some(shirt.id),
                bottom_id: Some(shirt.id),
                ..Default::default()
            },
            occasion: "casual".to_string(),
            weather: None,
        };
        store.log_outfit(&entry).await.unwrap();

        let shirt = store.get_item(shirt.id).await.unwrap().unwrap();
        assert_eq!(shirt.times_worn, 2);
    }

    #[tokio::test]
    async fn test_forgotten_items_cutoff_and_laundry() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();
        let jeans = store.insert_item(new_item(Category::Bottom, "jeans.jpg")).await.unwrap();
        let boots = store.insert_item(new_item(Category::Shoes, "boots.jpg")).await.unwrap();
        store.toggle_laundry(boots.id).await.unwrap();

        let entry = OutfitLogEntry {
            slots: crate::models::OutfitSlots {
                top_id: Some(shirt.id),
                ..Default::default()
            },
            occasion: "casual".to_string(),
            weather: None,
        };
        store.log_outfit(&entry).await.unwrap();

        let month_ago = Utc::now() - chrono::Duration::days(30);
        let forgotten = store.forgotten_items(month_ago, 5).await.unwrap();
        let ids: Vec<ItemId> = forgotten.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![jeans.id]);

        // Once the cutoff passes the last wear, the worn shirt comes after the unworn jeans
        let later = Utc::now() + chrono::Duration::minutes(1);
        let forgotten = store.forgotten_items(later, 5).await.unwrap();
        let ids: Vec<ItemId> = forgotten.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![jeans.id, shirt.id]);

        assert_eq!(store.forgotten_items(later, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_wardrobe_keeps_ratings() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();
        let entry = OutfitLogEntry {
            slots: crate::models::OutfitSlots {
                top_id: Some(shirt.id),
                ..Default::default()
            },
            occasion: "casual".to_string(),
            weather: None,
        };
        let outfit_id = store.log_outfit(&entry).await.unwrap();
        store
            .record_rating(
                &NewRating {
                    outfit_id,
                    rating: 4,
                    feedback: None,
                },
                &[],
            )
            .await
            .unwrap();

        store.clear_wardrobe().await.unwrap();

        assert!(store.list_items(&ItemFilter::default()).await.unwrap().is_empty());
        assert!(store.outfit_history(10).await.unwrap().is_empty());
        assert_eq!(store.rating_stats().await.unwrap().total_ratings, 1);
    }

    #[tokio::test]
    async fn test_history_tolerates_deleted_items() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();
        let jeans = store.insert_item(new_item(Category::Bottom, "jeans.jpg")).await.unwrap();

        store
            .log_outfit(&OutfitLogEntry {
                slots: crate::models::OutfitSlots {
                    top_id: Some(shirt.id),
                    bottom_id: Some(jeans.id),
                    ..Default::default()
                },
                occasion: "work".to_string(),
                weather: None,
            })
            .await
            .unwrap();

        store.delete_item(jeans.id).await.unwrap();

        let history = store.outfit_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(matches!(history[0].top, Some(HistorySlot::Known { .. })));
        assert!(matches!(history[0].bottom, Some(HistorySlot::Unknown { .. })));
        assert_eq!(history[0].shoes, None);
    }

    #[tokio::test]
    async fn test_record_rating_applies_adjustments() {
        let store = MemoryStore::new();
        let key = PreferenceKey::new(PreferenceType::Pattern, "striped");
        let rating = NewRating {
            outfit_id: 1,
            rating: 5,
            feedback: None,
        };
        let adjustments = vec![
            PreferenceAdjustment {
                key: key.clone(),
                delta: 1.0,
            },
            PreferenceAdjustment {
                key: key.clone(),
                delta: 1.0,
            },
        ];

        store.record_rating(&rating, &adjustments).await.unwrap();

        let weights = store.list_weights().await.unwrap();
        assert_eq!(weights.len(), 1);
        assert_eq!(weights[0].weight, 3.0);

        let stats = store.rating_stats().await.unwrap();
        assert_eq!(stats.total_ratings, 1);
        assert_eq!(stats.average_rating, 5.0);
    }

    #[tokio::test]
    async fn test_wardrobe_stats() {
        let store = MemoryStore::new();
        let shirt = store.insert_item(new_item(Category::Top, "shirt.jpg")).await.unwrap();
        store.insert_item(new_item(Category::Top, "tee.jpg")).await.unwrap();
        store.insert_item(new_item(Category::Shoes, "boots.jpg")).await.unwrap();
        store.toggle_favorite(shirt.id).await.unwrap();

        let stats = store.wardrobe_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category[&Category::Top], 2);
        assert_eq!(stats.favorites, 1);
        assert_eq!(stats.never_worn, 3);
        assert_eq!(stats.total_outfits, 0);
    }
}
